use std::collections::HashMap;

/// Tag attached to a render request and echoed back with its result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderTicket {
    pub slide_id: String,
    /// Unique per request, never reused for a re-render.
    pub render_id: String,
}

/// Remembers the latest outstanding request per slide.
///
/// A result is accepted only when its ticket is the one still outstanding
/// for that slide; superseded and abandoned requests are discarded.
#[derive(Debug, Default)]
pub struct RenderTracker {
    seq: u64,
    pending: HashMap<String, String>,
}

impl RenderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh ticket for `slide_id`, superseding any earlier one.
    pub fn issue(&mut self, slide_id: &str) -> RenderTicket {
        self.seq += 1;
        let render_id = format!("{slide_id}-r{}", self.seq);
        self.pending.insert(slide_id.to_string(), render_id.clone());
        RenderTicket {
            slide_id: slide_id.to_string(),
            render_id,
        }
    }

    pub fn is_pending(&self, slide_id: &str) -> bool {
        self.pending.contains_key(slide_id)
    }

    /// Render ids of every outstanding request.
    pub fn render_ids(&self) -> impl Iterator<Item = &str> {
        self.pending.values().map(String::as_str)
    }

    /// Abandon outstanding requests for slides not in `keep`.
    pub fn retain_slides(&mut self, keep: &[&str]) {
        self.pending.retain(|slide_id, _| keep.contains(&slide_id.as_str()));
    }

    /// Whether a result with this ticket should be shown. Consumes the
    /// outstanding entry when it matches.
    pub fn accept(&mut self, ticket: &RenderTicket) -> bool {
        match self.pending.get(&ticket.slide_id) {
            Some(render_id) if *render_id == ticket.render_id => {
                self.pending.remove(&ticket.slide_id);
                true
            }
            _ => false,
        }
    }

    /// Forget every outstanding request. Ticket numbering continues.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
