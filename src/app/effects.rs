use std::path::Path;

use tracing::{debug, info, warn};

use crate::app::model::{ImageSlot, RendererStatus, SlideRender};
use crate::app::{App, Message, Model, ToastLevel};
use crate::render::{RenderRequest, RenderResult, RenderTicket, Visual, WorkerEvent};
use crate::slides::{Slide, SlideKind};
use crate::watcher::MarkdownWatcher;

const WATCH_DEBOUNCE_MS: u64 = 200;
/// Cell width assumed when the terminal did not report its font size.
const FALLBACK_CELL_WIDTH_PX: u16 = 8;
const MIN_DIAGRAM_WIDTH_PX: u32 = 320;

impl App {
    pub(super) fn make_file_watcher(model: &mut Model) -> Option<MarkdownWatcher> {
        if !model.watch_enabled {
            return None;
        }
        let Some(path) = model.source.path().map(Path::to_path_buf) else {
            debug!("watch ignored: source is not a file");
            model.watch_enabled = false;
            return None;
        };
        match MarkdownWatcher::new(&path, WATCH_DEBOUNCE_MS) {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                warn!(path = %path.display(), "watch unavailable: {err}");
                model.watch_enabled = false;
                model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
                None
            }
        }
    }

    pub(super) fn handle_message_side_effects(model: &mut Model, msg: &Message) {
        if let Message::ForceReload | Message::FileChanged = msg {
            match model.reload_from_disk() {
                Ok(true) if matches!(msg, Message::ForceReload) => {
                    let count = model.slides.len();
                    model.show_toast(ToastLevel::Info, format!("Reloaded ({count} slides)"));
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("reload failed: {err:#}");
                    model.show_toast(ToastLevel::Error, format!("Reload failed: {err:#}"));
                }
            }
        }
    }
}

impl Model {
    /// Diagram slides currently on screen.
    ///
    /// Grid cards show text previews only, so nothing needs rendering there.
    pub(super) fn visible_diagram_ids(&self) -> Vec<String> {
        if self.navigator.is_grid() {
            return Vec::new();
        }
        self.current_slide()
            .filter(|slide| slide.is_diagram())
            .map(|slide| vec![slide.id().to_string()])
            .unwrap_or_default()
    }

    /// Approximate pixel width available to a diagram in single view.
    pub(super) fn diagram_width_px(&self) -> u32 {
        let cell_width = self
            .picker
            .as_ref()
            .map_or(FALLBACK_CELL_WIDTH_PX, |picker| picker.font_size().0.max(1));
        let columns = crate::ui::body_area(self).width.saturating_sub(2);
        (u32::from(columns) * u32::from(cell_width)).max(MIN_DIAGRAM_WIDTH_PX)
    }

    /// Bring render requests in line with what is visible.
    ///
    /// Abandons requests for slides that scrolled out of view and issues
    /// fresh tickets for visible diagrams that have no render yet.
    pub(super) fn plan_renders(&mut self) -> Vec<RenderRequest> {
        let visible = self.visible_diagram_ids();
        let keep: Vec<&str> = visible.iter().map(String::as_str).collect();
        self.tracker.retain_slides(&keep);

        // An abandoned request leaves a Pending marker behind; clear it so the
        // slide is requested again next time it is shown.
        let tracker = &self.tracker;
        self.renders
            .retain(|id, render| !matches!(render, SlideRender::Pending) || tracker.is_pending(id));

        let width_px = self.diagram_width_px();
        let mut requests = Vec::new();
        for id in visible {
            if self.renders.contains_key(&id) {
                continue;
            }
            let Some(code) = self.slide_code(&id) else {
                continue;
            };
            let ticket = self.tracker.issue(&id);
            debug!(render_id = %ticket.render_id, width_px, theme = self.theme.as_str(), "render requested");
            requests.push(RenderRequest {
                ticket,
                code,
                theme: self.theme,
                width_px,
            });
            self.renders.insert(id, SlideRender::Pending);
        }
        requests
    }

    /// Record that a request never reached the worker.
    pub(super) fn reject_request(&mut self, request: RenderRequest, reason: &str) {
        if self.tracker.accept(&request.ticket) {
            self.renders.insert(
                request.ticket.slide_id,
                SlideRender::Failed {
                    message: reason.to_string(),
                    code: request.code,
                },
            );
        }
    }

    /// Apply a message from the render worker. Returns whether the screen
    /// needs redrawing.
    pub(super) fn apply_worker_event(&mut self, event: WorkerEvent) -> bool {
        match event {
            WorkerEvent::Ready { renderer } => {
                info!(renderer, "renderer ready");
                self.renderer_status = RendererStatus::Ready(renderer);
                true
            }
            WorkerEvent::InitFailed { renderer, message } => {
                self.show_toast(
                    ToastLevel::Warning,
                    format!("Renderer {renderer} unavailable: {message}"),
                );
                self.renderer_status = RendererStatus::Failed(message);
                true
            }
            WorkerEvent::Rendered(response) => {
                if !self.tracker.accept(&response.ticket) {
                    debug!(render_id = %response.ticket.render_id, "discarding stale render");
                    return false;
                }
                let render = self.slide_render_for(&response.ticket, response.result);
                self.renders.insert(response.ticket.slide_id, render);
                true
            }
        }
    }

    fn slide_render_for(&self, ticket: &RenderTicket, result: RenderResult) -> SlideRender {
        match result {
            RenderResult::Success(Visual::Text(text)) => SlideRender::Text(text),
            RenderResult::Success(Visual::Image(image)) => match &self.picker {
                Some(picker) => SlideRender::Image(picker.new_resize_protocol(image)),
                None => SlideRender::Failed {
                    message: "terminal cannot display images".to_string(),
                    code: self.slide_code(&ticket.slide_id).unwrap_or_default(),
                },
            },
            RenderResult::Failure { message, code } => {
                debug!(render_id = %ticket.render_id, "render failed: {message}");
                SlideRender::Failed { message, code }
            }
        }
    }

    fn slide_code(&self, id: &str) -> Option<String> {
        self.slides
            .position(id)
            .and_then(|index| self.slides.get(index))
            .and_then(Slide::code)
            .map(str::to_string)
    }

    /// Load the image slide on screen, if any, into a terminal protocol.
    pub(super) fn load_visible_images(&mut self) {
        if self.navigator.is_grid() {
            return;
        }
        let Some(slide) = self.current_slide() else {
            return;
        };
        let SlideKind::Image { source, .. } = slide.kind() else {
            return;
        };
        if self.images.contains_key(slide.id()) {
            return;
        }
        let id = slide.id().to_string();
        let source = source.clone();

        let slot = if !self.images_enabled {
            ImageSlot::Unavailable("images disabled".to_string())
        } else if let Some(picker) = &self.picker {
            match self.image_loader.load(&source) {
                Ok(image) => {
                    debug!(%source, width = image.width(), height = image.height(), "image loaded");
                    ImageSlot::Loaded(picker.new_resize_protocol(image))
                }
                Err(err) => {
                    warn!(%source, "{err:#}");
                    ImageSlot::Unavailable(format!("{err:#}"))
                }
            }
        } else {
            ImageSlot::Unavailable("terminal graphics unavailable".to_string())
        };
        self.images.insert(id, slot);
    }
}
