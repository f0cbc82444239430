//! Slide navigation state.
//!
//! The [`Navigator`] is a bounded cursor over a slide collection of known
//! length plus a view-mode flag. Every operation is total: out-of-range
//! targets are ignored rather than reported.
//!
//! # Example
//!
//! ```
//! use mermaid_slides::navigation::{Navigator, ViewMode};
//!
//! let mut nav = Navigator::new(5);
//! nav.previous();
//! assert_eq!(nav.current(), Some(4));
//!
//! nav.toggle_grid_view();
//! nav.select_in_grid(2);
//! assert_eq!(nav.current(), Some(2));
//! assert_eq!(nav.view_mode(), ViewMode::Single);
//! ```

/// How slides are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// One slide at full size.
    #[default]
    Single,
    /// Previews of every slide at once.
    Grid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    len: usize,
    index: usize,
    mode: ViewMode,
}

impl Navigator {
    /// Create a navigator for `len` slides, positioned on the first one.
    pub const fn new(len: usize) -> Self {
        Self {
            len,
            index: 0,
            mode: ViewMode::Single,
        }
    }

    /// Current slide index, `None` when there are no slides.
    pub const fn current(&self) -> Option<usize> {
        if self.len == 0 {
            None
        } else {
            Some(self.index)
        }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn view_mode(&self) -> ViewMode {
        self.mode
    }

    pub const fn is_grid(&self) -> bool {
        matches!(self.mode, ViewMode::Grid)
    }

    /// Advance one slide, wrapping from the last to the first.
    pub const fn next(&mut self) {
        if self.len <= 1 {
            return;
        }
        self.index = if self.index + 1 < self.len {
            self.index + 1
        } else {
            0
        };
    }

    /// Go back one slide, wrapping from the first to the last.
    pub const fn previous(&mut self) {
        if self.len <= 1 {
            return;
        }
        self.index = if self.index > 0 {
            self.index - 1
        } else {
            self.len - 1
        };
    }

    pub const fn first(&mut self) {
        self.index = 0;
    }

    pub const fn last(&mut self) {
        if self.len > 0 {
            self.index = self.len - 1;
        }
    }

    /// Jump to `index` if it names a slide; anything else is ignored.
    ///
    /// Returns whether the target was accepted.
    pub fn go_to<I: TryInto<usize>>(&mut self, index: I) -> bool {
        match index.try_into() {
            Ok(index) if index < self.len => {
                self.index = index;
                true
            }
            _ => false,
        }
    }

    pub const fn toggle_grid_view(&mut self) {
        self.mode = match self.mode {
            ViewMode::Single => ViewMode::Grid,
            ViewMode::Grid => ViewMode::Single,
        };
    }

    /// Pick a slide from the grid and return to single view.
    pub fn select_in_grid<I: TryInto<usize>>(&mut self, index: I) -> bool {
        let accepted = self.go_to(index);
        self.mode = ViewMode::Single;
        accepted
    }

    /// Leave grid view, keeping the highlighted slide.
    pub const fn exit_grid(&mut self) {
        self.mode = ViewMode::Single;
    }

    /// Move the grid highlight by whole rows of `columns` cards.
    ///
    /// Clamped to the collection; rows do not wrap.
    pub fn grid_move(&mut self, delta_rows: isize, columns: usize) {
        if self.len == 0 {
            return;
        }
        let step = delta_rows.unsigned_abs().saturating_mul(columns.max(1));
        let target = if delta_rows < 0 {
            self.index.checked_sub(step)
        } else {
            self.index.checked_add(step).filter(|t| *t < self.len)
        };
        if let Some(target) = target {
            self.index = target;
        }
    }

    pub const fn reset(&mut self) {
        self.index = 0;
        self.mode = ViewMode::Single;
    }

    /// Replace the collection length; navigation starts over.
    pub const fn set_len(&mut self, len: usize) {
        self.len = len;
        self.reset();
    }

    /// Position through the deck as a rounded percentage.
    pub fn progress_percent(&self) -> u8 {
        if self.len == 0 {
            return 0;
        }
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        {
            (((self.index + 1) as f64 / self.len as f64) * 100.0).round() as u8
        }
    }

    /// Counter text, e.g. `3 / 7`.
    pub fn position_label(&self) -> String {
        match self.current() {
            Some(index) => format!("{} / {}", index + 1, self.len),
            None => "0 / 0".to_string(),
        }
    }
}
