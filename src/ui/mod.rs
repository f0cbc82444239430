//! Terminal UI.
//!
//! - [`render`]: draws the whole frame from the [`Model`]
//! - [`GridLayout`]: card geometry shared by drawing and mouse hit-testing
//! - [`ScreenLayout`]: header, body and footer areas

mod grid;
mod overlays;
mod render;
mod status;

pub use grid::{GridLayout, grid_columns};
pub use render::render;

use ratatui::layout::Rect;

use crate::app::Model;

pub const HEADER_HEIGHT: u16 = 1;
/// Progress line plus status bar.
pub const FOOTER_HEIGHT: u16 = 2;

/// Split of the frame into chrome and slide body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Option<Rect>,
    pub body: Rect,
    pub footer: Option<Rect>,
    /// Bottom row, where toasts are drawn even when the controls are hidden.
    pub toast: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect, controls_visible: bool) -> Self {
        let toast = Rect::new(
            area.x,
            area.y + area.height.saturating_sub(1),
            area.width,
            area.height.min(1),
        );
        if !controls_visible || area.height <= HEADER_HEIGHT + FOOTER_HEIGHT {
            return Self {
                header: None,
                body: area,
                footer: None,
                toast,
            };
        }
        let header = Rect::new(area.x, area.y, area.width, HEADER_HEIGHT);
        let footer = Rect::new(
            area.x,
            area.y + area.height - FOOTER_HEIGHT,
            area.width,
            FOOTER_HEIGHT,
        );
        let body = Rect::new(
            area.x,
            area.y + HEADER_HEIGHT,
            area.width,
            area.height - HEADER_HEIGHT - FOOTER_HEIGHT,
        );
        Self {
            header: Some(header),
            body,
            footer: Some(footer),
            toast,
        }
    }
}

/// Area the current slide or grid is drawn in.
pub fn body_area(model: &Model) -> Rect {
    let area = Rect::new(0, 0, model.size.0, model.size.1);
    ScreenLayout::new(area, model.controls_visible()).body
}
