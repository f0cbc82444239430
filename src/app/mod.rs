//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{ImageSlot, Model, RendererStatus, SlideRender, SlideSource, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{DiagramTheme, RendererChoice};
use crate::slides::SlideCollection;

static UI_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Whether the terminal is currently in presentation mode.
pub fn ui_active() -> bool {
    UI_ACTIVE.load(Ordering::Relaxed)
}

pub(crate) fn set_ui_active(active: bool) {
    UI_ACTIVE.store(active, Ordering::Relaxed);
}

/// Owns the presentation settings and runs the event loop.
pub struct App {
    source: SlideSource,
    slides: SlideCollection,
    theme: DiagramTheme,
    renderer: RendererChoice,
    auto_hide_ms: u64,
    watch_enabled: bool,
    images_enabled: bool,
    force_half_cell: bool,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create an application presenting `slides`, extracted from `source`.
    pub fn new(source: SlideSource, slides: SlideCollection) -> Self {
        Self {
            source,
            slides,
            theme: DiagramTheme::default(),
            renderer: RendererChoice::default(),
            auto_hide_ms: crate::autohide::DEFAULT_TIMEOUT_MS,
            watch_enabled: false,
            images_enabled: true,
            force_half_cell: false,
            config_global_path: None,
            config_local_path: None,
        }
    }

    pub const fn with_theme(mut self, theme: DiagramTheme) -> Self {
        self.theme = theme;
        self
    }

    pub const fn with_renderer(mut self, renderer: RendererChoice) -> Self {
        self.renderer = renderer;
        self
    }

    /// Hide the controls after this many idle milliseconds; 0 never hides.
    pub const fn with_auto_hide(mut self, timeout_ms: u64) -> Self {
        self.auto_hide_ms = timeout_ms;
        self
    }

    /// Enable or disable file watching.
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Enable or disable terminal graphics for images and diagrams.
    pub const fn with_images_enabled(mut self, enabled: bool) -> Self {
        self.images_enabled = enabled;
        self
    }

    /// Skip terminal detection and draw images with half-block characters.
    pub const fn with_force_half_cell(mut self, enabled: bool) -> Self {
        self.force_half_cell = enabled;
        self
    }

    /// Set config paths to show in help.
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }
}

#[cfg(test)]
mod tests;
