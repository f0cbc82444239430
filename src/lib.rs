// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. render::RenderError)
    clippy::module_name_repetitions
)]

//! # mermaid-slides
//!
//! Present the mermaid diagrams and images of a markdown file as slides in
//! the terminal.
//!
//! - Extracts ```` ```mermaid ```` fences and `![alt](src)` images in
//!   document order
//! - Single-slide and grid views with wraparound navigation
//! - Controls that hide after a period of inactivity
//! - Diagrams drawn by the mermaid CLI on a worker thread, with a source
//!   preview fallback
//!
//! ## Architecture
//!
//! The terminal front end uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`slides`]: Markdown scanning into a [`slides::SlideCollection`]
//! - [`navigation`]: Slide cursor and view mode
//! - [`autohide`]: Inactivity timer for the controls
//! - [`render`]: Diagram renderer trait, worker thread and stale-result tracking
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components
//! - [`image`]: Image loading for image slides
//! - [`config`]: Saved default flags
//! - [`watcher`]: File watching

pub mod app;
pub mod autohide;
pub mod config;
pub mod image;
pub mod navigation;
pub mod render;
pub mod slides;
pub mod ui;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model, SlideSource};
    pub use crate::autohide::AutoHide;
    pub use crate::navigation::{Navigator, ViewMode};
    pub use crate::slides::{DiagramType, Slide, SlideCollection, SlideKind, extract};
}
