//! Diagram rendering.
//!
//! The renderer itself is an external collaborator behind the
//! [`DiagramRenderer`] trait. It is owned by a [`RenderWorker`] thread;
//! requests and results carry a [`RenderTicket`] so the presentation can
//! discard results that arrive after the user has moved on
//! (see [`RenderTracker`]).

mod mmdc;
mod raster;
mod source;
mod tracker;
mod worker;

pub use mmdc::MmdcRenderer;
pub use raster::rasterize_svg;
pub use source::SourceRenderer;
pub use tracker::{RenderTicket, RenderTracker};
pub use worker::{RenderRequest, RenderResponse, RenderWorker, WorkerEvent};

use image::DynamicImage;
use tracing::{info, warn};

use crate::config::{DiagramTheme, RendererChoice};

/// Errors raised by a renderer. Converted to [`RenderResult::Failure`]
/// before they reach the presentation.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("renderer is not initialized")]
    NotReady,
    #[error("renderer unavailable: {0}")]
    Init(String),
    #[error("{0}")]
    Rejected(String),
    #[error("renderer I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not rasterize diagram: {0}")]
    Rasterize(String),
}

/// Visual output for one diagram.
#[derive(Debug, Clone)]
pub enum Visual {
    /// A raster image, ready for a terminal graphics protocol.
    Image(DynamicImage),
    /// Text to show verbatim.
    Text(String),
}

/// Outcome of one render request, scoped to a single slide.
#[derive(Debug, Clone)]
pub enum RenderResult {
    Success(Visual),
    Failure { message: String, code: String },
}

impl RenderResult {
    pub(crate) fn from_outcome(outcome: Result<Visual, RenderError>, code: &str) -> Self {
        match outcome {
            Ok(visual) => Self::Success(visual),
            Err(err) => Self::Failure {
                message: err.to_string(),
                code: code.to_string(),
            },
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Something that turns diagram source into a [`Visual`].
///
/// `render_id` is unique per call so implementations with internal caches
/// never serve output from an earlier request.
pub trait DiagramRenderer: Send {
    /// Short name for the status bar and logs.
    fn name(&self) -> &'static str;

    /// Prepare the renderer. Called once on the worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Init`] when the renderer cannot be used.
    fn init(&mut self) -> Result<(), RenderError>;

    /// Render `code` with the given theme at roughly `width_px` pixels wide.
    ///
    /// # Errors
    ///
    /// Returns an error when the renderer rejects the diagram or fails.
    fn render(
        &mut self,
        render_id: &str,
        code: &str,
        theme: DiagramTheme,
        width_px: u32,
    ) -> Result<Visual, RenderError>;
}

/// Uses `primary` when it initializes, `fallback` otherwise.
pub struct FallbackRenderer {
    primary: Box<dyn DiagramRenderer>,
    fallback: Box<dyn DiagramRenderer>,
    use_fallback: bool,
}

impl FallbackRenderer {
    pub fn new(primary: Box<dyn DiagramRenderer>, fallback: Box<dyn DiagramRenderer>) -> Self {
        Self {
            primary,
            fallback,
            use_fallback: false,
        }
    }

    fn active(&mut self) -> &mut dyn DiagramRenderer {
        if self.use_fallback {
            self.fallback.as_mut()
        } else {
            self.primary.as_mut()
        }
    }
}

impl DiagramRenderer for FallbackRenderer {
    fn name(&self) -> &'static str {
        if self.use_fallback {
            self.fallback.name()
        } else {
            self.primary.name()
        }
    }

    fn init(&mut self) -> Result<(), RenderError> {
        match self.primary.init() {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    "{err}; falling back"
                );
                self.use_fallback = true;
                self.fallback.init()
            }
        }
    }

    fn render(
        &mut self,
        render_id: &str,
        code: &str,
        theme: DiagramTheme,
        width_px: u32,
    ) -> Result<Visual, RenderError> {
        self.active().render(render_id, code, theme, width_px)
    }
}

/// Build the renderer selected by configuration.
pub fn renderer_for(choice: RendererChoice) -> Box<dyn DiagramRenderer> {
    info!(?choice, "selecting diagram renderer");
    match choice {
        RendererChoice::Mmdc => Box::new(MmdcRenderer::from_env()),
        RendererChoice::Source => Box::new(SourceRenderer),
        RendererChoice::Auto => Box::new(FallbackRenderer::new(
            Box::new(MmdcRenderer::from_env()),
            Box::new(SourceRenderer),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl DiagramRenderer for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn init(&mut self) -> Result<(), RenderError> {
            Err(RenderError::Init("not installed".to_string()))
        }

        fn render(&mut self, _: &str, _: &str, _: DiagramTheme, _: u32) -> Result<Visual, RenderError> {
            Err(RenderError::NotReady)
        }
    }

    #[test]
    fn test_fallback_renderer_switches_when_primary_fails() {
        let mut renderer = FallbackRenderer::new(Box::new(Broken), Box::new(SourceRenderer));
        assert_eq!(renderer.name(), "broken");
        renderer.init().unwrap();
        assert_eq!(renderer.name(), "source");
        let visual = renderer
            .render("diagram-0-r1", "graph TD", DiagramTheme::Default, 800)
            .unwrap();
        assert!(matches!(visual, Visual::Text(ref text) if text == "graph TD"));
    }

    #[test]
    fn test_render_result_failure_keeps_code() {
        let result = RenderResult::from_outcome(
            Err(RenderError::Rejected("Parse error on line 1".to_string())),
            "grph TD",
        );
        match result {
            RenderResult::Failure { message, code } => {
                assert_eq!(message, "Parse error on line 1");
                assert_eq!(code, "grph TD");
            }
            RenderResult::Success(_) => panic!("expected failure"),
        }
    }
}
