use super::{DiagramRenderer, RenderError, Visual};
use crate::config::DiagramTheme;

/// Renderer that shows the diagram source as text.
///
/// Always available; used when no real renderer is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceRenderer;

impl DiagramRenderer for SourceRenderer {
    fn name(&self) -> &'static str {
        "source"
    }

    fn init(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn render(
        &mut self,
        _render_id: &str,
        code: &str,
        _theme: DiagramTheme,
        _width_px: u32,
    ) -> Result<Visual, RenderError> {
        Ok(Visual::Text(code.to_string()))
    }
}
