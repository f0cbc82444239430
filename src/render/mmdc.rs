//! Renderer backed by the mermaid CLI (`mmdc`).
//!
//! Diagram source goes in on stdin, SVG comes back on stdout and is
//! rasterized with `resvg`.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

use resvg::usvg::fontdb;
use tracing::debug;

use super::{DiagramRenderer, RenderError, Visual, raster};
use crate::config::DiagramTheme;

/// Environment variable overriding the `mmdc` executable.
pub const MMDC_ENV: &str = "MERMAID_SLIDES_MMDC";

pub struct MmdcRenderer {
    program: PathBuf,
    config_path: Option<PathBuf>,
    fonts: Option<Arc<fontdb::Database>>,
}

impl MmdcRenderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            config_path: None,
            fonts: None,
        }
    }

    /// `mmdc` from `PATH`, or the program named by `MERMAID_SLIDES_MMDC`.
    pub fn from_env() -> Self {
        Self::new(std::env::var_os(MMDC_ENV).map_or_else(|| PathBuf::from("mmdc"), PathBuf::from))
    }

    /// resvg cannot draw `foreignObject`, so ask for plain SVG text labels.
    fn write_config(&self) -> Result<PathBuf, RenderError> {
        let path = std::env::temp_dir().join(format!("mermaid-slides-{}.json", std::process::id()));
        let config = serde_json::json!({
            "htmlLabels": false,
            "flowchart": { "htmlLabels": false },
            "class": { "htmlLabels": false },
        });
        std::fs::write(&path, config.to_string())?;
        Ok(path)
    }
}

impl Drop for MmdcRenderer {
    fn drop(&mut self) {
        if let Some(path) = self.config_path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

impl DiagramRenderer for MmdcRenderer {
    fn name(&self) -> &'static str {
        "mmdc"
    }

    fn init(&mut self) -> Result<(), RenderError> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|err| {
                RenderError::Init(format!("could not run {}: {err}", self.program.display()))
            })?;
        if !output.status.success() {
            return Err(RenderError::Init(format!(
                "{} --version exited with {}",
                self.program.display(),
                output.status
            )));
        }
        debug!(
            version = %String::from_utf8_lossy(&output.stdout).trim(),
            "mermaid CLI ready"
        );
        self.config_path = Some(self.write_config()?);
        self.fonts = Some(raster::system_fonts());
        Ok(())
    }

    fn render(
        &mut self,
        render_id: &str,
        code: &str,
        theme: DiagramTheme,
        width_px: u32,
    ) -> Result<Visual, RenderError> {
        let (Some(config_path), Some(fonts)) = (&self.config_path, &self.fonts) else {
            return Err(RenderError::NotReady);
        };
        debug!(render_id, theme = theme.as_str(), width_px, "mmdc render");

        let mut child = Command::new(&self.program)
            .args(["--input", "-", "--output", "-", "--outputFormat", "svg"])
            .args(["--theme", theme.as_str(), "--backgroundColor", background_for(theme)])
            .arg("--configFile")
            .arg(config_path)
            .arg("--width")
            .arg(width_px.to_string())
            .arg("--quiet")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(code.as_bytes())?;
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(RenderError::Rejected(error_summary(&output.stderr)));
        }
        let svg = String::from_utf8_lossy(&output.stdout);
        if !svg.contains("<svg") {
            return Err(RenderError::Rejected("mmdc produced no SVG".to_string()));
        }
        raster::rasterize_svg(&svg, width_px, Arc::clone(fonts)).map(Visual::Image)
    }
}

/// Canvas colour matching the theme's own background.
const fn background_for(theme: DiagramTheme) -> &'static str {
    match theme {
        DiagramTheme::Dark => "#333333",
        DiagramTheme::Default | DiagramTheme::Forest | DiagramTheme::Base | DiagramTheme::Neutral => {
            "white"
        }
    }
}

/// First meaningful line of the CLI's error output.
fn error_summary(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("at "))
        .map_or_else(|| "mmdc failed".to_string(), ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_fails_for_missing_program() {
        let mut renderer = MmdcRenderer::new("/nonexistent/mmdc-for-tests");
        let err = renderer.init().unwrap_err();
        assert!(matches!(err, RenderError::Init(_)));
    }

    #[test]
    fn test_render_before_init_is_not_ready() {
        let mut renderer = MmdcRenderer::new("mmdc");
        let err = renderer
            .render("diagram-0-r1", "graph TD", DiagramTheme::Dark, 800)
            .unwrap_err();
        assert!(matches!(err, RenderError::NotReady));
    }

    #[test]
    fn test_error_summary_skips_stack_frames() {
        let stderr = b"\nError: Parse error on line 2:\n    at Object.parse (mermaid.js:1:1)\n";
        assert_eq!(error_summary(stderr), "Error: Parse error on line 2:");
        assert_eq!(error_summary(b""), "mmdc failed");
    }

    #[test]
    fn test_background_follows_theme() {
        assert_eq!(background_for(DiagramTheme::Dark), "#333333");
        assert_eq!(background_for(DiagramTheme::Forest), "white");
    }
}
