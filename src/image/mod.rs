//! Image loading for image slides and rendered diagrams.
//!
//! Terminal graphics are drawn through `ratatui-image`, which picks the
//! best protocol the terminal supports (Kitty, Sixel, iTerm2, half-blocks).

mod loader;

pub use loader::{ImageCache, ImageLoader};

use std::path::Path;
#[cfg(unix)]
use std::time::Duration;

use anyhow::{Context, Result, bail};
use base64::Engine;
use image::DynamicImage;
use ratatui_image::picker::Picker;
#[cfg(unix)]
use ratatui_image::picker::cap_parser::QueryStdioOptions;
use tracing::debug;

#[cfg(unix)]
const PICKER_QUERY_TIMEOUT_MS: u64 = 250;

/// Create a picker for terminal image rendering.
///
/// Must run before the terminal enters the alternate screen, since it
/// queries the terminal over stdio.
pub fn create_picker(force_half_cell: bool) -> Option<Picker> {
    if force_half_cell {
        debug!("force_half_cell=true protocol=Halfblocks");
        return Some(Picker::halfblocks());
    }

    // Skip the stdio query on Windows: it can leave an orphaned reader
    // thread on the console input buffer.
    #[cfg(not(unix))]
    {
        return Some(Picker::halfblocks());
    }

    #[cfg(unix)]
    {
        let picker = Picker::from_query_stdio_with_options(query_options()).ok()?;
        debug!(
            term = %std::env::var("TERM").unwrap_or_else(|_| "<unset>".to_string()),
            protocol = ?picker.protocol_type(),
            "image picker ready"
        );
        Some(picker)
    }
}

/// Load an image slide's source.
///
/// Accepts `data:image/...;base64,` URIs, absolute paths, and paths relative
/// to `base_dir`. Remote URLs are not fetched.
///
/// # Errors
///
/// Returns an error for remote URLs, malformed data URIs, and files that
/// cannot be read or decoded.
pub fn load_image(base_dir: &Path, source: &str) -> Result<DynamicImage> {
    if let Some(data) = source.strip_prefix("data:") {
        return decode_data_uri(data);
    }
    if is_remote(source) {
        bail!("remote images are not fetched: {source}");
    }
    let path = resolve_path(base_dir, source);
    image::open(&path).with_context(|| format!("Error loading image {}", path.display()))
}

pub(crate) fn resolve_path(base_dir: &Path, source: &str) -> std::path::PathBuf {
    let source = source.strip_prefix("file://").unwrap_or(source);
    let path = Path::new(source);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn is_remote(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}

/// Decode the part of a data URI after `data:`.
fn decode_data_uri(data: &str) -> Result<DynamicImage> {
    let Some((meta, payload)) = data.split_once(',') else {
        bail!("malformed data URI");
    };
    if !meta.ends_with(";base64") {
        bail!("only base64 data URIs are supported");
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .context("invalid base64 in data URI")?;
    image::load_from_memory(&bytes).context("data URI is not a supported image")
}

#[cfg(unix)]
fn query_options() -> QueryStdioOptions {
    let mut options = QueryStdioOptions::default();
    options.timeout = Duration::from_millis(PICKER_QUERY_TIMEOUT_MS);
    options
}
