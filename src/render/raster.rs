//! SVG rasterization with `resvg`.

use std::sync::Arc;

use image::DynamicImage;
use resvg::usvg::fontdb;

use super::RenderError;

/// Largest raster we are willing to allocate, per side.
const MAX_SIDE_PX: u32 = 8192;

/// Load the system fonts once; SVG text needs them to rasterize.
pub(super) fn system_fonts() -> Arc<fontdb::Database> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    Arc::new(db)
}

/// Rasterize an SVG string so its width matches `target_width_px`.
///
/// The vector is scaled directly to the display resolution, preserving the
/// aspect ratio, instead of rasterizing small and upscaling.
///
/// # Errors
///
/// Returns [`RenderError::Rasterize`] if the SVG cannot be parsed or has no
/// drawable area.
pub fn rasterize_svg(
    svg: &str,
    target_width_px: u32,
    fonts: Arc<fontdb::Database>,
) -> Result<DynamicImage, RenderError> {
    let opts = resvg::usvg::Options {
        fontdb: fonts,
        ..Default::default()
    };

    let tree = resvg::usvg::Tree::from_str(svg, &opts)
        .map_err(|err| RenderError::Rasterize(err.to_string()))?;
    let size = tree.size();
    if size.width() <= 0.0 || size.height() <= 0.0 {
        return Err(RenderError::Rasterize("empty SVG canvas".to_string()));
    }

    #[allow(clippy::cast_precision_loss)]
    let scale = target_width_px.clamp(1, MAX_SIDE_PX) as f32 / size.width();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let width = ((size.width() * scale).ceil() as u32).clamp(1, MAX_SIDE_PX);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let height = ((size.height() * scale).ceil() as u32).clamp(1, MAX_SIDE_PX);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        RenderError::Rasterize(format!("failed to create pixmap {width}x{height}"))
    })?;

    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let rgba = pixmap.data().to_vec();
    let img_buf = image::RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
        RenderError::Rasterize("failed to create image from pixmap data".to_string())
    })?;

    Ok(DynamicImage::ImageRgba8(img_buf))
}
