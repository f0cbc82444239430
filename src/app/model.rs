use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;
use tracing::{debug, info};

use crate::autohide::AutoHide;
use crate::config::DiagramTheme;
use crate::image::ImageLoader;
use crate::navigation::Navigator;
use crate::render::RenderTracker;
use crate::slides::{self, Slide, SlideCollection};

/// How long a toast stays on screen.
const TOAST_TTL_MS: u64 = 2500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at_ms: u64,
}

/// Where the markdown came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideSource {
    File(PathBuf),
    Stdin,
    Sample,
}

impl SlideSource {
    /// Short name for the header and messages.
    pub fn label(&self) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string()),
            Self::Stdin => "<stdin>".to_string(),
            Self::Sample => "sample".to_string(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Stdin | Self::Sample => None,
        }
    }

    /// Directory that relative image paths resolve against.
    pub fn base_dir(&self) -> PathBuf {
        self.path()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }
}

/// What the renderer worker reported about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererStatus {
    Starting,
    Ready(&'static str),
    Failed(String),
}

/// Display state of one diagram slide.
pub enum SlideRender {
    /// A request is in flight.
    Pending,
    Image(StatefulProtocol),
    Text(String),
    Failed { message: String, code: String },
}

impl std::fmt::Debug for SlideRender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("Pending"),
            Self::Image(_) => f.write_str("Image(..)"),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Failed { message, .. } => f.debug_struct("Failed").field("message", message).finish_non_exhaustive(),
        }
    }
}

/// Display state of one image slide.
pub enum ImageSlot {
    Loaded(StatefulProtocol),
    Unavailable(String),
}

/// The complete application state.
pub struct Model {
    pub source: SlideSource,
    pub slides: SlideCollection,
    pub navigator: Navigator,
    /// Controls (header, progress, hints) visibility.
    pub autohide: AutoHide,
    /// Timeout restored when auto-hide is toggled back on.
    pub auto_hide_timeout_ms: u64,
    pub tracker: RenderTracker,
    /// Diagram renders keyed by slide id.
    pub renders: HashMap<String, SlideRender>,
    /// Image slides keyed by slide id.
    pub images: HashMap<String, ImageSlot>,
    pub theme: DiagramTheme,
    pub renderer_status: RendererStatus,
    pub images_enabled: bool,
    pub picker: Option<Picker>,
    pub(super) image_loader: ImageLoader,
    pub watch_enabled: bool,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    pub help_visible: bool,
    pub should_quit: bool,
    /// Terminal size in cells.
    pub size: (u16, u16),
    /// Milliseconds since the session started, advanced by the event loop.
    pub clock_ms: u64,
    toast: Option<Toast>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("source", &self.source)
            .field("slides", &self.slides.len())
            .field("navigator", &self.navigator)
            .field("theme", &self.theme)
            .finish_non_exhaustive()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(SlideSource::Sample, SlideCollection::default(), (80, 24))
    }
}

impl Model {
    pub fn new(source: SlideSource, slides: SlideCollection, terminal_size: (u16, u16)) -> Self {
        let base_dir = source.base_dir();
        Self {
            navigator: Navigator::new(slides.len()),
            source,
            slides,
            autohide: AutoHide::disabled(),
            auto_hide_timeout_ms: 0,
            tracker: RenderTracker::new(),
            renders: HashMap::new(),
            images: HashMap::new(),
            theme: DiagramTheme::default(),
            renderer_status: RendererStatus::Starting,
            images_enabled: true,
            picker: None,
            image_loader: ImageLoader::new(base_dir),
            watch_enabled: false,
            config_global_path: None,
            config_local_path: None,
            help_visible: false,
            should_quit: false,
            size: terminal_size,
            clock_ms: 0,
            toast: None,
        }
    }

    #[must_use]
    pub fn with_picker(mut self, picker: Option<Picker>) -> Self {
        self.picker = picker;
        self
    }

    /// Configure auto-hide. Zero keeps the controls always visible.
    #[must_use]
    pub fn with_auto_hide(mut self, timeout_ms: u64) -> Self {
        self.auto_hide_timeout_ms = timeout_ms;
        self.autohide = AutoHide::new(timeout_ms, self.clock_ms);
        self
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.navigator.current().and_then(|i| self.slides.get(i))
    }

    /// Whether header, progress and hints should be drawn.
    pub const fn controls_visible(&self) -> bool {
        self.help_visible || self.autohide.is_visible()
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at_ms: self.clock_ms.saturating_add(TOAST_TTL_MS),
        });
    }

    /// Drop the toast once its time is up. Returns whether it was removed.
    pub(super) fn expire_toast(&mut self) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at_ms <= self.clock_ms)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Forget every render and loaded image, e.g. after a theme change or reload.
    pub(super) fn invalidate_renders(&mut self) {
        self.tracker.clear();
        self.renders.clear();
    }

    /// Replace the collection with one extracted from `text`.
    ///
    /// When nothing is found the previous collection stays and an error
    /// toast is shown.
    pub fn reload_from_text(&mut self, text: &str) -> bool {
        match slides::extract_required(text) {
            Ok(collection) => {
                info!(
                    source = %self.source.label(),
                    slides = collection.len(),
                    "reloaded slides"
                );
                self.navigator.set_len(collection.len());
                self.slides = collection;
                self.invalidate_renders();
                self.images.clear();
                self.image_loader.clear_cache();
                self.autohide.on_activity(self.clock_ms);
                true
            }
            Err(err) => {
                debug!(source = %self.source.label(), "reload kept previous slides: {err}");
                self.show_toast(
                    ToastLevel::Error,
                    format!("{err} in {}", self.source.label()),
                );
                false
            }
        }
    }

    /// Re-read the source file and reload.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is not a file or cannot be read.
    pub(super) fn reload_from_disk(&mut self) -> Result<bool> {
        let path = self
            .source
            .path()
            .context("only file sources can be reloaded")?
            .to_path_buf();
        let bytes =
            std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(self.reload_from_text(&slides::decode_source(bytes)))
    }
}
