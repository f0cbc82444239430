//! Live reload of the markdown file.
//!
//! Uses `notify` on the file's parent directory (editors often replace the
//! file rather than write it in place) and debounces bursts of events.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

/// Watches one markdown file and reports settled changes.
pub struct MarkdownWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    target: WatchTarget,
    debounce_ms: u64,
    last_change_ms: Option<u64>,
}

/// Which event paths concern the watched file.
#[derive(Debug, Clone)]
struct WatchTarget {
    dir: PathBuf,
    path: PathBuf,
    name: Option<OsString>,
}

impl WatchTarget {
    fn new(path: &Path) -> Self {
        // Event paths from the OS are canonical; match against the same form.
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let name = path.file_name().map(ToOwned::to_owned);
        Self { dir, path, name }
    }

    fn matches(&self, event: &Event) -> bool {
        event.paths.iter().any(|p| {
            p == &self.path
                || p == &self.dir
                || self
                    .name
                    .as_deref()
                    .is_some_and(|name| p.file_name() == Some(name))
        })
    }
}

impl MarkdownWatcher {
    /// Start watching `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform watcher cannot be created.
    pub fn new(path: &Path, debounce_ms: u64) -> notify::Result<Self> {
        let target = WatchTarget::new(path);
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&target.dir, RecursiveMode::NonRecursive)?;
        debug!(path = %target.path.display(), "watching for changes");
        Ok(Self {
            _watcher: watcher,
            rx,
            target,
            debounce_ms,
            last_change_ms: None,
        })
    }

    pub fn target_path(&self) -> &Path {
        &self.target.path
    }

    /// Drain pending events; true once changes have been quiet for the
    /// debounce window.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.target.matches(&ev) => self.last_change_ms = Some(now_ms),
                Ok(_) => {}
                Err(err) => warn!("file watcher error: {err}"),
            }
        }
        self.settled(now_ms)
    }

    fn settled(&mut self, now_ms: u64) -> bool {
        match self.last_change_ms {
            Some(at) if now_ms.saturating_sub(at) >= self.debounce_ms => {
                self.last_change_ms = None;
                true
            }
            _ => false,
        }
    }
}
