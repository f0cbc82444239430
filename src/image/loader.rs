//! Image loading and caching.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use anyhow::Result;
use image::DynamicImage;

/// Bounded cache of decoded images keyed by slide source, oldest evicted first.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<String, DynamicImage>,
    order: VecDeque<String>,
    max_size: usize,
}

impl ImageCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_size,
        }
    }

    pub fn get(&self, source: &str) -> Option<&DynamicImage> {
        self.entries.get(source)
    }

    pub fn insert(&mut self, source: String, image: DynamicImage) {
        if self.entries.insert(source.clone(), image).is_some() {
            return;
        }
        self.order.push_back(source);
        while self.entries.len() > self.max_size {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Loads image slides relative to the markdown file's directory.
#[derive(Debug)]
pub struct ImageLoader {
    cache: ImageCache,
    base_dir: PathBuf,
}

impl ImageLoader {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            cache: ImageCache::new(32),
            base_dir,
        }
    }

    /// Load an image, using the cache if available.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be resolved or decoded.
    pub fn load(&mut self, source: &str) -> Result<DynamicImage> {
        if let Some(img) = self.cache.get(source) {
            return Ok(img.clone());
        }
        let img = super::load_image(&self.base_dir, source)?;
        self.cache.insert(source.to_string(), img.clone());
        Ok(img)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Drop cached images, e.g. after the markdown file is reloaded.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
