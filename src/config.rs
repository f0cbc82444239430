//! Saved default flags.
//!
//! Config files hold command-line flag tokens, one or more per line, with
//! `#` comments. The global file is merged with a local `.mermaid-slidesrc`
//! and then with the actual command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::autohide::DEFAULT_TIMEOUT_MS;

/// Named visual theme forwarded to the diagram renderer as is.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiagramTheme {
    #[default]
    Default,
    Dark,
    Forest,
    Base,
    Neutral,
}

impl DiagramTheme {
    pub const ALL: [Self; 5] = [
        Self::Default,
        Self::Dark,
        Self::Forest,
        Self::Base,
        Self::Neutral,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dark => "dark",
            Self::Forest => "forest",
            Self::Base => "base",
            Self::Neutral => "neutral",
        }
    }

    /// The theme after this one, wrapping around.
    pub fn cycle(self) -> Self {
        let pos = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }
}

/// Which diagram renderer to use.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererChoice {
    /// Mermaid CLI when available, otherwise the diagram source.
    #[default]
    Auto,
    /// Always the mermaid CLI (`mmdc`).
    Mmdc,
    /// Show diagram source text only.
    Source,
}

impl RendererChoice {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Mmdc => "mmdc",
            Self::Source => "source",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub no_images: bool,
    pub no_auto_hide: bool,
    pub force_half_cell: bool,
    pub theme: Option<DiagramTheme>,
    pub renderer: Option<RendererChoice>,
    pub auto_hide_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            no_images: self.no_images || other.no_images,
            no_auto_hide: self.no_auto_hide || other.no_auto_hide,
            force_half_cell: self.force_half_cell || other.force_half_cell,
            theme: other.theme.or(self.theme),
            renderer: other.renderer.or(self.renderer),
            auto_hide_ms: other.auto_hide_ms.or(self.auto_hide_ms),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }

    /// Auto-hide window in milliseconds; 0 when disabled.
    pub fn auto_hide_timeout_ms(&self) -> u64 {
        if self.no_auto_hide {
            0
        } else {
            self.auto_hide_ms.unwrap_or(DEFAULT_TIMEOUT_MS)
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("mermaid-slides").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("mermaid-slides")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("mermaid-slides").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("mermaid-slides")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".mermaid-slidesrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(split_line)
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# mermaid-slides defaults (saved with --save)".to_string()];
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.no_images {
        lines.push("--no-images".to_string());
    }
    if flags.no_auto_hide {
        lines.push("--no-auto-hide".to_string());
    }
    if flags.force_half_cell {
        lines.push("--force-half-cell".to_string());
    }
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {}", theme.as_str()));
    }
    if let Some(renderer) = flags.renderer {
        lines.push(format!("--renderer {}", renderer.as_str()));
    }
    if let Some(ms) = flags.auto_hide_ms {
        lines.push(format!("--auto-hide {ms}"));
    }
    if let Some(path) = &flags.log_file {
        let path = path.display().to_string();
        if path.contains(char::is_whitespace) {
            lines.push(format!("--log-file \"{path}\""));
        } else {
            lines.push(format!("--log-file {path}"));
        }
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// Split a config line on whitespace; double quotes group a token.
fn split_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_token = false;
    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick known flags out of a token list; unknown tokens are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        // Valued flags take `--flag value` or `--flag=value`.
        let mut value = || {
            inline_value.map(ToOwned::to_owned).or_else(|| {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            })
        };
        match name {
            "--watch" => flags.watch = true,
            "--no-images" => flags.no_images = true,
            "--no-auto-hide" => flags.no_auto_hide = true,
            "--force-half-cell" => flags.force_half_cell = true,
            "--theme" => {
                if let Some(v) = value() {
                    flags.theme = parse_theme(&v);
                }
            }
            "--renderer" => {
                if let Some(v) = value() {
                    flags.renderer = parse_renderer(&v);
                }
            }
            "--auto-hide" => {
                if let Some(v) = value() {
                    flags.auto_hide_ms = v.parse().ok();
                }
            }
            "--log-file" => {
                if let Some(v) = value() {
                    flags.log_file = Some(PathBuf::from(v));
                }
            }
            _ => {}
        }
        i += 1;
    }
    flags
}

fn parse_theme(s: &str) -> Option<DiagramTheme> {
    DiagramTheme::ALL.into_iter().find(|t| t.as_str() == s)
}

fn parse_renderer(s: &str) -> Option<RendererChoice> {
    match s {
        "auto" => Some(RendererChoice::Auto),
        "mmdc" => Some(RendererChoice::Mmdc),
        "source" => Some(RendererChoice::Source),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = tokens(&[
            "mermaid-slides",
            "--watch",
            "--no-images",
            "--theme",
            "forest",
            "--renderer=source",
            "--auto-hide",
            "1500",
            "--log-file=slides.log",
            "deck.md",
        ]);
        let flags = parse_flag_tokens(&args);
        assert!(flags.watch);
        assert!(flags.no_images);
        assert_eq!(flags.theme, Some(DiagramTheme::Forest));
        assert_eq!(flags.renderer, Some(RendererChoice::Source));
        assert_eq!(flags.auto_hide_ms, Some(1500));
        assert_eq!(flags.log_file, Some(PathBuf::from("slides.log")));
    }

    #[test]
    fn test_parse_flag_tokens_ignores_unknown_values() {
        let flags = parse_flag_tokens(&tokens(&["--theme", "sepia", "--auto-hide=soon"]));
        assert_eq!(flags.theme, None);
        assert_eq!(flags.auto_hide_ms, None);
    }

    #[test]
    fn test_auto_hide_timeout_resolution() {
        assert_eq!(ConfigFlags::default().auto_hide_timeout_ms(), DEFAULT_TIMEOUT_MS);
        let flags = ConfigFlags {
            auto_hide_ms: Some(800),
            ..ConfigFlags::default()
        };
        assert_eq!(flags.auto_hide_timeout_ms(), 800);
        let flags = ConfigFlags {
            auto_hide_ms: Some(800),
            no_auto_hide: true,
            ..ConfigFlags::default()
        };
        assert_eq!(flags.auto_hide_timeout_ms(), 0);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            watch: true,
            theme: Some(DiagramTheme::Dark),
            auto_hide_ms: Some(5000),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            no_images: true,
            theme: Some(DiagramTheme::Neutral),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.watch);
        assert!(merged.no_images);
        assert_eq!(merged.theme, Some(DiagramTheme::Neutral));
        assert_eq!(merged.auto_hide_ms, Some(5000));
    }

    #[test]
    fn test_theme_cycle_wraps() {
        assert_eq!(DiagramTheme::Default.cycle(), DiagramTheme::Dark);
        assert_eq!(DiagramTheme::Neutral.cycle(), DiagramTheme::Default);
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config");
        let flags = ConfigFlags {
            watch: true,
            no_images: true,
            no_auto_hide: true,
            force_half_cell: true,
            theme: Some(DiagramTheme::Base),
            renderer: Some(RendererChoice::Mmdc),
            auto_hide_ms: Some(4200),
            log_file: Some(PathBuf::from("slides.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }

    #[test]
    fn test_log_file_with_spaces_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config");
        let flags = ConfigFlags {
            log_file: Some(PathBuf::from("/tmp/My Logs/slides.log")),
            theme: Some(DiagramTheme::Dark),
            ..ConfigFlags::default()
        };

        save_config_flags(&path, &flags).unwrap();
        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.contains("--log-file \"/tmp/My Logs/slides.log\""));
        assert_eq!(load_config_flags(&path).unwrap(), flags);
    }

    #[test]
    fn test_split_line_groups_quoted_tokens() {
        assert_eq!(split_line("--watch  --theme dark"), ["--watch", "--theme", "dark"]);
        assert_eq!(split_line(r#"--log-file "a b.log""#), ["--log-file", "a b.log"]);
        assert_eq!(split_line(r#"--log-file="" x"#), ["--log-file=", "x"]);
    }
}
