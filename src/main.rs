//! mermaid-slides - present the mermaid diagrams and images of a markdown
//! file as terminal slides.
//!
//! # Usage
//!
//! ```bash
//! mermaid-slides docs/architecture.md
//! mermaid-slides --watch --theme dark docs/architecture.md
//! cat notes.md | mermaid-slides -
//! mermaid-slides --list docs/architecture.md
//! ```

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use mermaid_slides::app::{self, App, SlideSource};
use mermaid_slides::config::{
    ConfigFlags, DiagramTheme, RendererChoice, clear_config_flags, global_config_path,
    load_config_flags, local_override_path, parse_flag_tokens, save_config_flags,
};
use mermaid_slides::slides::{self, SAMPLE_MARKDOWN};

/// Environment variable naming a log file, like `--log-file`.
const LOG_FILE_ENV: &str = "MERMAID_SLIDES_LOG";

/// Present mermaid diagrams and images from a markdown file as slides
#[derive(Parser, Debug)]
#[command(name = "mermaid-slides", version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Markdown file to present (`-` reads standard input)
    #[arg(value_name = "FILE", required_unless_present_any = ["sample", "save", "clear"])]
    file: Option<PathBuf>,

    /// Present the built-in sample document
    #[arg(long, conflicts_with = "file")]
    sample: bool,

    /// Open files without a markdown extension
    #[arg(long)]
    force: bool,

    /// Print the extracted slides as JSON and exit
    #[arg(long)]
    list: bool,

    /// Watch the file for changes and reload
    #[arg(long)]
    watch: bool,

    /// Disable terminal graphics (placeholders and diagram source only)
    #[arg(long)]
    no_images: bool,

    /// Diagram theme passed to the renderer
    #[arg(long, value_enum)]
    theme: Option<DiagramTheme>,

    /// Diagram renderer
    #[arg(long, value_enum)]
    renderer: Option<RendererChoice>,

    /// Hide the controls after this many idle milliseconds
    #[arg(long, value_name = "MS")]
    auto_hide: Option<u64>,

    /// Keep the controls visible
    #[arg(long)]
    no_auto_hide: bool,

    /// Force image rendering to use half-cell fallback mode
    #[arg(long)]
    force_half_cell: bool,

    /// Write logs to a file (the terminal is busy while presenting)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mermaid_slides=debug"));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
            // Writing to stderr would scribble over the presentation.
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr.with_filter(|_| !app::ui_active()))
                .init();
        }
    }
    Ok(())
}

fn read_input(cli: &Cli) -> Result<(SlideSource, String)> {
    if cli.sample {
        return Ok((SlideSource::Sample, SAMPLE_MARKDOWN.to_string()));
    }
    let Some(file) = &cli.file else {
        bail!("No input file given");
    };
    if file.as_os_str() == "-" {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read standard input")?;
        return Ok((SlideSource::Stdin, slides::decode_source(bytes)));
    }
    if !file.exists() {
        bail!("File not found: {}", file.display());
    }
    if !cli.force && !slides::is_markdown_file(file) {
        bail!(
            "{} does not look like markdown (.md, .markdown, .txt); use --force to open it anyway",
            file.display()
        );
    }
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    Ok((SlideSource::File(file.clone()), slides::decode_source(bytes)))
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    let log_file = effective
        .log_file
        .clone()
        .or_else(|| std::env::var_os(LOG_FILE_ENV).map(PathBuf::from));
    init_logging(log_file.as_deref())?;

    if cli.file.is_none() && !cli.sample {
        // Only --save / --clear were requested.
        return Ok(());
    }

    let (source, text) = read_input(&cli)?;
    let Ok(collection) = slides::extract_required(&text) else {
        bail!("No diagrams or images found in {}", source.label());
    };
    tracing::info!(
        source = %source.label(),
        diagrams = collection.diagram_count(),
        images = collection.image_count(),
        "extracted slides"
    );

    if cli.list {
        println!("{}", serde_json::to_string_pretty(&collection)?);
        return Ok(());
    }

    // Without terminal graphics a rasterized diagram has nowhere to go.
    let renderer = if effective.no_images {
        RendererChoice::Source
    } else {
        effective.renderer.unwrap_or_default()
    };

    let mut app = App::new(source, collection)
        .with_theme(effective.theme.unwrap_or_default())
        .with_renderer(renderer)
        .with_auto_hide(effective.auto_hide_timeout_ms())
        .with_watch(effective.watch)
        .with_images_enabled(!effective.no_images)
        .with_force_half_cell(effective.force_half_cell)
        .with_config_paths(Some(global_path), local_path.exists().then_some(local_path));

    app.run().context("Application error")
}
