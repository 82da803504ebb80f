//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use pressroom_core::{pipeline, sections};
use pressroom_core::pipeline::{Stage, StageObserver};
use pressroom_shared::{AppConfig, ArticleMeta, DocumentInput, init_config, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Pressroom — turn documents into publishable articles.
#[derive(Parser)]
#[command(
    name = "pressroom",
    version,
    about = "Convert DOCX, markdown, and HTML documents into publishable articles.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Convert a document into a publishable article.
    Convert {
        /// Input file (.docx, .md, .markdown, .txt, .html, .htm).
        input: PathBuf,

        /// Article title (defaults to the document title).
        #[arg(short, long)]
        title: Option<String>,

        /// Author byline (defaults to the document author, then config).
        #[arg(short, long)]
        author: Option<String>,

        /// Article category.
        #[arg(short, long)]
        category: Option<String>,

        /// Short excerpt (defaults to the first body paragraph).
        #[arg(long)]
        excerpt: Option<String>,

        /// Output HTML path (defaults to the input with an .html extension).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also write the full article record as a JSON sidecar.
        #[arg(long)]
        meta: bool,

        /// Emit a complete HTML document instead of a fragment.
        #[arg(long)]
        standalone: bool,

        /// Print the table of contents after converting.
        #[arg(long)]
        toc: bool,

        /// Do not reserve the first image as the hero.
        #[arg(long)]
        no_hero: bool,
    },

    /// Print the canonical markdown for a document.
    Normalize {
        /// Input file (.docx, .md, .markdown, .txt, .html, .htm).
        input: PathBuf,

        /// Output path (defaults to stdout).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show document structure without converting.
    Inspect {
        /// Input file (.docx, .md, .markdown, .txt, .html, .htm).
        input: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Convert {
            input,
            title,
            author,
            category,
            excerpt,
            out,
            meta,
            standalone,
            toc,
            no_hero,
        } => {
            let overrides = ArticleMeta {
                title,
                author,
                category,
                excerpt,
            };
            cmd_convert(&input, overrides, out, meta, standalone, toc, no_hero).await
        }
        Command::Normalize { input, out } => cmd_normalize(&input, out.as_deref()).await,
        Command::Inspect { input } => cmd_inspect(&input).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Input loading
// ---------------------------------------------------------------------------

/// Map an input path to a pipeline input by extension.
fn read_input(path: &Path) -> Result<DocumentInput> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "docx" => {
            let bytes = std::fs::read(path)
                .map_err(|e| eyre!("cannot read '{}': {e}", path.display()))?;
            Ok(DocumentInput::Binary(bytes))
        }
        "md" | "markdown" | "txt" | "html" | "htm" => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| eyre!("cannot read '{}': {e}", path.display()))?;
            Ok(DocumentInput::Markdown(text))
        }
        _ => Err(eyre!(
            "unsupported input '{}': expected .docx, .md, .markdown, .txt, .html, or .htm",
            path.display()
        )),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_convert(
    input: &Path,
    overrides: ArticleMeta,
    out: Option<PathBuf>,
    write_meta: bool,
    standalone: bool,
    print_toc: bool,
    no_hero: bool,
) -> Result<()> {
    let mut config = load_config()?;
    if no_hero {
        config.placement.reserve_hero = false;
    }

    let document = read_input(input)?;

    info!(input = %input.display(), "converting document");
    let progress = CliProgress::new();
    let article = pipeline::generate_with_observer(document, overrides, &config, &progress).await?;
    progress.finish();

    let out_path = out.unwrap_or_else(|| input.with_extension("html"));
    let html = if standalone {
        pressroom_render::standalone_page(&article.title, &article.html)
    } else {
        article.html.clone()
    };
    std::fs::write(&out_path, html)
        .map_err(|e| eyre!("cannot write '{}': {e}", out_path.display()))?;

    let meta_path = out_path.with_extension("json");
    if write_meta {
        let json = serde_json::to_string_pretty(&article)?;
        std::fs::write(&meta_path, json)
            .map_err(|e| eyre!("cannot write '{}': {e}", meta_path.display()))?;
    }

    println!();
    println!("  Article generated!");
    println!("  Title:     {}", article.title);
    println!("  Author:    {}", article.author);
    println!("  Category:  {}", article.category);
    println!("  Words:     {} ({})", article.word_count, article.read_time);
    println!("  Sections:  {}", article.toc.len());
    if let Some(hero) = &article.hero {
        println!("  Hero:      {}", hero.src);
    }
    println!("  Output:    {}", out_path.display());
    if write_meta {
        println!("  Metadata:  {}", meta_path.display());
    }
    println!();

    if print_toc {
        println!("  Contents:");
        for entry in &article.toc {
            println!("    #{:<28} {}", entry.id, entry.title);
        }
        println!();
    }

    Ok(())
}

async fn cmd_normalize(input: &Path, out: Option<&Path>) -> Result<()> {
    let markdown = match read_input(input)? {
        DocumentInput::Binary(buffer) => {
            let document = pressroom_extract::extract(&buffer).await?;
            pressroom_markdown::normalize(&document.content)
        }
        DocumentInput::Markdown(text) => pressroom_markdown::normalize(&text),
    };

    match out {
        Some(path) => {
            std::fs::write(path, &markdown)
                .map_err(|e| eyre!("cannot write '{}': {e}", path.display()))?;
            println!("Canonical markdown written to: {}", path.display());
        }
        None => print!("{markdown}"),
    }
    Ok(())
}

async fn cmd_inspect(input: &Path) -> Result<()> {
    let config = load_config()?;

    let (markdown, images, structure) = match read_input(input)? {
        DocumentInput::Binary(buffer) => {
            let document = pressroom_extract::extract(&buffer).await?;
            let markdown = pressroom_markdown::normalize(&document.content);
            (markdown, document.images, Some(document.structure))
        }
        DocumentInput::Markdown(text) => {
            let images = pressroom_extract::scan_markdown_images(&text);
            (pressroom_markdown::normalize(&text), images, None)
        }
    };

    let classified = sections::classify(&markdown);
    let structure = structure.unwrap_or_else(|| pipeline::derive_structure(&classified));
    let word_count = markdown.split_whitespace().count();
    let read_time = pressroom_render::read_time(word_count, config.render.words_per_minute);

    println!();
    println!("  Title:      {}", structure.title);
    if let Some(author) = &structure.author {
        println!("  Author:     {author}");
    }
    println!("  Words:      {word_count} ({read_time})");
    println!("  Paragraphs: {}", classified.paragraphs.len());
    println!("  Sections:   {}", classified.sections.len());
    println!("  Images:     {}", images.len());
    if !structure.headings.is_empty() {
        println!("  Headings:");
        for heading in &structure.headings {
            let indent = "  ".repeat(heading.level.saturating_sub(2) as usize);
            println!("    {indent}h{} {}", heading.level, heading.text);
        }
    }
    println!();
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress spinner
// ---------------------------------------------------------------------------

/// Spinner driven by pipeline stage events.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl StageObserver for CliProgress {
    fn stage_started(&self, stage: Stage) {
        self.spinner.set_message(stage.label());
    }
}
