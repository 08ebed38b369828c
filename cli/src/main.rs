//! docweave CLI - structured document generation tool
//!
//! A command-line tool for generating DOCX documents from JSON content or
//! from the bundled project report.

mod report;

use clap::{Args, Parser, Subcommand};
use colored::*;
use docweave::{render, Document, RenderOptions};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default output path of the bundled report.
const DEFAULT_REPORT_PATH: &str = "docs/miVoto_documentacion.docx";

/// Structured document generation to DOCX and Markdown
#[derive(Parser)]
#[command(
    name = "docweave",
    author = "iyulab",
    version,
    about = "Generate DOCX documents from structured content",
    long_about = "docweave - Structured document builder.\n\n\
                  Builds headings, paragraphs and lists into DOCX files.\n\n\
                  Usage:\n  \
                  docweave report                   Generate the bundled project report\n  \
                  docweave build <content.json> -o <out.docx>\n  \
                  docweave md <content.json>        Render to Markdown"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the bundled miVoto project report
    Report {
        /// Output file path
        #[arg(short, long, default_value = DEFAULT_REPORT_PATH)]
        output: PathBuf,
    },

    /// Build a DOCX file from a JSON array of blocks
    Build {
        /// JSON content file
        input: PathBuf,

        /// Output file path (default: <input>.docx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render content to Markdown
    #[command(visible_alias = "md")]
    Markdown {
        #[command(flatten)]
        source: Source,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include YAML frontmatter with metadata
        #[arg(short, long)]
        frontmatter: bool,

        /// Maximum heading level (1-6)
        #[arg(long, default_value = "6")]
        max_heading: u8,
    },

    /// Show document statistics
    Info {
        #[command(flatten)]
        source: Source,
    },

    /// Show version information
    Version,
}

/// Where the content comes from.
#[derive(Args)]
struct Source {
    /// JSON content file
    #[arg(required_unless_present = "report", conflicts_with = "report")]
    input: Option<PathBuf>,

    /// Use the bundled project report
    #[arg(long)]
    report: bool,
}

impl Source {
    fn load(&self) -> Result<Document, Box<dyn std::error::Error>> {
        match self.input {
            Some(ref path) if !self.report => load_json(path),
            _ => Ok(report::build_report(&chrono::Local::now())?),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Report { output } => {
            let pb = create_spinner("Building report...");

            let doc = report::build_report(&chrono::Local::now())?;
            pb.set_message("Writing DOCX...");

            ensure_parent(&output)?;
            doc.save(&output)?;

            pb.finish_and_clear();
            println!("Documento generado en {}", output.display());
        }

        Commands::Build { input, output } => {
            let pb = create_spinner("Reading content...");

            let doc = load_json(&input)?;
            pb.set_message("Writing DOCX...");

            let output = output.unwrap_or_else(|| input.with_extension("docx"));
            ensure_parent(&output)?;
            let sealed = doc.save(&output)?;

            pb.finish_and_clear();
            println!(
                "{} Built {} blocks: {}",
                "✓".green().bold(),
                sealed.len(),
                output.display()
            );
        }

        Commands::Markdown {
            source,
            output,
            frontmatter,
            max_heading,
        } => {
            let pb = create_spinner("Loading content...");

            let doc = source.load()?;
            pb.set_message("Rendering to Markdown...");

            let mut options = RenderOptions::default().with_max_heading_level(max_heading);
            if frontmatter {
                options = options.with_frontmatter();
            }

            let markdown = render::render_markdown(&doc, &options)?;

            pb.finish_and_clear();
            write_output(output.as_deref(), &markdown)?;

            if let Some(path) = output {
                println!(
                    "{} Converted to Markdown: {}",
                    "✓".green().bold(),
                    path.display()
                );
            }
        }

        Commands::Info { source } => {
            let pb = create_spinner("Analyzing content...");
            let doc = source.load()?;
            pb.finish_and_clear();

            print_info(&doc);
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn load_json(path: &Path) -> Result<Document, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    Ok(Document::from_json(&content)?)
}

/// Creates the parent directory of an output path if it is missing.
fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn print_info(doc: &Document) {
    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40));
    if let Some(title) = doc.title() {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }

    let text = doc.plain_text();
    println!("\n{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Blocks".bold(), doc.len());
    println!("{}: {}", "Headings".bold(), doc.heading_count());
    println!("{}: {}", "Paragraphs".bold(), doc.paragraph_count());
    println!("{}: {}", "List items".bold(), doc.list_item_count());
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), text.chars().count());
}

fn print_version() {
    println!("{} {}", "docweave".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Structured document generation to DOCX and Markdown");
    println!();
    println!("Repository: https://github.com/iyulab/docweave");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write!(handle, "{}", content)?;
        }
    }
    Ok(())
}
