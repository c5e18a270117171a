use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use wxmd::{
    sanitize_clipboard_html, ClipboardPayload, CmarkRenderer, Config, DraftStore, EditorSession,
    FileDraftStore, MarkdownGenerator, MemoryDraftStore, Proofer, TextBuffer,
};

#[derive(Parser)]
#[command(version, about = "Convert between Markdown and WeChat editor HTML", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, env = "WXMD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render Markdown and proof it into paste-ready HTML
    Preview {
        /// Markdown file (stdin when omitted)
        file: Option<PathBuf>,

        /// Directory keeping the last previewed draft
        #[arg(long, env = "WXMD_DRAFTS")]
        drafts: Option<PathBuf>,

        /// Write the HTML here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Proof an already rendered HTML document
    Proof {
        /// HTML file (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Convert HTML to Markdown
    Markdown {
        /// HTML file (stdin when omitted)
        file: Option<PathBuf>,

        /// Skip clipboard sanitization
        #[arg(long)]
        raw: bool,
    },
    /// Paste clipboard content into a Markdown buffer and print the result
    Paste(PasteArgs),
}

#[derive(Args)]
struct PasteArgs {
    #[command(flatten)]
    source: PasteSource,

    /// Markdown file receiving the paste (empty buffer when omitted)
    #[arg(long)]
    into: Option<PathBuf>,

    /// Byte offset of the cursor (end of the buffer when omitted)
    #[arg(long)]
    at: Option<usize>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct PasteSource {
    /// File holding the text/html clipboard flavor
    #[arg(long)]
    html: Option<PathBuf>,

    /// File holding the text/plain clipboard flavor
    #[arg(long)]
    text: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("WXMD_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Preview {
            file,
            drafts,
            output,
        } => {
            let markdown = read_input(file.as_deref())?;
            let html = match drafts {
                Some(dir) => preview(FileDraftStore::new(dir), &config, &markdown),
                None => preview(MemoryDraftStore::new(), &config, &markdown),
            };
            write_output(output.as_deref(), &html)?;
        }
        Commands::Proof { file } => {
            let html = read_input(file.as_deref())?;
            let proofed = Proofer::with_options(config.proof).proof(&html);
            write_output(None, &proofed)?;
        }
        Commands::Markdown { file, raw } => {
            let mut html = read_input(file.as_deref())?;
            if !raw {
                html = sanitize_clipboard_html(&html);
            }
            let markdown = MarkdownGenerator::with_options(config.markdown).generate(&html);
            write_output(None, &markdown)?;
        }
        Commands::Paste(args) => {
            let payload = match (&args.source.html, &args.source.text) {
                (Some(path), _) => ClipboardPayload::html(read_file(path)?),
                (None, Some(path)) => ClipboardPayload::text(read_file(path)?),
                (None, None) => anyhow::bail!("one of --html or --text is required"),
            };
            let existing = match &args.into {
                Some(path) => read_file(path)?,
                None => String::new(),
            };
            let mut buffer = TextBuffer::new(existing);
            if let Some(offset) = args.at {
                buffer = buffer.with_cursor(offset);
            }

            let session = EditorSession::with_config(CmarkRenderer::new(), MemoryDraftStore::new(), &config);
            session.handle_paste(&payload, &mut buffer);
            debug!(cursor = buffer.cursor(), "paste applied");
            write_output(None, buffer.text())?;
        }
    }

    Ok(())
}

fn preview<S: DraftStore>(store: S, config: &Config, markdown: &str) -> String {
    let mut session = EditorSession::with_config(CmarkRenderer::new(), store, config);
    let mut html = String::new();
    session.render_preview(&mut html, markdown);
    html
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => read_file(path),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

fn write_output(file: Option<&Path>, content: &str) -> Result<()> {
    match file {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}
