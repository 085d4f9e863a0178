//! kiroku command-line tool.
//!
//! Usage:
//!   # Convert between the plain-text and structured forms
//!   kiroku convert notes.md --to json
//!   kiroku convert notes.json --to text
//!
//!   # List blocks with kind, indent and list numbering
//!   kiroku show notes.md
//!
//!   # Apply a scripted session to notes.{md,json} and save
//!   kiroku replay notes script.json

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt};

use kiroku_doc::Document;
use kiroku_editor::{EditorConfig, EditorSession, FileStore, SaveStatus, Step};

#[derive(Parser, Debug)]
#[command(name = "kiroku")]
#[command(about = "Inspect, convert and edit kiroku block documents")]
struct Args {
    /// Editor config (RON). Defaults to the user config dir.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a document in the other persisted form
    Convert {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        to: Format,
    },
    /// List blocks
    Show { file: PathBuf },
    /// Apply a JSON list of session steps to a stored document
    Replay {
        /// Document path without extension; reads and writes `<stem>.md` and `<stem>.json`
        doc: PathBuf,
        script: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Convert { file, to } => {
            let doc = read_document(&file)?;
            let out = match to {
                Format::Text => kiroku_doc::to_text(&doc),
                Format::Json => serde_json::to_string_pretty(&kiroku_doc::to_structured(&doc))?,
            };
            println!("{out}");
        }
        Command::Show { file } => {
            let doc = read_document(&file)?;
            print!("{}", render_listing(&doc));
        }
        Command::Replay { doc, script } => {
            let config = load_config(args.config.as_deref())?;
            replay(config, &doc, &script)?;
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match EditorConfig::default_path() {
            Some(path) => path,
            None => return Ok(EditorConfig::default()),
        },
    };
    EditorConfig::load(&path).with_context(|| format!("loading config {}", path.display()))
}

/// `.json` files are read as the structured form, anything else as text.
fn read_document(path: &Path) -> Result<Document> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    Ok(if is_json {
        kiroku_doc::load(Some(&content), None)
    } else {
        kiroku_doc::from_text(&content)
    })
}

fn render_listing(doc: &Document) -> String {
    let mut out = String::new();
    for ((index, block), ordinal) in doc.blocks().iter().enumerate().zip(doc.ordinals()) {
        let marker = match ordinal {
            Some(n) => format!("{n}."),
            None => String::new(),
        };
        let checked = if block.kind == kiroku_types::BlockKind::Todo {
            if block.checked { " [x]" } else { " [ ]" }
        } else {
            ""
        };
        out.push_str(&format!(
            "{index:>3}  {:<9} {}{marker:>4}{checked} {}\n",
            block.kind.as_str(),
            "  ".repeat(block.indent as usize),
            block.text
        ));
    }
    out
}

fn replay(config: EditorConfig, doc: &Path, script: &Path) -> Result<()> {
    let steps: Vec<Step> = {
        let raw = std::fs::read_to_string(script)
            .with_context(|| format!("reading script {}", script.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing script {}", script.display()))?
    };

    let store = FileStore::for_path(&doc.with_extension("md"));
    let mut session = EditorSession::open(config, store);
    for (i, step) in steps.iter().enumerate() {
        tracing::debug!(step = i, ?step, "replay");
        session.run(step);
    }
    session.save_now();

    match session.save_status() {
        SaveStatus::Error(msg) => bail!("save failed: {msg}"),
        status => tracing::info!(
            ?status,
            blocks = session.document().len(),
            path = %session.adapter().text_path().display(),
            "replayed {} steps",
            steps.len()
        ),
    }
    session.dispose();
    Ok(())
}
