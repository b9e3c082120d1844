//! markdiff CLI
//!
//! Diffs two markup documents into an instruction document, applies instruction documents,
//! and checks that a diff round-trips.

mod config;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use config::Config;
use markup::debug::{outline_diff_tree, outline_document};
use markup::dom_snapshot::{DomSnapshotOptions, compare_dom};
use markup::{
    Document, IdentityAttributes, InstructionDocument, TreeBuilderConfig, apply, count_nodes,
    diff, parse_document_with, serialize, to_markup,
};
use mimalloc::MiMalloc;
use std::path::{Path, PathBuf};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const OUTLINE_CAP: usize = 200;

#[derive(Parser)]
#[command(name = "markdiff")]
#[command(about = "Structural diff and patch for markup documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, help = "Path to a TOML configuration file")]
    config: Option<PathBuf>,

    /// Attribute that identifies an element across versions (repeatable)
    #[arg(long = "identity", global = true, value_name = "ATTR")]
    identity: Vec<String>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the instruction document turning BEFORE into AFTER
    Diff {
        before: PathBuf,
        after: PathBuf,
        #[arg(short, long, help = "Write to a file instead of stdout")]
        output: Option<PathBuf>,
    },
    /// Apply an instruction document to TARGET and print the result
    Apply {
        patch: PathBuf,
        target: PathBuf,
        #[arg(short, long, help = "Write to a file instead of stdout")]
        output: Option<PathBuf>,
    },
    /// Diff, serialize, re-read, apply, and compare against AFTER
    Check { before: PathBuf, after: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    }
    .with_identity(&cli.identity);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter(cli.verbose)),
    )
    .init();

    match &cli.command {
        Commands::Diff {
            before,
            after,
            output,
        } => {
            let patch = diff_files(&config, before, after)?;
            emit(output.as_deref(), &patch.to_markup())
        }
        Commands::Apply {
            patch,
            target,
            output,
        } => {
            let text = read(patch)?;
            let patch = InstructionDocument::parse(&text)
                .with_context(|| format!("failed to parse {}", patch.display()))?;
            let mut document = load(&config, target)?;
            apply(&patch, &mut document)
                .with_context(|| format!("failed to apply to {}", target.display()))?;
            emit(output.as_deref(), &to_markup(&document))
        }
        Commands::Check { before, after } => check(&config, before, after),
    }
}

fn diff_files(config: &Config, before: &Path, after: &Path) -> Result<InstructionDocument> {
    let policy = IdentityAttributes::new(config.identity_attributes.iter().cloned());
    log::debug!("identity attributes: {:?}", policy.names());
    let before_doc = load(config, before)?;
    let after_doc = load(config, after)?;
    let tree = diff(&policy, &before_doc, &after_doc).with_context(|| {
        format!("failed to diff {} against {}", before.display(), after.display())
    })?;
    if log::log_enabled!(log::Level::Debug) {
        for line in outline_diff_tree(&tree, OUTLINE_CAP) {
            log::debug!("{line}");
        }
    }
    log::info!("{} instructions", tree.instruction_count());
    Ok(serialize(&tree))
}

fn check(config: &Config, before: &Path, after: &Path) -> Result<()> {
    let patch = diff_files(config, before, after)?;
    let reread = InstructionDocument::parse(&patch.to_markup())
        .context("serialized instruction document does not read back")?;
    let mut patched = load(config, before)?;
    apply(&reread, &mut patched).context("instruction document does not apply")?;
    let expected = load(config, after)?;
    if let Err(mismatch) = compare_dom(&expected, &patched, DomSnapshotOptions::default()) {
        bail!("patched document differs from {}:\n{mismatch}", after.display());
    }
    println!(
        "ok: {} -> {} round-trips",
        before.display(),
        after.display()
    );
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load(config: &Config, path: &Path) -> Result<Document> {
    let builder = TreeBuilderConfig {
        keep_whitespace_text: config.keep_whitespace_text,
    };
    let document = parse_document_with(&read(path)?, builder)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    log::info!("{}: {} nodes", path.display(), count_nodes(&document));
    if log::log_enabled!(log::Level::Trace) {
        for line in outline_document(&document, OUTLINE_CAP) {
            log::trace!("{line}");
        }
    }
    Ok(document)
}

fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
