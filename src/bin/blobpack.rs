//! Blobpack CLI
//!
//! Pack a manifest into an archive, list an archive's tags, or pull one
//! entry back out.

use anyhow::{bail, Context, Result};
use blobpack::{build_from_manifest, Archive, BuildOptions, FileSourceLoader, Manifest, PackConfig};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "blobpack")]
#[command(about = "Pack named resources into a single archive and read them back")]
struct Args {
    /// TOML configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Emit per-entry debug events
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build an archive from a manifest file or inline JSON
    Pack {
        /// Manifest path, or a JSON object mapping tags to locators
        manifest: String,

        /// Output archive path
        #[arg(short = 'o', long)]
        output: PathBuf,
    },

    /// List the tags recorded in an archive
    List {
        archive: PathBuf,

        /// Also print byte ranges and sizes
        #[arg(short = 'l', long)]
        long: bool,
    },

    /// Write one entry's payload to a file or stdout
    Extract {
        archive: PathBuf,

        tag: String,

        /// Output file (stdout when omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

fn load_config(args: &Args) -> Result<PackConfig> {
    let mut config = match &args.config {
        Some(path) => PackConfig::from_path(path)
            .with_context(|| format!("failed to read config {:?}", path))?,
        None => PackConfig::default(),
    };
    if args.verbose {
        config.log.debug_output = true;
    }
    Ok(config)
}

fn pack(config: &PackConfig, options: &BuildOptions, manifest: &str, output: &Path) -> Result<()> {
    let manifest = Manifest::resolve(manifest).context("failed to load manifest")?;

    let base_dir = config
        .pack
        .base_dir
        .clone()
        .or_else(|| manifest.base_dir().map(PathBuf::from));
    let loader = match base_dir {
        Some(dir) => FileSourceLoader::with_base_dir(dir),
        None => FileSourceLoader::new(),
    };

    let archive = build_from_manifest(&manifest, loader, options).context("build failed")?;
    archive
        .write_to(output)
        .with_context(|| format!("failed to write {:?}", output))?;

    if config.log.console {
        info!("Packed {} entries into {:?}", archive.len(), output);
    }
    Ok(())
}

fn list(options: &BuildOptions, path: &Path, long: bool) -> Result<()> {
    let archive = Archive::open(path, options).with_context(|| format!("failed to open {:?}", path))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for entry in archive.entries() {
        if long {
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                entry.tag(),
                entry.start(),
                entry.end(),
                entry.len()
            )?;
        } else {
            writeln!(out, "{}", entry.tag())?;
        }
    }
    Ok(())
}

fn extract(options: &BuildOptions, path: &Path, tag: &str, output: Option<&Path>) -> Result<()> {
    let archive = Archive::open(path, options).with_context(|| format!("failed to open {:?}", path))?;
    if !archive.contains(tag) {
        bail!("tag '{}' not found in {:?}", tag, path);
    }
    let data = archive.get(tag)?;

    match output {
        Some(file) => {
            std::fs::write(file, &data).with_context(|| format!("failed to write {:?}", file))?
        }
        None => std::io::stdout().lock().write_all(&data)?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if args.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .init();

    let config = load_config(&args)?;
    let options = config.build_options()?;

    match &args.command {
        Command::Pack { manifest, output } => pack(&config, &options, manifest, output),
        Command::List { archive, long } => list(&options, archive, *long),
        Command::Extract {
            archive,
            tag,
            output,
        } => extract(&options, archive, tag, output.as_deref()),
    }
}
