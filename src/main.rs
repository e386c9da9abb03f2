//! Marksync - Markdown to editor tree and back.
//!
//! # Usage
//!
//! ```bash
//! marksync load README.md --pretty
//! marksync extract tree.json
//! marksync roundtrip README.md
//! marksync check README.md
//! ```

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use marksync::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    save_config_flags,
};
use marksync::element::Root;
use marksync::transform::{Pipeline, SequentialTokens, is_round_trip_stable};

/// Convert between Markdown and annotated editor element trees
#[derive(Parser, Debug)]
#[command(name = "marksync", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Do not assign data-key identity attributes
    #[arg(long, global = true)]
    no_keys: bool,

    /// Use a counter instead of random tokens in identity keys
    #[arg(long, global = true)]
    sequential_keys: bool,

    /// Attribute marking editor-only elements to drop on extract
    #[arg(long, value_name = "NAME", global = true)]
    artifact_attr: Option<String>,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "PATH", global = true)]
    output: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults
    #[arg(long, global = true)]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the annotated element tree of a Markdown file as JSON
    Load {
        /// Markdown file, or - for stdin
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print Markdown for an element tree in JSON form
    Extract {
        /// Element tree JSON file, or - for stdin
        #[arg(value_name = "TREE_JSON")]
        tree: PathBuf,
    },
    /// Load a Markdown file and extract it again
    Roundtrip {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Fail unless a Markdown file survives a round trip unchanged
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    fn flags(&self) -> ConfigFlags {
        ConfigFlags {
            pretty: self.pretty,
            no_keys: self.no_keys,
            sequential_keys: self.sequential_keys,
            artifact_attr: self.artifact_attr.clone(),
            output: self.output.clone(),
        }
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .context("Failed to write stdout")?;
            if !content.ends_with('\n') {
                writeln!(stdout).context("Failed to write stdout")?;
            }
            Ok(())
        }
    }
}

fn build_pipeline(flags: &ConfigFlags) -> Pipeline {
    let mut pipeline = Pipeline::new().with_keys(!flags.no_keys);
    if flags.sequential_keys {
        pipeline = pipeline.with_token_source(SequentialTokens::new());
    }
    if let Some(attr) = &flags.artifact_attr {
        pipeline = pipeline.with_artifact_marker(attr.as_str());
    }
    pipeline
}

fn run(command: Command, flags: &ConfigFlags) -> Result<()> {
    let mut pipeline = build_pipeline(flags);
    let output = flags.output.as_deref();

    match command {
        Command::Load { file } => {
            let markdown = read_input(&file)?;
            let root = pipeline.load(&markdown);
            let json = root.to_json(flags.pretty).context("Failed to encode tree")?;
            write_output(output, &json)
        }
        Command::Extract { tree } => {
            let json = read_input(&tree)?;
            let mut root = Root::from_json(&json)
                .with_context(|| format!("Failed to decode {}", tree.display()))?;
            let markdown = pipeline.extract(&mut root);
            write_output(output, &markdown)
        }
        Command::Roundtrip { file } => {
            let markdown = read_input(&file)?;
            let mut root = pipeline.load(&markdown);
            let markdown = pipeline.extract(&mut root);
            write_output(output, &markdown)
        }
        Command::Check { file } => {
            let markdown = read_input(&file)?;
            if !is_round_trip_stable(&mut pipeline, &markdown) {
                anyhow::bail!("{}: round trip changes the document", file.display());
            }
            write_output(output, &format!("{}: stable", file.display()))
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.flags();

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
    tracing::debug!(?effective, "effective flags");

    match cli.command {
        Some(command) => run(command, &effective),
        None if cli.save || cli.clear => Ok(()),
        None => anyhow::bail!("No command given (try --help)"),
    }
}
