//! Command-line front end for the log viewer core: list, render, and search
//! a sandboxed log tree from a shell instead of a web host.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use logview_core::{
    EntryKind, Sandbox, Searcher, ViewerConfig, list_dir, read_lines_lossy, render_line,
};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "logview", version, about = "Classify, render, and search IRC log trees")]
struct Cli {
    /// Root of the log tree; nothing outside it is ever read
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Emit JSON rows instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List a directory inside the log tree
    Ls {
        /// Directory, relative to the root
        #[arg(default_value = "")]
        path: String,
    },
    /// Render a log file as classified HTML fragments
    Render {
        /// File, relative to the root
        path: String,
    },
    /// Search a subtree with a regex and surrounding context
    Search {
        /// Search pattern; must not match the empty string
        pattern: String,

        /// Directory to search, relative to the root
        #[arg(default_value = "")]
        path: String,

        /// Context lines kept around each match
        #[arg(long, default_value_t = 3)]
        context: usize,

        /// Stop after this many match blocks
        #[arg(long, default_value_t = 30)]
        max_results: usize,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let sandbox = Sandbox::new(&cli.root)
        .with_context(|| format!("open log root {}", cli.root.display()))?;

    match cli.command {
        Command::Ls { path } => ls(&sandbox, &path, cli.json),
        Command::Render { path } => {
            render(&sandbox, &path, &ViewerConfig::default(), cli.json)
        }
        Command::Search {
            pattern,
            path,
            context,
            max_results,
        } => {
            let config = ViewerConfig {
                context_lines: context,
                max_results,
                ..ViewerConfig::default()
            };
            search(&sandbox, &path, &pattern, &config, cli.json)
        }
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn ls(sandbox: &Sandbox, path: &str, json: bool) -> Result<()> {
    for entry in list_dir(sandbox, path)? {
        if json {
            println!("{}", serde_json::to_string(&entry)?);
        } else {
            println!("{:<4} {:>8}  {}", entry.kind.as_str(), entry.size, entry.name);
        }
    }
    Ok(())
}

fn render(sandbox: &Sandbox, path: &str, config: &ViewerConfig, json: bool) -> Result<()> {
    let file = sandbox.resolve(path, EntryKind::File)?;
    let reader = BufReader::new(File::open(&file.absolute)?);
    for (index, line) in read_lines_lossy(reader).enumerate() {
        let line = line?;
        let rendered = render_line(&line, &[], index + 1, false, config);
        if json {
            println!("{}", serde_json::to_string(&rendered)?);
        } else {
            println!(
                "{:>6}  {}{}{}",
                rendered.number, rendered.timestamp, rendered.nickname, rendered.message
            );
        }
    }
    Ok(())
}

fn search(
    sandbox: &Sandbox,
    path: &str,
    pattern: &str,
    config: &ViewerConfig,
    json: bool,
) -> Result<()> {
    let searcher = match Searcher::new(sandbox, path, pattern, config) {
        Ok(searcher) => searcher,
        // a bad pattern yields a message and zero results, not a failed run
        Err(err @ logview_core::ViewerError::InvalidPattern { .. }) => {
            eprintln!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    for hit in searcher.take(config.max_results) {
        let hit = hit?;
        if json {
            println!("{}", serde_json::to_string(&hit)?);
            continue;
        }
        println!("{}#L{}", hit.file.display(), hit.first_line);
        for line in &hit.lines {
            let marker = if line.highlighted { '>' } else { ' ' };
            println!(
                "{marker}{:>5}  {}{}{}",
                line.number, line.timestamp, line.nickname, line.message
            );
        }
        println!();
    }
    Ok(())
}
