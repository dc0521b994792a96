mod output;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use usage_grammar_core::{ApplyConfig, Outcome, apply, leaf_nodes};

use crate::output::{OutputFormat, format_bindings, format_nodes};

#[derive(Debug, Parser)]
#[command(name = "usage-grammar")]
#[command(about = "Match argument vectors against docopt-style usage documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Match arguments given after `--` against a usage document.
    Match(MatchArgs),
    /// List the leaves a usage document defines.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
struct DocArgs {
    /// Path to the usage document, or `-` for stdin.
    #[arg(long)]
    doc: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct MatchArgs {
    #[command(flatten)]
    doc: DocArgs,
    /// Bind -h/--help like any other option instead of printing the document.
    #[arg(long)]
    no_help: bool,
    /// Version text printed when the arguments contain --version.
    #[arg(long)]
    version_text: Option<String>,
    /// Treat everything after the first positional argument as positional.
    #[arg(long)]
    options_first: bool,
    /// Arguments to match.
    #[arg(last = true)]
    argv: Vec<String>,
}

#[derive(Debug, Args)]
struct InspectArgs {
    #[command(flatten)]
    doc: DocArgs,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Match(args) => run_match(args),
        Command::Inspect(args) => run_inspect(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_match(args: MatchArgs) -> Result<(), String> {
    let doc = read_doc(&args.doc.doc)?;
    let mut config = ApplyConfig::default()
        .with_help(!args.no_help)
        .with_options_first(args.options_first);
    if let Some(version) = args.version_text {
        config = config.with_version(version);
    }
    debug!(argc = args.argv.len(), ?config, "Matching arguments");

    match apply(&doc, &args.argv, &config) {
        Outcome::Matched(bindings) => {
            let raw = format_bindings(&bindings, args.doc.format)?;
            print!("{}", with_newline(raw));
            Ok(())
        }
        Outcome::Help(text) | Outcome::Version(text) => {
            println!("{}", text.trim_end());
            Ok(())
        }
        Outcome::Failed(err) => Err(err.to_string()),
    }
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let doc = read_doc(&args.doc.doc)?;
    let nodes = leaf_nodes(&doc).map_err(|err| err.to_string())?;
    let raw = format_nodes(&nodes, args.doc.format)?;
    print!("{}", with_newline(raw));
    Ok(())
}

fn read_doc(path: &Path) -> Result<String, String> {
    if path.as_os_str() == "-" {
        let mut doc = String::new();
        std::io::stdin()
            .read_to_string(&mut doc)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        return Ok(doc);
    }
    fs::read_to_string(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))
}

fn with_newline(mut raw: String) -> String {
    if !raw.ends_with('\n') {
        raw.push('\n');
    }
    raw
}
