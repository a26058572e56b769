mod output;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use wfgen_core::pipeline::{self, RunOptions};
use wfgen_core::{workspace, WfgenError};

#[derive(Parser)]
#[command(
    name = "wfgen",
    about = "Generate one CI workflow per package in a monorepo workspace, \
             and keep the output directory exactly in sync",
    version
)]
struct Cli {
    /// Workspace root (default: walk upward from the current directory)
    #[arg(long, env = "WFGEN_ROOT")]
    root: Option<PathBuf>,

    /// Abort the whole run on the first per-package error
    #[arg(long)]
    strict: bool,

    /// Report what would change without writing or deleting anything;
    /// exits non-zero if the output directory is out of date
    #[arg(long)]
    check: bool,

    /// Output the run summary as JSON
    #[arg(long, short = 'j')]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let root = match &cli.root {
        Some(p) => {
            if !workspace::is_workspace_root(p) {
                return Err(WfgenError::NotAWorkspaceRoot(p.clone()).into());
            }
            p.clone()
        }
        None => {
            let cwd = std::env::current_dir().context("cannot determine current directory")?;
            workspace::find_workspace_root(&cwd)?
        }
    };

    let options = RunOptions {
        strict: cli.strict,
        check: cli.check,
    };
    let summary = pipeline::run(&root, &options)?;

    if cli.json {
        output::print_json(&summary)?;
    } else {
        output::print_summary(&summary, cli.check);
    }

    let out_of_date = cli.check && summary.sync.changes() > 0;
    Ok(if summary.success() && !out_of_date { 0 } else { 1 })
}
