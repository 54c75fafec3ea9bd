use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use covgate::{enforce, parse_lcov, Config, CoveragePolicy, Diagnostic, IgnoreList};

#[derive(Parser)]
#[command(name = "covgate")]
#[command(about = "Fail the build unless every checked file has full line, branch and function coverage")]
#[command(version)]
struct Cli {
    /// Path to config file (default: covgate.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// LCOV report to check (default: lcov.info)
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// JSON array of path substrings to ignore (default: coverage.ignore.json)
    #[arg(short, long)]
    ignore_file: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config =
        Config::resolve(cli.config.as_deref())?.with_overrides(cli.report, cli.ignore_file);

    let ignore = IgnoreList::load(&config.ignore_file)?;
    let ignore_note = if ignore.is_empty() {
        String::new()
    } else {
        format!(" ({} patterns)", ignore.len())
    };
    let policy = CoveragePolicy::new(config.skip_prefixes, ignore);

    let report = parse_lcov(&config.report)
        .with_context(|| format!("Could not load coverage report {}", config.report.display()))?;

    let summary = enforce(&report, &policy, |diagnostic| match diagnostic {
        Diagnostic::Analyzing { .. } => println!("{}", diagnostic),
        Diagnostic::Ignoring { .. } => println!("{}", diagnostic.to_string().dimmed()),
    })?;

    println!(
        "\n{} Full coverage: {} checked, {} ignored{}, {} skipped",
        "✓".green(),
        summary.checked.to_string().green(),
        summary.ignored,
        ignore_note,
        summary.skipped
    );

    Ok(())
}
