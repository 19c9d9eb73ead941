// src/bin/critiq.rs
use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use critiq_core::config::EngineConfig;
use critiq_core::report::AnalysisReport;
use critiq_core::Engine;

#[derive(Parser)]
#[command(name = "critiq", version, about = "Score the quality of one source file")]
struct Cli {
    /// Source file to analyze (.js, .jsx, .py; anything else degrades)
    file: PathBuf,
    /// Emit the raw JSON report instead of the terminal view
    #[arg(long)]
    json: bool,
    /// Path to a critiq.toml (defaults are used when absent)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("{} {e:#}", "error:".red().bold());
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => load_local_config()?,
    };

    let content = fs::read_to_string(&cli.file)
        .with_context(|| format!("cannot read {}", cli.file.display()))?;
    let filename = cli
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let engine = Engine::new(config);
    let report = engine.analyze(&filename, &content)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&filename, &report);
    }
    Ok(())
}

/// Picks up `critiq.toml` from the working directory when present.
fn load_local_config() -> Result<EngineConfig> {
    let local = PathBuf::from("critiq.toml");
    if local.is_file() {
        EngineConfig::load(&local)
    } else {
        Ok(EngineConfig::default())
    }
}

fn print_report(filename: &str, report: &AnalysisReport) {
    let score = report.overall_score;
    let colored_score = if score >= 80 {
        score.to_string().green().bold()
    } else if score >= 60 {
        score.to_string().yellow().bold()
    } else {
        score.to_string().red().bold()
    };
    println!("{filename}: {colored_score}/100");
    if !report.parse_ok {
        println!("{}", "  (token-only analysis: file did not fully parse)".dimmed());
    }
    println!();

    let b = &report.breakdown;
    let rows = [
        ("naming", b.naming, 10),
        ("modularity", b.modularity, 20),
        ("comments", b.comments, 20),
        ("formatting", b.formatting, 15),
        ("reusability", b.reusability, 15),
        ("best practices", b.best_practices, 20),
    ];
    for (label, points, max) in rows {
        println!("  {label:<15} {points:>3} / {max}");
    }

    if report.recommendations.is_empty() {
        println!("\n{}", "No recommendations. Nice work.".green());
    } else {
        println!("\n{}", "Recommendations:".cyan());
        for (i, rec) in report.recommendations.iter().enumerate() {
            println!("  {}. {rec}", i + 1);
        }
    }
}
