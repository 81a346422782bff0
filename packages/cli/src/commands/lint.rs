use anyhow::Result;
use clap::Args;
use colored::Colorize;
use inkstone_channel::{ChannelConfig, ConversionChannel, WriteOrigin};
use inkstone_compiler::{Diagnostic, Severity};
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct LintArgs {
    /// Input markup file to lint
    pub input: PathBuf,

    /// Show all diagnostics including info level
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// Returns true when blocking errors were found (export must be gated).
pub async fn run(args: LintArgs) -> Result<bool> {
    let content = fs::read_to_string(&args.input)?;

    let channel = ConversionChannel::open(ChannelConfig::default());
    channel.wait_ready().await;
    let report = channel.lint(&content, WriteOrigin::Text).await?;
    channel.close();

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report.has_errors());
    }

    println!("🔍 {} {}", "Linting".green().bold(), args.input.display());
    println!();

    let mut errors = 0;
    let mut warnings = 0;
    for diagnostic in &report.diagnostics {
        match diagnostic.severity {
            Severity::Error => errors += 1,
            Severity::Warning => warnings += 1,
            Severity::Info if !args.verbose => continue,
            Severity::Info => {}
        }
        print_diagnostic(diagnostic);
    }

    println!();
    if errors > 0 {
        println!(
            "✨ {} {} blocking {}",
            "Done:".red().bold(),
            errors,
            if errors == 1 { "error" } else { "errors" }
        );
    } else {
        println!("✨ {} no blocking errors", "Done:".green().bold());
    }
    if warnings > 0 {
        println!("   {} {}", "Warnings:".yellow(), warnings);
    }
    if args.verbose && !report.outline.is_empty() {
        println!();
        println!("   Outline:");
        for item in &report.outline {
            println!(
                "   {}{} (line {})",
                "  ".repeat(item.level.saturating_sub(1) as usize),
                item.title,
                item.line.unwrap_or(0)
            );
        }
    }

    Ok(errors > 0)
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let label = match diagnostic.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Info => "info".blue().bold(),
    };
    println!(
        "   {}:{} {} [{}]",
        diagnostic.line, label, diagnostic.message, diagnostic.source
    );
}
