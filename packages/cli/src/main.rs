mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{convert, lint, render, ConvertArgs, LintArgs, RenderArgs};

/// Inkstone CLI - structured document tooling
#[derive(Parser, Debug)]
#[command(name = "inkstone")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lint a markup document; exits non-zero when blocking errors exist
    Lint(LintArgs),

    /// Render a markup document to HTML
    Render(RenderArgs),

    /// Convert a document-tree snapshot (JSON) to markup
    Convert(ConvertArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Lint(args) => lint::run(args).await,
        Command::Render(args) => render::run(args).await.map(|_| false),
        Command::Convert(args) => convert::run(args).map(|_| false),
    };

    match outcome {
        Ok(true) => std::process::exit(1),
        Ok(false) => {}
        Err(error) => {
            eprintln!("{} {}", "error:".red().bold(), error);
            std::process::exit(1);
        }
    }
}
