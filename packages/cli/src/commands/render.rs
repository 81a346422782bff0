use anyhow::Result;
use clap::Args;
use colored::Colorize;
use inkstone_channel::{ChannelConfig, ConversionChannel};
use inkstone_compiler::RenderOptions;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Input markup file
    pub input: PathBuf,

    /// Output HTML file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip data-line / data-block-index positional metadata
    #[arg(long)]
    pub no_positions: bool,
}

pub async fn run(args: RenderArgs) -> Result<()> {
    let content = fs::read_to_string(&args.input)?;

    let channel = ConversionChannel::open(ChannelConfig::default());
    channel.wait_ready().await;
    let html = channel
        .render(
            &content,
            Some(RenderOptions {
                annotate: !args.no_positions,
            }),
        )
        .await?;
    channel.close();

    match &args.output {
        Some(path) => {
            fs::write(path, html)?;
            println!(
                "✨ {} wrote {}",
                "Rendered:".green().bold(),
                path.display()
            );
        }
        None => print!("{}", html),
    }

    Ok(())
}
