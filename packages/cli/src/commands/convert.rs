use anyhow::Result;
use clap::Args;
use colored::Colorize;
use inkstone_model::{document_from_json, BlockIdGenerator};
use inkstone_serializer::serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input document-tree snapshot (JSON)
    pub input: PathBuf,

    /// Output markup file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Assign missing block ids, seeded from this document name
    #[arg(long)]
    pub seed: Option<String>,
}

pub fn run(args: ConvertArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.input)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;

    let mut document = document_from_json(&value);
    if let Some(name) = &args.seed {
        BlockIdGenerator::new(name).assign_ids(&mut document);
    }

    let markup = serialize(&document);
    match &args.output {
        Some(path) => {
            fs::write(path, markup)?;
            println!(
                "✨ {} wrote {}",
                "Converted:".green().bold(),
                path.display()
            );
        }
        None => print!("{}", markup),
    }

    Ok(())
}
