use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use resty_core::credentials::{self, NoPrompt, TerminalPrompt};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    #[arg(help = "Path to auth.json. Prompted for when omitted.")]
    auth_file: Option<PathBuf>,

    #[arg(long, help = "Fail instead of prompting when no path is given")]
    no_prompt: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let hint = args.auth_file.as_deref();
    let resolved = if args.no_prompt {
        credentials::resolve(hint, &mut NoPrompt).await
    } else {
        credentials::resolve(hint, &mut TerminalPrompt).await
    };
    let credentials = resolved.context("failed to load auth.json")?;

    println!(
        "{}",
        json!({
            "instance_url": credentials.instance_url(),
            "api_version": credentials.api_version(),
        })
    );
    Ok(())
}
