use crate::config::DEFAULT_MODEL;
use clap::Parser;
use std::path::PathBuf;

/// MCP server exposing Azure OpenAI chat completions over stdio
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Model used when a tool call does not specify one
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub default_model: String,

    /// Load environment variables from this file instead of ./.env
    #[arg(long)]
    pub env_file: Option<PathBuf>,
}

impl Args {
    pub fn parse() -> Self {
        <Args as Parser>::parse()
    }
}
