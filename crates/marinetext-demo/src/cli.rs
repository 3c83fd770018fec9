use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "marinetext")]
#[command(
    author,
    version,
    about = "Marine Text Intelligence Dashboard: text classification with environmental keyword extraction"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the dashboard server with web UI
    Serve(ServeArgs),

    /// Analyze a single text and print the result
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Listen address
    #[arg(short, long)]
    pub address: Option<String>,

    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Server config file (YAML)
    #[arg(short, long, env = "MARINETEXT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Models file; the pretrained Hugging Face models are used when omitted
    #[arg(short, long, env = "MARINETEXT_MODELS")]
    pub models: Option<PathBuf>,

    /// Accept cross-origin requests from any origin
    #[arg(long, env = "MARINETEXT_ALLOW_ANY_ORIGIN")]
    pub allow_any_origin: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Text to analyze
    pub text: String,

    /// Model to use, by display name or key (sentiment, emotion, hate_speech)
    #[arg(short = 'M', long, default_value = "Sentiment Analysis")]
    pub model: String,

    /// Send the text to a running dashboard instead of loading models locally
    #[arg(short, long)]
    pub target: Option<String>,

    /// Models file for local analysis
    #[arg(short, long, env = "MARINETEXT_MODELS")]
    pub models: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
