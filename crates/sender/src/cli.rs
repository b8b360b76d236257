//! Command line arguments

use clap::{Args, Parser};
use common::{SecretSource, DEFAULT_WEBHOOK_URL};
use reqwest::Url;
use std::path::PathBuf;

/// Sign stored GitHub webhook payloads and POST them to a local receiver
#[derive(Parser)]
#[command(name = "webhook-sender", version)]
pub struct Cli {
    #[command(flatten)]
    pub secret: SecretArgs,

    /// URL address to send webhooks to
    #[arg(long, value_name = "url", env = "WEBHOOK_URL", default_value = DEFAULT_WEBHOOK_URL)]
    pub url: Url,

    /// Print the signed requests instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Payload files to send, in order. The event type is the file name up to the first `-`
    #[arg(value_name = "payload-file", required = true)]
    pub payload_files: Vec<PathBuf>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct SecretArgs {
    /// GitHub secret used to sign the payload data
    #[arg(long, value_name = "secret")]
    pub github_secret: Option<String>,

    /// Config file (YAML) to read `github_secret` from
    #[arg(long, value_name = "file")]
    pub config: Option<PathBuf>,
}

impl SecretArgs {
    pub fn source(&self) -> Option<SecretSource> {
        self.github_secret
            .clone()
            .map(SecretSource::Inline)
            .or_else(|| self.config.clone().map(SecretSource::ConfigFile))
    }
}
