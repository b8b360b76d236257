//! Webhook sender: replay stored GitHub webhook payloads against a receiver

use anyhow::Context;
use clap::Parser;
use github::WebhookClient;
use tracing::info;

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("webhook_sender=info".parse()?)
                .add_directive("github=info".parse()?)
                .add_directive("common=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let secret = cli
        .secret
        .source()
        .context("either --github-secret or --config is required")?
        .resolve()?;

    let client = WebhookClient::new(cli.url).dry_run(cli.dry_run);
    info!(
        "📨 Replaying {} payload(s) to {}",
        cli.payload_files.len(),
        client.url()
    );

    let summary = github::replay(&client, &secret, &cli.payload_files).await?;

    info!(
        "Done: {} sent, {} unreachable, {} skipped",
        summary.sent + summary.printed,
        summary.unreachable,
        summary.skipped
    );

    Ok(())
}
