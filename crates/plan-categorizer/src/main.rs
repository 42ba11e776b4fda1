//! Plan categorizer CLI binary.

use anyhow::Result;
use plan_categorizer::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the plan-categorizer CLI.
///
/// A run is a single sequential batch, so the current_thread runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays parseable with --json.
    // Example: RUST_LOG=plan_categorizer=debug plan-categorizer categorize
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("plan_categorizer=info,plan_jsonl=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting plan-categorizer");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("plan-categorizer completed successfully");
    Ok(())
}
