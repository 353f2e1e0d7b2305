//! `datarelay` - hardened data processing and cloud relay service
//!
//! This binary provides a CLI over the core service operations: local
//! user lookups, calls to the external processing API, encrypted cloud
//! uploads, SMTP notifications and authenticated webhook relaying.

use anyhow::{bail, Context, Result};
use clap::Parser;
use console::Style;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use datarelay_core::advisory;
use datarelay_core::config::{Config, ENV_WEBHOOK_SECRET};
use datarelay_core::webhook::sign_body;
use datarelay_core::DataProcessor;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG wins; default keeps the service chatty enough to audit
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => Config::load_or_default(),
    };

    match cli.command.unwrap_or(Commands::Demo) {
        Commands::Demo => run_demo(config).await?,

        Commands::Fetch { id } => {
            let processor = DataProcessor::new(config).await?;
            match processor.fetch_user_data(id).await {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => println!("no user with id {}", id),
            }
        }

        Commands::Upload { file, bucket } => {
            let processor = DataProcessor::new(config).await?;
            if !processor.upload_to_cloud(&file, bucket.as_deref()).await {
                bail!("upload failed; see logs");
            }
            println!("uploaded {}", file.display());
        }

        Commands::Notify {
            recipient,
            subject,
            body,
        } => {
            let processor = DataProcessor::new(config).await?;
            if !processor
                .send_notification_email(&recipient, &subject, &body)
                .await
            {
                bail!("notification failed; see logs");
            }
            println!("notification sent to {}", recipient);
        }

        Commands::Webhook {
            file,
            signature,
            sign,
        } => {
            let body = std::fs::read(&file)
                .with_context(|| format!("Failed to read payload {:?}", file))?;

            let signature = if sign {
                let secret = config.secrets.webhook_secret.clone().with_context(|| {
                    format!("{} must be set to sign locally", ENV_WEBHOOK_SECRET)
                })?;
                Some(sign_body(&secret, &body))
            } else {
                signature
            };

            let processor = DataProcessor::new(config).await?;
            let outcome = processor
                .process_webhook_data(&body, signature.as_deref())
                .await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }

        Commands::Advisory { section } => match section {
            Some(name) => match advisory::section(&name) {
                Some(text) => println!("{}", text),
                None => bail!(
                    "unknown section '{}'; expected one of {}",
                    name,
                    advisory::SECTION_NAMES.join(", ")
                ),
            },
            None => println!("{}", advisory::full_report()),
        },
    }

    Ok(())
}

/// The original demonstration sequence: fetch one user, call the
/// external API once with a literal test value.
async fn run_demo(config: Config) -> Result<()> {
    let cyan = Style::new().cyan();
    println!(
        "{}",
        cyan.apply_to("Starting data processing with security patches...")
    );

    let processor = DataProcessor::new(config).await?;

    match processor.fetch_user_data(1).await {
        Some(record) => println!("user 1: {:?}", record),
        None => println!("user 1: not found"),
    }

    match processor
        .call_external_api(&serde_json::json!({"test": "data"}))
        .await
    {
        Some(response) => println!("api response: {}", response),
        None => println!("api call skipped or failed; see logs"),
    }

    println!("{}", cyan.apply_to("Processing complete (securely)"));
    Ok(())
}
