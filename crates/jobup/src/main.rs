use anyhow::Context;
use clap::Parser;
use jobup_engine::config::{ConfigLoader, RunConfig};
use jobup_engine::document::{DocumentProducer, PassthroughProducer};
use jobup_engine::notify::{Notifier, NullNotifier};
use jobup_engine::orchestrator;
use jobup_wd::WebDriverBackend;
use std::path::PathBuf;
use tracing::info;

mod notify;
mod resume;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Keeps a job-portal profile fresh: re-saves the skill list, re-uploads the resume and verifies the portal reflects today's date."
)]
struct Args {
    /// Config file (defaults to ./jobup.yaml, then ~/.jobup/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// URL of the WebDriver server (chromedriver)
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Launch the browser in visible mode (not headless)
    #[arg(long)]
    visible: bool,

    /// Upload the resume as-is, without the freshness mutation
    #[arg(long)]
    no_mutate: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from(path)
            .await
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ConfigLoader::load_default().await.context("loading config")?,
    };
    config.apply_env();
    if let Some(url) = args.webdriver_url {
        config.webdriver_url = url;
    }
    if args.visible {
        config.headless = false;
    }
    if args.no_mutate {
        config.resume.mutate = false;
    }
    config.validate()?;

    let report = execute(config).await;

    for result in &report.results {
        info!(
            "{}: {}",
            result.step,
            if result.succeeded { "ok" } else { "failed" }
        );
    }
    if report.fatal() {
        anyhow::bail!("run aborted: session could not be established or login failed");
    }
    Ok(())
}

async fn execute(config: RunConfig) -> orchestrator::RunReport {
    let driver = Box::new(WebDriverBackend::new(
        config.webdriver_url.clone(),
        config.headless,
    ));

    let producer: Box<dyn DocumentProducer> = if config.resume.mutate {
        Box::new(resume::PdfRefresher::new(config.resume.output.clone()))
    } else {
        Box::new(PassthroughProducer)
    };

    let notifier: Box<dyn Notifier> = match &config.webhook_url {
        Some(url) => match notify::WebhookNotifier::new(url.clone()) {
            Ok(n) => Box::new(n),
            Err(e) => {
                tracing::warn!("webhook notifier unavailable ({e}); run log stays local");
                Box::new(NullNotifier)
            }
        },
        None => Box::new(NullNotifier),
    };

    orchestrator::run(driver, config, producer.as_ref(), notifier.as_ref()).await
}
