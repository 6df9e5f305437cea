use clap::{Parser, Subcommand};
use fragment_stars::application::orchestrator::PurchaseOrchestrator;
use fragment_stars::config::AppConfig;
use fragment_stars::domain::ports::{MarketplaceBox, SubmitterHandle};
use fragment_stars::domain::purchase::PurchaseRequest;
use fragment_stars::infrastructure::fragment::FragmentClient;
use fragment_stars::infrastructure::in_memory::RecordingSubmitter;
use fragment_stars::infrastructure::stub_submitter::StubSubmitter;
use fragment_stars::interfaces::report::ReportWriter;
use miette::{IntoDiagnostic, Result};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON configuration file (credentials, wallet descriptor, limits)
    #[arg(long, short)]
    config: PathBuf,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Buy Stars for a marketplace handle
    Buy {
        /// Recipient handle, with or without the leading '@'
        username: String,
        /// Number of Stars to buy
        quantity: u32,
        /// Run the marketplace calls and print the prepared transfer without submitting it
        #[arg(long)]
        dry_run: bool,
    },
    /// Look up a recipient without buying
    Lookup { username: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .into_diagnostic()?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = AppConfig::load(&cli.config).into_diagnostic()?;
    let client = FragmentClient::new(config.marketplace.clone()).into_diagnostic()?;

    let stdout = io::stdout();
    let mut report = ReportWriter::new(stdout.lock());

    match cli.command {
        Command::Buy {
            username,
            quantity,
            dry_run,
        } => {
            let request = PurchaseRequest::new(username, quantity).into_diagnostic()?;
            let marketplace: MarketplaceBox = Box::new(client);

            let result = if dry_run {
                let recorder = RecordingSubmitter::dry_run();
                let submitter: SubmitterHandle = Arc::new(recorder.clone());
                let orchestrator =
                    PurchaseOrchestrator::new(marketplace, submitter).with_limits(config.limits);
                let result = orchestrator.purchase(&request).await;
                let transfer = recorder.submissions().await.into_iter().next();
                report
                    .write_dry_run(&result, transfer.as_ref())
                    .into_diagnostic()?;
                result
            } else {
                // No wallet integration yet: transfers go through the stub.
                let submitter: SubmitterHandle = Arc::new(StubSubmitter::new());
                let orchestrator =
                    PurchaseOrchestrator::new(marketplace, submitter).with_limits(config.limits);
                let result = orchestrator.purchase(&request).await;
                report.write_result(&result).into_diagnostic()?;
                result
            };

            Ok(if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Lookup { username } => {
            let profile = client
                .fetch_recipient_profile(&username)
                .await
                .into_diagnostic()?;
            report.write_profile(profile.as_ref()).into_diagnostic()?;

            Ok(if profile.is_some() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
