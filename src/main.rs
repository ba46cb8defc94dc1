use anyhow::Context;
use clap::Parser;
use retail_ingestor::utils::{logger, validation::Validate};
use retail_ingestor::{CliArgs, EtlError, IngestEngine, IngestPipeline, RunReport, StorageBackend};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting retail-ingestor");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    match run(&args).await {
        Ok(report) => {
            println!("✅ Uploaded {} records to {}", report.records, report.remote);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("❌ {:#}", err);
            match err.downcast_ref::<EtlError>() {
                Some(etl_error) => {
                    eprintln!("💡 {}", etl_error.recovery_suggestion());
                    ExitCode::from(etl_error.exit_code())
                }
                None => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(args: &CliArgs) -> anyhow::Result<RunReport> {
    let config = args.load_config().context("loading configuration")?;
    config.validate().context("validating configuration")?;
    tracing::debug!("Effective config: {:?}", config);

    let storage = StorageBackend::from_config(&config.upload)
        .await
        .context("initializing object storage")?;
    let client = reqwest::Client::builder()
        .user_agent(concat!("retail-ingestor/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")?;
    let pipeline = IngestPipeline::with_client(storage, config, client);
    let engine = IngestEngine::new(pipeline);

    let report = engine.run().await?;
    Ok(report)
}
