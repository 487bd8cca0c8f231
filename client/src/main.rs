use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use client::summary::{error_summary, prediction_summary};
use client::{ClientConfig, HttpClassifier, ImageFile, Mode, SimulatedClassifier, Workflow, WorkflowState};

/// Classify a skin image and print the diagnosis.
#[derive(Parser, Debug)]
#[command(name = "skinscan", version)]
struct Cli {
    /// Image file to classify
    image: PathBuf,

    /// Use the simulated classifier instead of the live backend
    #[arg(long)]
    simulate: bool,

    /// Classifier endpoint (overrides config and SKINSCAN_ENDPOINT)
    #[arg(long)]
    endpoint: Option<String>,

    /// YAML config file
    #[arg(long, env = "SKINSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Print the resolved prediction as JSON
    #[arg(long)]
    json: bool,

    /// Retry in simulated mode when the live backend cannot be reached
    #[arg(long)]
    fallback_to_simulated: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let cli = Cli::parse();

    let mut config = match ClientConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    config.simulate |= cli.simulate;

    let live = match HttpClassifier::new(&config) {
        Ok(classifier) => Arc::new(classifier),
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let simulated = Arc::new(SimulatedClassifier::new(config.simulated_latency()));
    let mode = if config.simulate { Mode::Simulated } else { Mode::Live };
    log::info!("Classifier: {} ({} mode)", live.endpoint(), mode);

    let file = match ImageFile::open(&cli.image).await {
        Ok(file) => file,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut workflow = Workflow::new(live, simulated, mode);
    workflow.select_image(Some(file));
    workflow.submit();
    workflow.settle().await;

    let retry_simulated = workflow
        .state()
        .error()
        .is_some_and(|error| error.suggest_simulated && cli.fallback_to_simulated);
    if retry_simulated {
        log::warn!("Live classifier unavailable, retrying in simulated mode");
        workflow.toggle_mode(Mode::Simulated);
        workflow.submit();
        workflow.settle().await;
    }

    match workflow.state() {
        WorkflowState::Succeeded { image, prediction } => {
            if cli.json {
                match serde_json::to_string_pretty(prediction.as_ref()) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        log::error!("Failed to serialize prediction: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print!("{}", prediction_summary(image, prediction));
            }
            ExitCode::SUCCESS
        }
        WorkflowState::Failed { error, .. } => {
            eprint!("{}", error_summary(error));
            ExitCode::FAILURE
        }
        other => {
            log::error!("Workflow ended in unexpected {} state", other.name());
            ExitCode::FAILURE
        }
    }
}
