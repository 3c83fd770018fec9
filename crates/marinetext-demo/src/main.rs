use anyhow::Context;
use clap::Parser;
use marinetext_classifiers::{AnalysisOutput, Analyzer};
use marinetext_core::ModelChoice;
use marinetext_demo::cli::{AnalyzeArgs, Cli, Commands, ServeArgs};
use marinetext_demo::config::DemoConfig;
use marinetext_demo::server::run_server;
use marinetext_demo::state::{load_registry, AppState};
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve(args).await?,
        Commands::Analyze(args) => analyze(args).await?,
    }

    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    init_logging(args.verbose);

    let config = DemoConfig::load(&args)?;
    let addr: SocketAddr = format!("{}:{}", config.address, config.port).parse()?;

    println!();
    println!("  ╔═══════════════════════════════════════════════════════════╗");
    println!("  ║                                                           ║");
    println!("  ║        🌊  MARINE TEXT INTELLIGENCE DASHBOARD  🌍         ║");
    println!("  ║                                                           ║");
    println!("  ║     Sentiment · Emotion · Hate Speech · Eco Keywords      ║");
    println!("  ║                                                           ║");
    println!("  ╚═══════════════════════════════════════════════════════════╝");
    println!();
    match &config.models_path {
        Some(path) => println!("  Models:  {}", path.display()),
        None => println!("  Models:  pretrained (Hugging Face Hub)"),
    }
    println!();

    let metrics = init_metrics()?;

    // All three models load before the listener binds
    let registry = load_registry(config.models_path.as_deref())
        .await
        .context("Failed to load models")?;

    println!("  Open http://{} in your browser", addr);
    println!();

    let state = AppState::new(Analyzer::new(Arc::new(registry)), config).with_metrics(metrics);
    run_server(state, addr).await
}

async fn analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    init_logging(args.verbose);

    let choice: ModelChoice = args.model.parse()?;

    let output = match &args.target {
        Some(target) => analyze_remote(target, &args.text, choice).await?,
        None => {
            let registry = load_registry(args.models.as_deref())
                .await
                .context("Failed to load models")?;
            Analyzer::new(Arc::new(registry))
                .analyze(&args.text, choice)
                .await?
        }
    };

    println!("{}", output.summary.replace("  \n", "\n"));
    if !output.keywords.is_empty() {
        println!("Keywords: {}", output.keywords);
    }

    Ok(())
}

async fn analyze_remote(
    target: &str,
    text: &str,
    choice: ModelChoice,
) -> anyhow::Result<AnalysisOutput> {
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/analyze", target.trim_end_matches('/')))
        .json(&serde_json::json!({
            "text": text,
            "model": choice.display_name(),
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Analysis request failed ({}): {}", status, body);
    }

    Ok(response.json().await?)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "marinetext=debug,tower_http=debug"
    } else {
        "marinetext=info,tower_http=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "marinetext_analyses_total",
        "Total number of completed analyses by model"
    );
    metrics::describe_histogram!(
        "marinetext_analysis_latency_us",
        metrics::Unit::Microseconds,
        "Analysis latency in microseconds by model"
    );
    metrics::describe_counter!("marinetext_errors_total", "Total number of errors by kind");

    tracing::info!("Metrics exporter initialized");
    Ok(handle)
}
