//! CLI entrypoint for nutri-quorum
//!
//! This is the composition root: it loads configuration, builds the
//! gateway and loggers, and hands them to the use case.

mod commands;
mod output;
mod progress;

use anyhow::{Context, Result, anyhow, bail};
use clap::{CommandFactory, Parser};
use commands::{Cli, Command, OutputFormat};
use nutri_application::{ProcessTaskInput, ProcessTaskUseCase};
use nutri_domain::{AgentResponse, ConsensusLevel, ConsensusResult, Model, TaskType};
use nutri_infrastructure::{
    ConfigLoader, FileConfig, GatewayConfig, JsonlConsensusLogger, OpenAiCompatibleGateway,
};
use output::ConsoleFormatter;
use progress::ConsoleProgress;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        return show_config(&cli);
    }

    let config = load_config(&cli)?;

    // The guard flushes the file sink on drop; keep it for the whole run
    let log_dir = cli.log_dir.clone().or_else(|| config.logging.log_dir_path());
    let _log_guard = init_tracing(cli.verbose, log_dir.as_deref())?;

    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Command::Run {
            task,
            input,
            model,
            solo,
            min_agreement,
        } => {
            let task = parse_task(task)?;
            let input = read_json(input.as_deref())?;

            let mut request = ProcessTaskInput::new(task, input);
            if !model.is_empty() {
                let models = model.iter().map(|m| Model::from(m.as_str())).collect();
                request = request.with_models(models);
            }
            if *solo {
                request = request.with_level(ConsensusLevel::Solo);
            }
            if let Some(n) = min_agreement {
                request = request.with_min_agreement(*n);
            }

            run(&cli, &config, request).await
        }
        Command::Validate {
            task,
            responses,
            min_agreement,
        } => validate(&cli, &config, task, responses.as_deref(), *min_agreement),
        Command::Fallback { task, input } => {
            let task = parse_task(task)?;
            let input = read_json(input.as_deref())?;
            fallback(&cli, &config, task, input)
        }
    }
}

fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "nutri-quorum.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry().with(filter).with(console).init();
            Ok(None)
        }
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    println!("Configuration sources (highest priority first):");
    for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
        println!("  {}", line);
    }
    println!();

    let config = load_config(cli)?;
    println!("Consensus level: {}", config.consensus.level.description());
    println!();

    let rendered = toml::to_string_pretty(&config).context("cannot render configuration")?;
    println!("Effective configuration:\n");
    println!("{}", rendered);
    Ok(())
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("failed to load configuration: {}", e))?
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn build_use_case(
    cli: &Cli,
    config: &FileConfig,
) -> Result<ProcessTaskUseCase<OpenAiCompatibleGateway>> {
    let gateway = OpenAiCompatibleGateway::new(GatewayConfig::from(&config.provider))
        .context("cannot create inference gateway")?;
    if gateway.config().api_key.is_none() {
        warn!(
            "No API key found (set {} or provider.api_key)",
            config.provider.api_key_env
        );
    }

    let agents = config.agent_configs().context("invalid agent configuration")?;
    let mut use_case =
        ProcessTaskUseCase::new(Arc::new(gateway), config.consensus_settings(), agents);

    if let Some(path) = config.logging.consensus_log_path()
        && let Some(logger) = JsonlConsensusLogger::try_open(&path)
    {
        info!("Recording consensus events to {}", path.display());
        use_case = use_case.with_logger(Arc::new(logger));
    }

    if !cli.quiet && cli.output != OutputFormat::Json {
        use_case = use_case.with_progress(Arc::new(ConsoleProgress));
    }

    Ok(use_case)
}

async fn run(cli: &Cli, config: &FileConfig, request: ProcessTaskInput) -> Result<()> {
    let use_case = build_use_case(cli, config)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, cancelling");
            on_signal.cancel();
        }
    });

    let task = request.task;
    let outcome = use_case
        .execute_with_cancellation(request, &cancel)
        .await
        .with_context(|| format!("{} failed", task))?;

    let text = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format_outcome(&outcome),
        OutputFormat::Result => ConsoleFormatter::format_result_only(&outcome.consensus),
        OutputFormat::Json => ConsoleFormatter::format_json(&outcome),
    };
    println!("{}", text);
    Ok(())
}

fn validate(
    cli: &Cli,
    config: &FileConfig,
    task: &str,
    responses: Option<&Path>,
    min_agreement: Option<usize>,
) -> Result<()> {
    let raw = read_input(responses)?;
    let responses: Vec<AgentResponse> =
        serde_json::from_str(&raw).context("expected a JSON array of agent responses")?;

    let settings = config.consensus_settings();
    let min_agreement = min_agreement.unwrap_or(settings.min_agreement);
    if min_agreement == 0 {
        bail!("--min-agreement must be at least 1");
    }

    let consensus = settings
        .validator()
        .validate_tag(&responses, task, min_agreement);
    println!("{}", render_consensus(cli.output, &consensus));
    Ok(())
}

fn fallback(cli: &Cli, config: &FileConfig, task: TaskType, input: Value) -> Result<()> {
    let use_case = build_use_case(cli, config)?;
    let response = use_case
        .deterministic(task, input)
        .with_context(|| format!("no rule-based result for {}", task))?;

    let text = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format_response(&response),
        OutputFormat::Result => ConsoleFormatter::format_json(response.result()),
        OutputFormat::Json => ConsoleFormatter::format_json(&response),
    };
    println!("{}", text);
    Ok(())
}

fn render_consensus(format: OutputFormat, consensus: &ConsensusResult) -> String {
    match format {
        OutputFormat::Full => ConsoleFormatter::format_consensus(consensus),
        OutputFormat::Result => ConsoleFormatter::format_result_only(consensus),
        OutputFormat::Json => ConsoleFormatter::format_json(consensus),
    }
}

fn parse_task(tag: &str) -> Result<TaskType> {
    tag.parse::<TaskType>().map_err(|e| {
        let known: Vec<&str> = TaskType::ALL.iter().map(|t| t.as_str()).collect();
        anyhow!("{} (known tasks: {})", e, known.join(", "))
    })
}

/// Read a file, or stdin when the path is absent or "-"
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("cannot read stdin")?;
            Ok(buffer)
        }
    }
}

fn read_json(path: Option<&Path>) -> Result<Value> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).context("input is not valid JSON")
}
