use anyhow::Context;
use std::sync::Arc;
use tripflow::{
    agents::TravelAgents,
    api::routes,
    cli::{output::Output, Cli, Commands, PlanArgs},
    llm::Provider,
    utils::toml_config::{LogFormat, TripflowConfig, TripflowConfigManager},
    AppState,
};

/// Subscriber id used for the CLI's own progress output
const CLI_SUBSCRIBER: &str = "cli";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        None => serve(&cli, &output, None, None, false).await,
        Some(Commands::Serve {
            ref host,
            port,
            no_watch,
        }) => serve(&cli, &output, host.clone(), port, no_watch).await,
        Some(Commands::Plan(ref args)) => plan(&cli, &output, args).await,
        Some(Commands::Config { full, validate }) => show_config(&cli, &output, full, validate),
    }
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
}

/// Load the config file, or fall back to built-in defaults when it is absent.
fn load_config(cli: &Cli, output: &Output) -> anyhow::Result<Arc<TripflowConfigManager>> {
    if !cli.config.exists() {
        output.warning(&format!(
            "{} not found, using built-in defaults",
            cli.config.display()
        ));
        return Ok(Arc::new(TripflowConfigManager::from_config(
            TripflowConfig::default(),
        )));
    }

    let manager = TripflowConfigManager::new(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    Ok(Arc::new(manager))
}

fn build_state(config_manager: Arc<TripflowConfigManager>) -> anyhow::Result<AppState> {
    let config = config_manager.config();
    let provider = Provider::from_config(&config.provider)?;
    let llm = provider.create_client()?;
    tracing::info!(provider = provider.name(), model = provider.model(), "LLM provider ready");

    Ok(AppState::new(config_manager, TravelAgents::with_llm(Arc::from(llm))))
}

async fn serve(
    cli: &Cli,
    output: &Output,
    host: Option<String>,
    port: Option<u16>,
    no_watch: bool,
) -> anyhow::Result<()> {
    output.banner();
    let config_manager = load_config(cli, output)?;
    let config = config_manager.config();

    let level = if cli.verbose { "debug" } else { config.server.log_level.as_str() };
    init_tracing(level, config.server.log_format);

    if !no_watch && cli.config.exists() {
        if let Err(e) = config_manager.start_watching() {
            tracing::warn!(error = %e, "configuration hot reload disabled");
        }
    }

    let state = build_state(Arc::clone(&config_manager))?;
    let app = routes::app(state);

    let address = format!(
        "{}:{}",
        host.unwrap_or_else(|| config.server.host.clone()),
        port.unwrap_or(config.server.port)
    );
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;

    output.success(&format!("Listening on http://{}", address));
    output.kv("Plan", &format!("POST http://{}/api/plan", address));
    output.kv("Status", &format!("ws://{}/ws/{{client_id}}", address));
    output.hint("Open the status socket before posting a plan; events are not replayed.");
    tracing::info!(%address, "server started");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn plan(cli: &Cli, output: &Output, args: &PlanArgs) -> anyhow::Result<()> {
    let config_manager = load_config(cli, output)?;
    init_tracing(if cli.verbose { "debug" } else { "warn" }, LogFormat::Pretty);

    let state = build_state(config_manager)?;
    let mut subscription = state.planner.subscribe(CLI_SUBSCRIBER);

    let handle = state
        .planner
        .start_run(args.to_request(), Some(CLI_SUBSCRIBER.to_string()))?;
    if !args.json {
        output.info(&format!("Run {}", handle.run_id()));
    }

    let result = handle.await_result();
    tokio::pin!(result);

    let plan = loop {
        tokio::select! {
            Some(event) = subscription.recv() => {
                if !args.json {
                    output.status(&event);
                }
            }
            plan = &mut result => break plan?,
        }
    };
    while let Some(event) = subscription.try_recv() {
        if !args.json {
            output.status(&event);
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        output.plan_summary(&plan);
        output.newline();
    }
    Ok(())
}

fn show_config(cli: &Cli, output: &Output, full: bool, validate: bool) -> anyhow::Result<()> {
    if validate {
        return match TripflowConfig::load(&cli.config) {
            Ok(_) => {
                output.success(&format!("{} is valid", cli.config.display()));
                Ok(())
            }
            Err(e) => {
                output.error(&e.to_string());
                Err(e.into())
            }
        };
    }

    let config_manager = load_config(cli, output)?;
    let config = config_manager.config();

    if full {
        println!("{}", toml::to_string_pretty(config.as_ref())?);
        return Ok(());
    }

    output.header("Configuration");
    output.kv("File", &cli.config.display().to_string());
    output.kv("Address", &config.bind_address());
    output.kv("Model", config.provider.model());
    output.kv("Log level", &config.server.log_level);
    output.kv("Default nights", &config.aggregation.default_nights.to_string());
    if !config.status.phrases.is_empty() {
        output.subheader("Status phrase overrides");
        for (key, phrase) in &config.status.phrases {
            output.list_item(&format!("{} -> {}", key, phrase));
        }
    }
    Ok(())
}
