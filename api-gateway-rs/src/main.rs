// api-gateway-rs/src/main.rs
// Meeting notes extraction service - HTTP entry point
//
// Cold start:
// - Validate the configuration once; refuse to start when it is invalid
// - Install structured logging from the validated settings
// - Wire the completion client, meeting store and processor into the router

use std::sync::Arc;

use anyhow::Context;
use api_gateway::ApiGateway;
use config_rs::{Config, ValidateOptions};
use error_handling::{init_logging, LoggingConfig};
use llm_service::{InMemoryMeetingStore, MeetingProcessor, OpenAiCompletionClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging is configured from the validated config, so the validator's own
    // output is replayed below instead of being logged before a subscriber exists.
    let loaded = Config::from_env(ValidateOptions {
        throw_on_error: true,
        log_warnings: false,
    });

    let (config, report) = match loaded {
        Ok(loaded) => loaded,
        Err(err) => {
            let _ = init_logging(None);
            tracing::error!(error = %err, "Refusing to start with invalid configuration");
            return Err(err.into());
        }
    };

    init_logging(Some(LoggingConfig {
        level: config.log_level.clone(),
        service_name: "api-gateway".to_string(),
        json_format: config.log_json,
    }))?;

    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }
    tracing::info!(
        environment = %config.environment,
        model = %config.model,
        timeout_secs = config.timeout.as_secs(),
        "Configuration validated"
    );

    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL is set but meetings are kept in memory");
    }

    let client = OpenAiCompletionClient::new(&config)?;
    let processor = MeetingProcessor::new(
        Arc::new(client),
        Arc::new(InMemoryMeetingStore::new()),
        config.timeout,
    );
    let gateway = Arc::new(ApiGateway::new(&config, processor)?);
    let app = gateway.create_router();

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("API Gateway listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
}
