use dotenvy::dotenv;
use relay_core::observability::{init_tracing, TracingOptions};
use relay_frontend::config::get_configuration;
use relay_frontend::startup::Application;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {:#}", e);
        anyhow::anyhow!("Configuration error: {:#}", e)
    })?;

    let _tracing_guard = init_tracing(
        "relay-frontend",
        TracingOptions {
            log_level: &configuration.logging.level,
            log_file: configuration.logging.file.as_deref(),
            otlp_endpoint: configuration.logging.otlp_endpoint.as_deref(),
        },
    )?;

    let application = Application::build(configuration).await?;
    info!("Starting relay-frontend on port {}", application.port());

    application.run_until_stopped().await
}
