use anyhow::{Context, Result};
use todo_service::prelude::{init_tracing, shutdown_tracing, AppState, Config, Server};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config)?;

    let state = AppState::connect(config.clone())
        .await
        .with_context(|| format!("failed to open {} storage", config.storage.backend))?;

    let result = Server::new(config)
        .serve(state)
        .await
        .context("server terminated with an error");

    shutdown_tracing();
    result
}
