//! Revive web host - serves the restoration page and its JSON API

mod routes;

use std::sync::Arc;

use revive_core::config::Config;
use revive_core::image::GeminiClient;
use revive_core::restoration::{ControllerOptions, NoCredentialDialog, RestorationController};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("revive=info".parse()?),
        )
        .init();

    let config = Config::load()?;
    let addr = config.server.socket_addr()?;

    let client = GeminiClient::from_config(&config.restoration)?;
    let api_key = config.restoration.resolved_api_key()?;
    if api_key.is_none() {
        warn!("No API key in environment; restorations will ask for GEMINI_API_KEY");
    }

    let controller = RestorationController::new(
        client,
        NoCredentialDialog,
        ControllerOptions::from_config(&config),
    )
    .with_credential(api_key);

    let state = AppState {
        controller: Arc::new(Mutex::new(controller)),
        max_upload_bytes: config.server.max_upload_bytes,
    };

    info!(%addr, model = %config.restoration.model, "Serving Revive");
    warp::serve(routes::routes(state)).run(addr).await;

    Ok(())
}
