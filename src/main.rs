use dotenv::dotenv;
use tracing::{error, info};

use manualqa::config::AppConfig;
use manualqa::infrastructure::AppContainer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env().inspect_err(|e| error!(error = %e, "invalid configuration"))?;
    if config.model.api_key.is_none() {
        info!("OPENAI_API_KEY is not set; requests are sent without authentication");
    }

    let container = AppContainer::new(config)?;
    info!(
        document = %container.config.document_path.display(),
        index_location = %container.config.index_location.display(),
        index_present = container.orchestrator.index_exists().await,
        port = container.config.port,
        "starting manualqa"
    );

    container.http_server().run().await
}
