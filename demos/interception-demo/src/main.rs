use mvc_core::LoggingConfig;
use mvc_web::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dir = mvc_interception_demo::config_dir();
    let env = mvc_interception_demo::load_environment(&dir)?;

    LoggingConfig::from_environment(&env).init()?;
    tracing::info!(config_dir = %dir.display(), "Configuration loaded");

    let templates = TemplateEngine::new(&mvc_interception_demo::template_properties(&env, &dir))?;
    let mappings = mvc_interception_demo::request_mappings(templates)?;
    for route in mappings.routes() {
        tracing::info!("Mapped {}", route);
    }

    WebServer::new(ServerProperties::from_environment(&env), mappings.into_router())
        .run()
        .await
}
