use avatar_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    // Storage, services and routes
    let (_state, router) = avatar_api::setup::initialize_app(config.clone()).await?;

    avatar_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
