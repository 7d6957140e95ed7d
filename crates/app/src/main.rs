use engine::{Engine, Store};
use migration::{Migrator, MigratorTrait};
use server::{ServerState, StaticTokens};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "expense_ledger={level},server={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .init();

    let store = Store::connect(&settings.database.url()).await?;
    Migrator::up(store.connection(), None).await?;
    tracing::info!("database schema is up to date");

    let engine = Engine::builder().store(store.clone()).build().await?;
    let state = ServerState::new(
        engine,
        StaticTokens::new(settings.auth.tokens.clone()),
        settings.app.mode,
    );

    let addr = settings.server.address();
    tokio::select! {
        _ = server::run(state, &addr) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }

    store.close().await?;
    Ok(())
}
