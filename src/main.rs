use std::sync::Arc;

use anyhow::Result;
use diesel_migrations::{EmbeddedMigrations, embed_migrations};
use marketplace_orders::{
    app_state::AppState,
    bootstrap, config, db, routes,
    store::PgStore,
};

/// Migrations embedded into the binary.
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing();
    bootstrap::init_env();

    let config = config::load()?;

    tracing::info!("Running migrations...");
    let migrations_count = db::run_migrations_blocking(MIGRATIONS, &config.database.url).await?;
    tracing::info!("Run {} new migrations successfully", migrations_count);

    let pool = db::create_pool(&config.database).await?;
    let state = AppState::new(Arc::new(PgStore::new(pool)));

    tracing::info!("Bootstrapping...");
    bootstrap::serve("MarketplaceOrders", routes::app(state), &config.server).await
}
