//! First-run setup and the schema bootstrap run on every start.

use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use platform_api::{ApiError, Notice};
use platform_db::{ConfigStore, DatabaseSettings, SetupForm};
use tracing::{info, warn};

/// Setup is needed when there is no config file or its settings do not connect.
pub async fn needs_setup(store: &ConfigStore) -> bool {
    let settings = match store.try_load() {
        Ok(Some(settings)) => settings,
        Ok(None) => return true,
        Err(err) => {
            warn!(error = %err, "config file unreadable; using defaults");
            DatabaseSettings::default()
        }
    };
    match platform_db::test_connection(&settings).await {
        Ok(()) => false,
        Err(err) => {
            warn!(error = %err, "configured database is unreachable");
            true
        }
    }
}

/// "Test connection": reach the server without selecting a database.
pub async fn test_connection(form: &SetupForm) -> Notice {
    let settings = form.collect();
    match platform_db::test_connection(&settings).await {
        Ok(()) => Notice::info("Setup", "Connection OK"),
        Err(err) => ApiError::from(err).notice("Connection"),
    }
}

/// "Save & continue": create the database, persist the settings and read
/// them back.
pub async fn save_setup(store: &ConfigStore, form: &SetupForm) -> Result<DatabaseSettings> {
    let settings = form.collect();
    platform_db::ensure_database(&settings)
        .await
        .context("creating database")?;
    store.save(&settings)?;
    info!(path = %store.path().display(), "setup complete");
    Ok(store.load())
}

/// Create the database if missing and apply pending migrations.
pub async fn migrate_schema(settings: &DatabaseSettings) -> Result<()> {
    platform_db::ensure_database(settings).await?;
    let conn = platform_db::connect(settings).await?;
    let result = Migrator::up(&conn, None)
        .await
        .context("applying migrations");
    platform_db::release(conn).await;
    result
}

/// [`migrate_schema`], then seed the default accounts.
pub async fn ensure_schema(settings: &DatabaseSettings) -> Result<()> {
    migrate_schema(settings).await?;
    let conn = platform_db::connect(settings).await?;
    let result = platform_authn::seed_default_accounts(&conn)
        .await
        .context("seeding default accounts");
    platform_db::release(conn).await;
    result.map(|_| ())
}
