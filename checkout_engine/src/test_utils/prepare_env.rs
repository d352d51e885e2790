//! Helpers for standing up a throwaway database in tests.

use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::sqlite::{SqliteDatabase, MIGRATOR};

/// Create (or recreate) the database at `url` and bring the schema up to date.
pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

/// A unique sqlite url under the system temp directory.
pub fn random_db_path() -> String {
    format!("sqlite://{}/checkout_test_{}.sqlite", std::env::temp_dir().display(), rand::random::<u64>())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    MIGRATOR.run(db.pool()).await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn create_database(url: &str) {
    let path = url.strip_prefix("sqlite://").unwrap_or(url);
    if let Err(e) = Sqlite::drop_database(path).await {
        warn!("Error dropping database {path}: {e:?}");
    }
    Sqlite::create_database(path).await.expect("Error creating database");
    info!("Created Sqlite database {path}");
}
