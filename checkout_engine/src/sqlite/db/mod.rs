pub(crate) mod carts;
pub(crate) mod orders;
pub(crate) mod products;

use sqlx::{
    migrate::Migrator,
    sqlite::{SqlitePool, SqlitePoolOptions},
};

pub static MIGRATOR: Migrator = sqlx::migrate!("./src/sqlite/migrations");

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new().max_connections(max_connections).connect(url).await
}
