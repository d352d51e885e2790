pub(crate) mod db;
mod sqlite_impl;

pub use db::MIGRATOR;
pub use sqlite_impl::SqliteDatabase;
