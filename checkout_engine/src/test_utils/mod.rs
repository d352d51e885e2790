pub mod memory;
#[cfg(feature = "sqlite")]
pub mod prepare_env;
