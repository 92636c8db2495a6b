//! Settings for the strata terrain tools.
//!
//! Settings persist as `config.ron` in a config directory and can be
//! overridden from the command line. Every section defaults independently, so
//! partial or older files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, Config, DebugConfig, GridConfig, SliceConfig, TerrainConfig,
    default_config_dir,
};
pub use error::ConfigError;
