pub mod cli;
#[cfg(feature = "cli")]
pub mod cli_args;
pub mod toml_config;

pub use cli::LocalStorage;
#[cfg(feature = "cli")]
pub use cli_args::CliConfig;

pub const DEFAULT_ARCHIVE_NAME: &str = "odp_recommendations.zip";
