pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliCommand, CliConfig, LocalStorage};

pub use config::{env::EnvConfig, toml_config::TomlConfig};
pub use self::core::{
    orchestrator::ChatOrchestrator, orchestrator_from_config, session::ChatSession,
    DefaultOrchestrator,
};
pub use utils::error::{ErrorType, OrchestratorError, Result};
