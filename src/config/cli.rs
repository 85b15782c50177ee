use crate::domain::ports::Storage;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "tastematch")]
#[command(about = "Cultural intelligence chat orchestrator (Qloo + Gemini/OpenAI)")]
pub struct CliConfig {
    /// TOML configuration file; environment variables are used when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Send a single request to the orchestrator and print the JSON reply
    Ask {
        #[arg(long, default_value = "strategic")]
        phase: String,

        #[arg(long)]
        message: Option<String>,

        #[arg(long)]
        sub_phase: Option<String>,

        #[arg(long)]
        business_type: Option<String>,

        #[arg(long)]
        location: Option<String>,

        /// JSON file holding previously fetched insights
        #[arg(long)]
        insights_file: Option<String>,
    },

    /// Fetch cultural insights for a location
    Insights {
        #[arg(long)]
        location: String,

        #[arg(long, default_value = "general")]
        business_type: String,
    },

    /// Interactive chat session on stdin/stdout
    Chat {
        /// Deployed function URL; the orchestrator runs in-process when omitted
        #[arg(long)]
        endpoint: Option<String>,

        /// Bearer token sent to the deployed function
        #[arg(long, env = "TASTEMATCH_ENDPOINT_KEY")]
        endpoint_key: Option<String>,

        /// Directory used by `/export`
        #[arg(long, default_value = ".")]
        export_dir: String,
    },
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}
