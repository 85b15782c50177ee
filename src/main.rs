use clap::Parser;
use std::io::{BufRead, Write};
use std::time::Duration;
use tastematch::adapters::remote::RemoteEndpoint;
use tastematch::core::{ChatTransport, ConfigProvider, Storage};
use tastematch::domain::model::ChatRequestBody;
use tastematch::utils::{logger, validation::Validate};
use tastematch::{
    orchestrator_from_config, ChatSession, CliCommand, CliConfig, DefaultOrchestrator, EnvConfig,
    LocalStorage, TomlConfig,
};

/// 依 --config 決定使用 TOML 檔或環境變數
fn load_config(config: &CliConfig) -> tastematch::Result<Box<dyn ConfigProvider>> {
    match &config.config {
        Some(path) => {
            let toml = TomlConfig::from_file(path)?;
            toml.validate()?;
            Ok(Box::new(toml))
        }
        None => {
            let env = EnvConfig::from_env()?;
            env.validate()?;
            Ok(Box::new(env))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    // 驗證配置
    let settings = match load_config(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    let orchestrator = orchestrator_from_config(settings.as_ref());

    match cli.command {
        CliCommand::Ask {
            phase,
            message,
            sub_phase,
            business_type,
            location,
            insights_file,
        } => {
            let qloo_insights = match insights_file {
                Some(path) => {
                    let data = LocalStorage::new(".".to_string()).read_file(&path).await?;
                    Some(serde_json::from_slice(&data)?)
                }
                None => None,
            };

            let body = ChatRequestBody {
                message,
                phase: Some(phase),
                onboarding_sub_phase: sub_phase,
                user_business_type: business_type,
                target_location: location,
                qloo_insights,
            };
            let payload = serde_json::to_vec(&body)?;
            let reply = orchestrator.handle_http("POST", &payload).await;

            println!("{}", reply.body);
            if !reply.is_success() {
                std::process::exit(2);
            }
        }
        CliCommand::Insights {
            location,
            business_type,
        } => {
            let report = orchestrator
                .handle(tastematch::core::ChatRequest::FetchInsights {
                    location,
                    business_type,
                })
                .await;

            match report {
                Ok(reply) => println!("{}", serde_json::to_string_pretty(&reply)?),
                Err(e) => {
                    eprintln!("❌ {}", e.user_friendly_message());
                    eprintln!("💡 {}", e.recovery_suggestion());
                    std::process::exit(2);
                }
            }
        }
        CliCommand::Chat {
            endpoint,
            endpoint_key,
            export_dir,
        } => {
            let storage = LocalStorage::new(export_dir);
            match endpoint {
                Some(url) => {
                    let timeout = Duration::from_secs(settings.request_timeout_secs());
                    let remote = RemoteEndpoint::new(url, endpoint_key, timeout)?;
                    run_chat(&remote, &storage).await?;
                }
                None => run_chat::<DefaultOrchestrator>(&orchestrator, &storage).await?,
            }
        }
    }

    Ok(())
}

async fn run_chat<T: ChatTransport>(transport: &T, storage: &LocalStorage) -> anyhow::Result<()> {
    let mut session = ChatSession::new();
    println!("🤖 {}\n", session.messages()[0].content);

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();

        if input == "/quit" {
            break;
        }
        if let Some(path) = input.strip_prefix("/export") {
            let path = match path.trim() {
                "" => "tastematch-transcript.json",
                p => p,
            };
            match session.export(storage, path).await {
                Ok(()) => println!("📁 Transcript saved to {}\n", path),
                Err(e) => eprintln!("❌ {}", e),
            }
            continue;
        }

        if let Some(answer) = session.send(transport, input).await {
            println!("\n🤖 {}\n", answer.content);
        }
    }

    Ok(())
}
