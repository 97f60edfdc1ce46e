use anyhow::Context;
use clap::Parser;
use egg_incubator::app::ApiResult;
use egg_incubator::config::{CliCommand, StoreBackend};
use egg_incubator::core::IncubatorStore;
use egg_incubator::utils::error::{ErrorSeverity, IncubatorError};
use egg_incubator::utils::{logger, validation::Validate};
use egg_incubator::{
    ApiInput, CliConfig, IncubatorConfig, IncubatorController, IncubatorEngine, IncubatorId,
    LocalIncubatorStore, MemoryIncubatorStore, RequestValidator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    let config = load_config(&cli)?;

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let id = match &cli.incubator {
        Some(id) => IncubatorId::new(id.clone()),
        None => config.default_incubator_id(),
    }
    .context("invalid incubator id")?;

    let outcome = match config.store.backend {
        StoreBackend::Local => {
            tracing::debug!("Using local store at {}", config.store.path);
            let store = LocalIncubatorStore::new(config.store.path.clone());
            execute(build_controller(store, &config, id.clone()), &cli.command, &id).await
        }
        StoreBackend::Memory => {
            tracing::warn!("Memory store selected; state is discarded when the command exits");
            let store = MemoryIncubatorStore::new();
            execute(build_controller(store, &config, id.clone()), &cli.command, &id).await
        }
        StoreBackend::S3 => Err(IncubatorError::ConfigError {
            message: "The s3 backend is only available to the lambda binary".to_string(),
        }),
    };

    match outcome {
        Ok(result) => {
            let rendered =
                serde_json::to_string_pretty(&result).context("failed to render report")?;
            println!("{}", rendered);
        }
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn load_config(cli: &CliConfig) -> anyhow::Result<IncubatorConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            IncubatorConfig::from_file(path)
                .with_context(|| format!("failed to load config file '{}'", path))?
        }
        None => IncubatorConfig::default(),
    };

    // 應用命令列覆蓋設定
    if let Some(path) = &cli.store_path {
        config.store.backend = StoreBackend::Local;
        config.store.path = path.clone();
    }

    Ok(config)
}

fn build_controller<S: IncubatorStore>(
    store: S,
    config: &IncubatorConfig,
    id: IncubatorId,
) -> IncubatorController<S> {
    let engine = IncubatorEngine::with_scheduler(store, config.scheduler())
        .max_conflict_retries(config.store.max_conflict_retries);
    IncubatorController::new(engine, RequestValidator::new(config.limits), id)
}

async fn execute<S: IncubatorStore>(
    controller: IncubatorController<S>,
    command: &CliCommand,
    id: &IncubatorId,
) -> egg_incubator::Result<ApiResult> {
    match command {
        CliCommand::Create {
            number_of_eggs,
            sequence,
            rotation_amount,
        } => {
            let input = ApiInput::new(
                number_of_eggs.as_str(),
                sequence.as_str(),
                rotation_amount.as_str(),
            );
            controller.put_settings(id, &input).await
        }
        CliCommand::PortRun => controller.port_run(id).await,
        CliCommand::Show => controller.get_settings(id).await,
    }
}
