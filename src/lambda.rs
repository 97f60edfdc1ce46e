#[cfg(feature = "lambda")]
use aws_config::BehaviorVersion;
#[cfg(feature = "lambda")]
use aws_sdk_s3::config::Region;
#[cfg(feature = "lambda")]
use aws_sdk_s3::Client as S3Client;
#[cfg(feature = "lambda")]
use egg_incubator::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use egg_incubator::{
    ApiHandler, ApiRequest, ApiResponse, IncubatorController, IncubatorEngine, LambdaConfig,
    RequestValidator, S3IncubatorStore,
};
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

#[cfg(feature = "lambda")]
async fn function_handler(
    controller: &IncubatorController<S3IncubatorStore>,
    event: LambdaEvent<ApiRequest>,
) -> Result<ApiResponse, Error> {
    let request_id = event.context.request_id.clone();
    tracing::info!(
        "Handling {} {} (request {})",
        event.payload.http_method,
        event.payload.path,
        request_id
    );

    // 所有請求錯誤都轉成 4xx/5xx 回應，不回傳 runtime error
    let response = controller.handle(event.payload).await;

    tracing::info!("Request {} finished with status {}", request_id, response.status_code);
    Ok(response)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    // 建立 Lambda 配置
    let lambda_config = LambdaConfig::from_env()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
    lambda_config
        .validate()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
    let config = lambda_config.incubator;

    let bucket = config.store.bucket.clone().unwrap_or_default();
    let default_id = config
        .default_incubator_id()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

    // 建立 AWS 配置和 S3 客戶端
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .region(Region::new(config.store.region.clone()))
        .force_path_style(true)
        .build();
    let s3_client = S3Client::from_conf(s3_config);

    tracing::info!(
        "Incubator Lambda ready (bucket {}, prefix {}, default incubator {}, mode {:?})",
        bucket,
        config.store.prefix,
        default_id,
        config.rotation.mode
    );

    let store = S3IncubatorStore::new(s3_client, bucket, config.store.prefix.clone());
    let engine = IncubatorEngine::with_scheduler(store, config.scheduler())
        .max_conflict_retries(config.store.max_conflict_retries);
    let controller =
        IncubatorController::new(engine, RequestValidator::new(config.limits), default_id);

    let controller = &controller;
    run(service_fn(move |event: LambdaEvent<ApiRequest>| async move {
        function_handler(controller, event).await
    }))
    .await
}

#[cfg(not(feature = "lambda"))]
fn main() {
    eprintln!("The lambda binary requires the `lambda` feature");
}
