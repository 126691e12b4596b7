use async_once::AsyncOnce;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use lazy_static::lazy_static;
use movie_store::{ApiGatewayResponse, Config, DynamoGateway};
use serde_json::Value;
use tracing::debug;

mod handler;

// Built once per cold start and reused by all invocations of this instance.
// Cannot use std::OnceCell because it does not support async initialization.
lazy_static! {
    static ref CONFIG: Config = Config::from_env();
    static ref GATEWAY: AsyncOnce<DynamoGateway> =
        AsyncOnce::new(async { DynamoGateway::new(CONFIG.region.as_deref()).await });
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    movie_store::init_tracing(env!("CARGO_PKG_NAME"));

    lambda_runtime::run(service_fn(my_handler)).await
}

/// GET /movies/{movieId}?cast=true
/// Always returns a response for API Gateway - request errors are not lambda errors.
async fn my_handler(event: LambdaEvent<Value>) -> Result<ApiGatewayResponse, Error> {
    let (event, ctx) = event.into_parts();
    debug!("Context: {:?}", ctx);

    let gateway = GATEWAY.get().await;

    Ok(handler::handle(event, &CONFIG, gateway).await)
}
