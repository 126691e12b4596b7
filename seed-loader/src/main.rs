use aws_sdk_dynamodb::types::WriteRequest;
use movie_store::{
    generate_batch, generate_cast_item, generate_movie_item, seed, Config, ConfigError, DynamoGateway, StorageGateway,
    StoreError,
};
use tracing::{info, warn};

/// BatchWriteItem does not accept more than 25 requests per call
const MAX_BATCH_SIZE: usize = 25;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    movie_store::init_tracing(env!("CARGO_PKG_NAME"));

    let config = Config::from_env();
    let movies_table = config.require_table()?;
    let cast_table = config
        .cast_table_name
        .as_deref()
        .ok_or(ConfigError::Missing(movie_store::config::CAST_TABLE_NAME_VAR))?;

    let gateway = DynamoGateway::new(config.region.as_deref()).await;

    let movies = load(&gateway, movies_table, generate_batch(seed::movies(), generate_movie_item)?).await?;
    let cast = load(&gateway, cast_table, generate_batch(seed::movie_casts(), generate_cast_item)?).await?;

    info!("Loaded {movies} movies into {movies_table} and {cast} cast rows into {cast_table}");

    Ok(())
}

/// Writes the requests in chunks of 25 and returns the number of processed requests.
/// Unprocessed requests are logged and dropped.
async fn load<G>(gateway: &G, table: &str, requests: Vec<WriteRequest>) -> Result<usize, StoreError>
where
    G: StorageGateway + ?Sized,
{
    let total = requests.len();
    let mut unprocessed_total = 0;

    for (n, chunk) in requests.chunks(MAX_BATCH_SIZE).enumerate() {
        let unprocessed = gateway.batch_write(table, chunk.to_vec()).await?;
        if !unprocessed.is_empty() {
            warn!("Chunk {n} for {table}: {} unprocessed items", unprocessed.len());
            unprocessed_total += unprocessed.len();
        }
    }

    Ok(total - unprocessed_total)
}
