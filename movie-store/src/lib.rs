//! Shared code of the movie lookup lambdas: record types, DynamoDB marshalling,
//! the storage gateway, query param validation and API Gateway responses.

use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod marshal;
pub mod memory;
pub mod schema;
pub mod seed;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, LookupError, StoreError};
pub use gateway::{fetch_cast, fetch_movie, CastQuery, DynamoGateway, KeyQuery, StorageGateway};
pub use http::{data_response, ApiGatewayResponse, HttpEvent};
pub use marshal::{generate_batch, generate_cast_item, generate_movie_item, Item};
pub use types::{CastMember, CastQueryParams, Movie};

/// Initializes the tracing from RUST_LOG env var if present or sets minimal logging:
/// - INFO for the calling binary and this crate
/// - WARN for everything else
///
/// * binary_name: the package name of the lambda, e.g. `get-movie`
pub fn init_tracing(binary_name: &str) {
    // tracing uses target names with underscores, e.g. `get_movie`
    let binary_name = binary_name.replace('-', "_");

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{binary_name}=info,movie_store=info")));

    // CloudWatch adds its own timestamps and does not render colour codes
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .compact()
        .init();
}
