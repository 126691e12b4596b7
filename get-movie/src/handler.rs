use movie_store::{
    data_response, fetch_cast, fetch_movie, seed, ApiGatewayResponse, CastMember, CastQuery, Config, HttpEvent,
    LookupError, Movie, StorageGateway,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

const INVALID_MOVIE_ID: &str = "Missing or invalid movie ID";
const MOVIE_NOT_FOUND: &str = "Movie not found";

/// The movie with its cast attached on request.
#[derive(Serialize, Debug)]
struct MovieWithCast {
    #[serde(flatten)]
    movie: Movie,
    #[serde(skip_serializing_if = "Option::is_none")]
    cast: Option<Vec<CastMember>>,
}

/// Handles a single movie lookup and converts any failure into an error response.
pub(crate) async fn handle<G>(event: Value, config: &Config, gateway: &G) -> ApiGatewayResponse
where
    G: StorageGateway + ?Sized,
{
    info!("Event: {}", event);

    match lookup(event, config, gateway).await {
        Ok(v) => v,
        Err(e) => {
            if e.status_code() >= 500 {
                error!("Error occurred: {}", e);
            } else {
                info!("Request rejected: {}", e);
            }
            e.into_response()
        }
    }
}

async fn lookup<G>(event: Value, config: &Config, gateway: &G) -> Result<ApiGatewayResponse, LookupError>
where
    G: StorageGateway + ?Sized,
{
    // an event without usable path params is treated the same as a missing ID
    let event = HttpEvent::from_value(event).unwrap_or_default();

    let movie_id = parse_movie_id(event.path_parameter("movieId")).ok_or_else(|| LookupError::client_input(INVALID_MOVIE_ID))?;
    let include_cast = event.query_parameter("cast") == Some("true");

    let table = config.require_table()?;
    config.require_region()?;

    let movie = fetch_movie(gateway, table, movie_id)
        .await?
        .ok_or_else(|| LookupError::NotFound(MOVIE_NOT_FOUND.to_string()))?;

    let cast = if include_cast {
        Some(movie_cast(config, gateway, movie_id).await?)
    } else {
        None
    };

    Ok(data_response(200, MovieWithCast { movie, cast }))
}

/// Cast rows come from the embedded seed list unless a cast table is configured.
async fn movie_cast<G>(config: &Config, gateway: &G, movie_id: i64) -> Result<Vec<CastMember>, LookupError>
where
    G: StorageGateway + ?Sized,
{
    match config.cast_table_name.as_deref() {
        Some(cast_table) => {
            debug!("Cast from table {cast_table}");
            Ok(fetch_cast(gateway, cast_table, &CastQuery::ByMovie(movie_id)).await?)
        }
        None => {
            debug!("Cast from the seed list");
            Ok(seed::cast_for_movie(movie_id))
        }
    }
}

/// Only positive integers are valid movie IDs.
fn parse_movie_id(movie_id: Option<&str>) -> Option<i64> {
    movie_id?.trim().parse::<i64>().ok().filter(|id| *id > 0)
}
