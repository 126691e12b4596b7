use movie_store::schema::CAST_QUERY_SHAPE;
use movie_store::{
    data_response, fetch_cast, ApiGatewayResponse, CastQuery, CastQueryParams, Config, HttpEvent, LookupError,
    StorageGateway,
};
use serde_json::Value;
use tracing::{debug, error, info};

/// Handles a cast lookup and converts any failure into an error response.
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
    let table = config.require_table()?;
    config.require_region()?;

    let event = HttpEvent::from_value(event).unwrap_or_default();
    let query = event
        .query_string_parameters
        .as_ref()
        .ok_or_else(|| LookupError::client_input("Missing query parameters"))?;

    let params = CastQueryParams::from_query(query).map_err(|violation| {
        info!("Invalid query params: {violation}");
        LookupError::ClientInput {
            message: "Incorrect type. Must match Query parameters schema".to_string(),
            schema: Some(CAST_QUERY_SHAPE.to_json_schema()),
        }
    })?;

    let cast_query = dispatch(&params)?;
    debug!("Dispatching {:?}", cast_query);

    let cast = fetch_cast(gateway, table, &cast_query).await?;

    // no rows is a valid answer, not a 404
    Ok(data_response(200, cast))
}

/// Picks the storage query for the validated params:
/// - roleName -> role index, roleName prefix
/// - actorName -> table key, actorName prefix
/// - neither -> all cast rows of the movie
///
/// roleName wins if both are present. Empty prefixes are treated as absent.
fn dispatch(params: &CastQueryParams) -> Result<CastQuery, LookupError> {
    let movie_id = params
        .movie_id
        .trim()
        .parse::<i64>()
        .map_err(|_| LookupError::client_input("movieId must be a valid number"))?;

    let role_name = non_empty(&params.role_name);
    let actor_name = non_empty(&params.actor_name);

    Ok(match (role_name, actor_name) {
        (Some(role_name), actor_name) => {
            if actor_name.is_some() {
                debug!("Both roleName and actorName are set. Ignoring actorName.");
            }
            CastQuery::ByRolePrefix(movie_id, role_name.to_owned())
        }
        (None, Some(actor_name)) => CastQuery::ByActorPrefix(movie_id, actor_name.to_owned()),
        (None, None) => CastQuery::ByMovie(movie_id),
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use movie_store::memory::MemoryGateway;
    use movie_store::{generate_batch, generate_cast_item, seed, CastMember};
    use serde_json::json;

    const CAST: &str = "MovieCastTable";

    fn config() -> Config {
        Config {
            table_name: Some(CAST.to_string()),
            region: Some("eu-west-1".to_string()),
            cast_table_name: None,
        }
    }

    fn cast(movie_id: i64, actor_name: &str, role_name: &str) -> CastMember {
        CastMember {
            movie_id,
            actor_name: actor_name.to_string(),
            role_name: role_name.to_string(),
            role_description: String::new(),
        }
    }

    async fn gateway_with(rows: &[CastMember]) -> MemoryGateway {
        let gateway = MemoryGateway::new().with_table(CAST, &["movieId", "actorName"]);
        let batch = generate_batch(rows, generate_cast_item).expect("batch should build");
        gateway.batch_write(CAST, batch).await.expect("seeding should pass");
        gateway
    }

    async fn seeded_gateway() -> MemoryGateway {
        gateway_with(seed::movie_casts()).await
    }

    fn event(query: Value) -> Value {
        json!({
            "rawPath": "/movies/cast",
            "queryStringParameters": query,
        })
    }

    fn body(response: &ApiGatewayResponse) -> Value {
        serde_json::from_str(&response.body).expect("body should be valid JSON")
    }

    fn actor_names(response: &ApiGatewayResponse) -> Vec<String> {
        body(response)["data"]
            .as_array()
            .expect("data should be an array")
            .iter()
            .map(|c| c["actorName"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    #[tokio::test]
    async fn missing_configuration_is_checked_first() {
        let gateway = seeded_gateway().await;
        let calls_after_seeding = gateway.calls();
        let config = Config {
            region: None,
            ..config()
        };

        let response = handle(event(Value::Null), &config, &gateway).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(
            body(&response),
            json!({ "error": "Server configuration error: REGION env var is not set" })
        );
        assert_eq!(gateway.calls(), calls_after_seeding);
    }

    #[tokio::test]
    async fn missing_query_params_are_rejected() {
        let gateway = seeded_gateway().await;
        let response = handle(event(Value::Null), &config(), &gateway).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(body(&response), json!({ "message": "Missing query parameters" }));
    }

    #[tokio::test]
    async fn schema_violations_echo_the_schema_without_touching_storage() {
        let gateway = seeded_gateway().await;
        let calls_after_seeding = gateway.calls();

        for query in [
            json!({}),
            json!({ "roleName": "Ty" }),
            json!({ "movieId": 550 }),
            json!({ "movieId": "550", "page": "2" }),
        ] {
            let response = handle(event(query.clone()), &config(), &gateway).await;
            assert_eq!(response.status_code, 400, "query: {query}");

            let body = body(&response);
            assert_eq!(body["message"], json!("Incorrect type. Must match Query parameters schema"));
            assert_eq!(body["schema"], CAST_QUERY_SHAPE.to_json_schema());
        }

        assert_eq!(gateway.calls(), calls_after_seeding);
    }

    #[tokio::test]
    async fn non_numeric_movie_id_is_rejected() {
        let gateway = seeded_gateway().await;
        let response = handle(event(json!({ "movieId": "fight-club" })), &config(), &gateway).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(body(&response), json!({ "message": "movieId must be a valid number" }));
    }

    #[tokio::test]
    async fn movie_id_alone_returns_the_full_cast() {
        let gateway = seeded_gateway().await;
        let response = handle(event(json!({ "movieId": "680" })), &config(), &gateway).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            actor_names(&response),
            vec!["Bruce Willis", "John Travolta", "Samuel L. Jackson", "Uma Thurman"]
        );
    }

    #[tokio::test]
    async fn role_prefix_matches_only_roles_of_the_movie() {
        let gateway = gateway_with(&[
            cast(550, "Brad Pitt", "Tyler Durden"),
            cast(550, "Edward Norton", "Bruised Narrator"),
            cast(550, "Meat Loaf", "Bob"),
            cast(550, "Helena Bonham Carter", "Brunette"),
            cast(680, "Bruce Willis", "Brawler"),
        ])
        .await;

        let response = handle(event(json!({ "movieId": "550", "roleName": "Br" })), &config(), &gateway).await;

        assert_eq!(response.status_code, 200);
        let data = body(&response)["data"].clone();
        let roles: Vec<&str> = data
            .as_array()
            .expect("data should be an array")
            .iter()
            .map(|c| c["roleName"].as_str().unwrap_or_default())
            .collect();
        assert_eq!(roles, vec!["Bruised Narrator", "Brunette"]);
    }

    #[tokio::test]
    async fn actor_prefix_matches_actor_names() {
        let gateway = seeded_gateway().await;
        let response = handle(event(json!({ "movieId": "680", "actorName": "B" })), &config(), &gateway).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(actor_names(&response), vec!["Bruce Willis"]);
    }

    #[tokio::test]
    async fn role_name_wins_over_actor_name() {
        let gateway = seeded_gateway().await;
        let response = handle(
            event(json!({ "movieId": "680", "roleName": "Mia", "actorName": "John" })),
            &config(),
            &gateway,
        )
        .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(actor_names(&response), vec!["Uma Thurman"]);
    }

    #[tokio::test]
    async fn no_matches_is_an_empty_success() {
        let gateway = seeded_gateway().await;
        let response = handle(event(json!({ "movieId": "13" })), &config(), &gateway).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(body(&response), json!({ "data": [] }));
    }

    #[tokio::test]
    async fn storage_failure_surfaces_the_message() {
        let gateway = MemoryGateway::failing("Query on MovieCastTable failed: ValidationException");
        let response = handle(event(json!({ "movieId": "550" })), &config(), &gateway).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(
            body(&response),
            json!({ "error": "Query on MovieCastTable failed: ValidationException" })
        );
        assert_eq!(gateway.calls(), 1);
    }

    fn params(movie_id: &str, role_name: Option<&str>, actor_name: Option<&str>) -> CastQueryParams {
        CastQueryParams {
            movie_id: movie_id.to_string(),
            role_name: role_name.map(str::to_owned),
            actor_name: actor_name.map(str::to_owned),
        }
    }

    #[test]
    fn dispatch_selects_one_branch() {
        assert_eq!(
            dispatch(&params("550", None, None)).expect("valid params"),
            CastQuery::ByMovie(550)
        );
        assert_eq!(
            dispatch(&params("550", Some("Ty"), None)).expect("valid params"),
            CastQuery::ByRolePrefix(550, "Ty".to_string())
        );
        assert_eq!(
            dispatch(&params("550", None, Some("Brad"))).expect("valid params"),
            CastQuery::ByActorPrefix(550, "Brad".to_string())
        );
        assert_eq!(
            dispatch(&params("550", Some("Ty"), Some("Brad"))).expect("valid params"),
            CastQuery::ByRolePrefix(550, "Ty".to_string())
        );
    }

    #[test]
    fn dispatch_ignores_empty_prefixes() {
        assert_eq!(
            dispatch(&params("550", Some(""), Some("Brad"))).expect("valid params"),
            CastQuery::ByActorPrefix(550, "Brad".to_string())
        );
        assert_eq!(
            dispatch(&params("550", Some(""), Some(""))).expect("valid params"),
            CastQuery::ByMovie(550)
        );
    }

    #[test]
    fn dispatch_rejects_non_integer_movie_ids() {
        for movie_id in ["", "abc", "5.5", "550x"] {
            let error = dispatch(&params(movie_id, None, None)).expect_err("movie_id should be rejected");
            assert_eq!(error.status_code(), 400, "movie_id: {movie_id}");
        }
    }
}
