use serde::{Deserialize, Serialize};

/// A movie record as stored in the movies table, keyed by `id`.
/// Field names match the table attribute names and the JSON returned to the caller.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub backdrop_path: String,
    pub genre_ids: Vec<i64>,
    pub original_language: String,
    pub original_title: String,
    pub adult: bool,
    pub overview: String,
    pub popularity: f64,
    pub poster_path: String,
    pub release_date: String,
    pub title: String,
    pub video: bool,
    pub vote_average: f64,
    pub vote_count: i64,
}

/// A single cast row. The cast table is keyed by `movieId` + `actorName`,
/// with a secondary index on `movieId` + `roleName`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CastMember {
    pub movie_id: i64,
    pub actor_name: String,
    pub role_name: String,
    pub role_description: String,
}

/// Validated query parameters of the cast lookup.
/// `movie_id` is still in its string form - converting it is a separate step with its own error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CastQueryParams {
    pub movie_id: String,
    pub role_name: Option<String>,
    pub actor_name: Option<String>,
}
