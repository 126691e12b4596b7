use crate::types::{CastMember, Movie};
use lazy_static::lazy_static;
use serde::Deserialize;

/// The dataset the tables are seeded with, embedded at compile time.
const SEED_JSON: &str = include_str!("../seed/movies.json");

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SeedData {
    movies: Vec<Movie>,
    movie_casts: Vec<CastMember>,
}

lazy_static! {
    // The file is part of the binary, so a parsing failure can only be a bug.
    static ref SEED: SeedData = serde_json::from_str(SEED_JSON).expect("Invalid seed/movies.json. It's a bug.");
}

pub fn movies() -> &'static [Movie] {
    &SEED.movies
}

pub fn movie_casts() -> &'static [CastMember] {
    &SEED.movie_casts
}

/// All seed cast rows of the movie in the order they appear in the seed file.
/// Returns an empty Vec for unknown movies.
pub fn cast_for_movie(movie_id: i64) -> Vec<CastMember> {
    movie_casts().iter().filter(|c| c.movie_id == movie_id).cloned().collect()
}
