//! Conversion between typed records and DynamoDB items, plus the batch helpers
//! used to bulk-load the seed data.
//!
//! Numbers are stored as `N`, strings as `S`, booleans as `BOOL` and lists as `L`,
//! which is what the table data looked like when it was loaded with the JS document client.

use crate::error::StoreError;
use crate::types::{CastMember, Movie};
use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, WriteRequest};
use std::collections::HashMap;
use std::str::FromStr;

/// A raw DynamoDB item
pub type Item = HashMap<String, AttributeValue>;

impl Movie {
    pub fn to_item(&self) -> Item {
        HashMap::from([
            ("id".to_string(), number(self.id)),
            ("backdrop_path".to_string(), string(&self.backdrop_path)),
            (
                "genre_ids".to_string(),
                AttributeValue::L(self.genre_ids.iter().map(|g| number(g)).collect()),
            ),
            ("original_language".to_string(), string(&self.original_language)),
            ("original_title".to_string(), string(&self.original_title)),
            ("adult".to_string(), AttributeValue::Bool(self.adult)),
            ("overview".to_string(), string(&self.overview)),
            ("popularity".to_string(), number(self.popularity)),
            ("poster_path".to_string(), string(&self.poster_path)),
            ("release_date".to_string(), string(&self.release_date)),
            ("title".to_string(), string(&self.title)),
            ("video".to_string(), AttributeValue::Bool(self.video)),
            ("vote_average".to_string(), number(self.vote_average)),
            ("vote_count".to_string(), number(self.vote_count)),
        ])
    }

    pub fn from_item(item: &Item) -> Result<Self, StoreError> {
        Ok(Self {
            id: get_n(item, "id")?,
            backdrop_path: get_s(item, "backdrop_path")?,
            genre_ids: get_n_list(item, "genre_ids")?,
            original_language: get_s(item, "original_language")?,
            original_title: get_s(item, "original_title")?,
            adult: get_bool(item, "adult")?,
            overview: get_s(item, "overview")?,
            popularity: get_n(item, "popularity")?,
            poster_path: get_s(item, "poster_path")?,
            release_date: get_s(item, "release_date")?,
            title: get_s(item, "title")?,
            video: get_bool(item, "video")?,
            vote_average: get_n(item, "vote_average")?,
            vote_count: get_n(item, "vote_count")?,
        })
    }

    /// The primary key of a movie item
    pub fn key(id: i64) -> Item {
        HashMap::from([("id".to_string(), number(id))])
    }
}

impl CastMember {
    pub fn to_item(&self) -> Item {
        HashMap::from([
            ("movieId".to_string(), number(self.movie_id)),
            ("actorName".to_string(), string(&self.actor_name)),
            ("roleName".to_string(), string(&self.role_name)),
            ("roleDescription".to_string(), string(&self.role_description)),
        ])
    }

    pub fn from_item(item: &Item) -> Result<Self, StoreError> {
        Ok(Self {
            movie_id: get_n(item, "movieId")?,
            actor_name: get_s(item, "actorName")?,
            role_name: get_s(item, "roleName")?,
            role_description: get_s(item, "roleDescription")?,
        })
    }
}

/// Wraps a movie into a `PutRequest` for BatchWriteItem.
pub fn generate_movie_item(movie: &Movie) -> Result<WriteRequest, StoreError> {
    put_request(movie.to_item())
}

/// Wraps a cast row into a `PutRequest` for BatchWriteItem.
pub fn generate_cast_item(cast_member: &CastMember) -> Result<WriteRequest, StoreError> {
    put_request(cast_member.to_item())
}

/// Converts every record with `generate_item_fn`, e.g. `generate_batch(&movies, generate_movie_item)`.
/// The result is not chunked - BatchWriteItem accepts at most 25 requests per call.
pub fn generate_batch<T, F>(data: &[T], generate_item_fn: F) -> Result<Vec<WriteRequest>, StoreError>
where
    F: Fn(&T) -> Result<WriteRequest, StoreError>,
{
    data.iter().map(generate_item_fn).collect()
}

fn put_request(item: Item) -> Result<WriteRequest, StoreError> {
    let put = PutRequest::builder()
        .set_item(Some(item))
        .build()
        .map_err(|e| StoreError::Build(e.to_string()))?;

    Ok(WriteRequest::builder().put_request(put).build())
}

fn number(v: impl ToString) -> AttributeValue {
    AttributeValue::N(v.to_string())
}

fn string(v: &str) -> AttributeValue {
    AttributeValue::S(v.to_owned())
}

fn get_attr<'a>(item: &'a Item, name: &str) -> Result<&'a AttributeValue, StoreError> {
    item.get(name)
        .ok_or_else(|| StoreError::Decode(format!("missing attribute `{name}`")))
}

fn get_s(item: &Item, name: &str) -> Result<String, StoreError> {
    match get_attr(item, name)? {
        AttributeValue::S(v) => Ok(v.clone()),
        other => Err(wrong_type(name, "S", other)),
    }
}

fn get_bool(item: &Item, name: &str) -> Result<bool, StoreError> {
    match get_attr(item, name)? {
        AttributeValue::Bool(v) => Ok(*v),
        other => Err(wrong_type(name, "BOOL", other)),
    }
}

fn get_n<T: FromStr>(item: &Item, name: &str) -> Result<T, StoreError> {
    match get_attr(item, name)? {
        AttributeValue::N(v) => parse_n(name, v),
        other => Err(wrong_type(name, "N", other)),
    }
}

/// Accepts both a list of numbers and a number set.
fn get_n_list<T: FromStr>(item: &Item, name: &str) -> Result<Vec<T>, StoreError> {
    match get_attr(item, name)? {
        AttributeValue::L(values) => values
            .iter()
            .map(|v| match v {
                AttributeValue::N(n) => parse_n(name, n),
                other => Err(wrong_type(name, "N", other)),
            })
            .collect(),
        AttributeValue::Ns(values) => values.iter().map(|n| parse_n(name, n)).collect(),
        other => Err(wrong_type(name, "L", other)),
    }
}

fn parse_n<T: FromStr>(name: &str, value: &str) -> Result<T, StoreError> {
    value
        .parse::<T>()
        .map_err(|_| StoreError::Decode(format!("attribute `{name}` has invalid number `{value}`")))
}

fn wrong_type(name: &str, expected: &str, actual: &AttributeValue) -> StoreError {
    StoreError::Decode(format!("attribute `{name}` must be {expected}, got {actual:?}"))
}
