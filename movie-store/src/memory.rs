//! An in-memory gateway with the same key and prefix semantics as DynamoDB.
//! Used in tests and for running the handlers without AWS.

use crate::error::StoreError;
use crate::gateway::{KeyQuery, StorageGateway};
use crate::marshal::Item;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, WriteRequest};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Table {
    /// Partition key followed by the optional sort key
    key_attrs: Vec<String>,
    items: Vec<Item>,
}

#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: Mutex<HashMap<String, Table>>,
    /// Number of get_item / query / batch_write calls
    calls: AtomicUsize,
    /// All calls fail with this message if set
    failure: Option<String>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway where every call fails, as if DynamoDB was unreachable.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Creates an empty table, e.g. `with_table("MovieCast", &["movieId", "actorName"])`.
    pub fn with_table(self, name: &str, key_attrs: &[&str]) -> Self {
        self.lock_tables().insert(
            name.to_string(),
            Table {
                key_attrs: key_attrs.iter().map(|k| k.to_string()).collect(),
                items: Vec::new(),
            },
        );
        self
    }

    /// How many storage calls were made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock_tables(&self) -> std::sync::MutexGuard<'_, HashMap<String, Table>> {
        // a panic in another test thread must not hide the data from this one
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Counts the call and returns the injected failure, if any.
    fn begin_call(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(StoreError::Upstream(message.clone())),
            None => Ok(()),
        }
    }
}

fn table_not_found(table: &str) -> StoreError {
    StoreError::Upstream(format!("ResourceNotFoundException: Requested resource not found: {table}"))
}

fn same_key(key_attrs: &[String], a: &Item, b: &Item) -> bool {
    key_attrs.iter().all(|k| a.get(k).is_some() && a.get(k) == b.get(k))
}

fn matches_key(query: &KeyQuery, item: &Item) -> bool {
    let (partition_attr, partition_value) = &query.partition;
    if item.get(partition_attr) != Some(partition_value) {
        return false;
    }

    match &query.sort_prefix {
        Some((sort_attr, prefix)) => matches!(item.get(sort_attr), Some(AttributeValue::S(v)) if v.starts_with(prefix.as_str())),
        None => true,
    }
}

fn sort_value(item: &Item, attr: &str) -> String {
    match item.get(attr) {
        Some(AttributeValue::S(v)) => v.clone(),
        _ => String::new(),
    }
}

#[async_trait]
impl StorageGateway for MemoryGateway {
    async fn get_item(&self, table: &str, key: Item) -> Result<Option<Item>, StoreError> {
        self.begin_call()?;
        let tables = self.lock_tables();
        let table = tables.get(table).ok_or_else(|| table_not_found(table))?;

        Ok(table
            .items
            .iter()
            .find(|item| same_key(&table.key_attrs, &key, item))
            .cloned())
    }

    async fn query(&self, table: &str, query: &KeyQuery) -> Result<Vec<Item>, StoreError> {
        self.begin_call()?;
        let tables = self.lock_tables();
        let table = tables.get(table).ok_or_else(|| table_not_found(table))?;

        let mut items: Vec<Item> = table.items.iter().filter(|item| matches_key(query, item)).cloned().collect();

        // DynamoDB returns the items ordered by the sort key of the table or index
        let sort_attr = match (&query.sort_prefix, table.key_attrs.get(1)) {
            (Some((attr, _)), _) => Some(attr.as_str()),
            (None, Some(attr)) if query.index_name.is_none() => Some(attr.as_str()),
            _ => None,
        };
        if let Some(attr) = sort_attr {
            items.sort_by_key(|item| sort_value(item, attr));
        }

        Ok(items)
    }

    async fn batch_write(&self, table: &str, requests: Vec<WriteRequest>) -> Result<Vec<WriteRequest>, StoreError> {
        self.begin_call()?;
        let mut tables = self.lock_tables();
        let table = tables.get_mut(table).ok_or_else(|| table_not_found(table))?;

        for request in requests {
            if let Some(put) = request.put_request() {
                let item = put.item().clone();
                let key_attrs = &table.key_attrs;
                table.items.retain(|existing| !same_key(key_attrs, &item, existing));
                table.items.push(item);
            } else if let Some(delete) = request.delete_request() {
                let key = delete.key().clone();
                let key_attrs = &table.key_attrs;
                table.items.retain(|existing| !same_key(key_attrs, &key, existing));
            }
        }

        // everything is processed in memory
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{fetch_cast, fetch_movie, CastQuery};
    use crate::marshal::{generate_batch, generate_cast_item, generate_movie_item};
    use crate::seed;
    use crate::types::CastMember;

    fn cast(movie_id: i64, actor: &str, role: &str) -> CastMember {
        CastMember {
            movie_id,
            actor_name: actor.to_string(),
            role_name: role.to_string(),
            role_description: format!("{role} in movie {movie_id}"),
        }
    }

    async fn cast_gateway(rows: &[CastMember]) -> MemoryGateway {
        let gateway = MemoryGateway::new().with_table("cast", &["movieId", "actorName"]);
        let batch = generate_batch(rows, generate_cast_item).expect("batch should build");
        gateway.batch_write("cast", batch).await.expect("write should pass");
        gateway
    }

    #[tokio::test]
    async fn movies_written_by_the_batch_helper_read_back_unchanged() {
        let gateway = MemoryGateway::new().with_table("movies", &["id"]);
        let movies = seed::movies();
        let batch = generate_batch(movies, generate_movie_item).expect("batch should build");
        let unprocessed = gateway.batch_write("movies", batch).await.expect("write should pass");
        assert!(unprocessed.is_empty());

        for movie in movies {
            let read_back = fetch_movie(&gateway, "movies", movie.id)
                .await
                .expect("get should pass")
                .expect("movie should exist");
            assert_eq!(&read_back, movie);
        }
    }

    #[tokio::test]
    async fn cast_written_by_the_batch_helper_reads_back_unchanged() {
        let rows = seed::cast_for_movie(550);
        let gateway = cast_gateway(&rows).await;

        let read_back = fetch_cast(&gateway, "cast", &CastQuery::ByMovie(550))
            .await
            .expect("query should pass");

        // the table orders rows by actorName
        let mut expected = rows.clone();
        expected.sort_by(|a, b| a.actor_name.cmp(&b.actor_name));
        assert_eq!(read_back, expected);
    }

    #[tokio::test]
    async fn put_replaces_the_item_with_the_same_key() {
        let gateway = cast_gateway(&[cast(1, "Actor", "Old role")]).await;
        let batch = generate_batch(&[cast(1, "Actor", "New role")], generate_cast_item).expect("batch should build");
        gateway.batch_write("cast", batch).await.expect("write should pass");

        let rows = fetch_cast(&gateway, "cast", &CastQuery::ByMovie(1)).await.expect("query should pass");
        assert_eq!(rows, vec![cast(1, "Actor", "New role")]);
    }

    #[tokio::test]
    async fn prefix_queries_match_only_their_movie_and_attribute() {
        let gateway = cast_gateway(&[
            cast(1, "Brad Pitt", "Tyler Durden"),
            cast(1, "Edward Norton", "Narrator"),
            cast(1, "Meat Loaf", "Bob"),
            cast(2, "Bruce Willis", "Butch"),
        ])
        .await;

        let by_role = fetch_cast(&gateway, "cast", &CastQuery::ByRolePrefix(1, "B".to_string()))
            .await
            .expect("query should pass");
        assert_eq!(by_role, vec![cast(1, "Meat Loaf", "Bob")]);

        let by_actor = fetch_cast(&gateway, "cast", &CastQuery::ByActorPrefix(1, "B".to_string()))
            .await
            .expect("query should pass");
        assert_eq!(by_actor, vec![cast(1, "Brad Pitt", "Tyler Durden")]);

        let none = fetch_cast(&gateway, "cast", &CastQuery::ByActorPrefix(3, "B".to_string()))
            .await
            .expect("query should pass");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn missing_table_and_injected_failures_are_upstream_errors() {
        let gateway = MemoryGateway::new();
        let error = fetch_movie(&gateway, "movies", 1).await.expect_err("missing table should fail");
        assert!(matches!(error, StoreError::Upstream(_)));

        let gateway = MemoryGateway::failing("connection refused");
        let error = fetch_cast(&gateway, "cast", &CastQuery::ByMovie(1))
            .await
            .expect_err("injected failure should surface");
        assert_eq!(error.to_string(), "connection refused");
        assert_eq!(gateway.calls(), 1);
    }
}
