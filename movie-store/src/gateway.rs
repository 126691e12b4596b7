use crate::error::StoreError;
use crate::marshal::Item;
use crate::types::{CastMember, Movie};
use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, WriteRequest};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_types::region::Region;
use std::collections::HashMap;
use tracing::{debug, info};

/// The name of the cast table index keyed by `movieId` + `roleName`.
pub const ROLE_INDEX: &str = "roleIx";

/// A key condition: an exact match on the partition attribute and an optional
/// `begins_with` on the sort attribute of the table or of one of its indexes.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyQuery {
    /// None for the table's own key
    pub index_name: Option<String>,
    /// Attribute name + value, e.g. `movieId` = 550
    pub partition: (String, AttributeValue),
    /// Attribute name + prefix, e.g. `roleName` begins with "Br"
    pub sort_prefix: Option<(String, String)>,
}

impl KeyQuery {
    /// E.g. `movieId = :pk and begins_with(roleName, :prefix)`
    pub fn key_condition_expression(&self) -> String {
        match &self.sort_prefix {
            Some((sort_attr, _)) => format!("{} = :pk and begins_with({sort_attr}, :prefix)", self.partition.0),
            None => format!("{} = :pk", self.partition.0),
        }
    }

    pub fn expression_attribute_values(&self) -> HashMap<String, AttributeValue> {
        let mut values = HashMap::from([(":pk".to_string(), self.partition.1.clone())]);
        if let Some((_, prefix)) = &self.sort_prefix {
            values.insert(":prefix".to_string(), AttributeValue::S(prefix.clone()));
        }
        values
    }
}

/// The three ways the cast table can be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastQuery {
    /// All cast rows of the movie
    ByMovie(i64),
    /// Rows of the movie with `roleName` starting with the prefix, via the role index
    ByRolePrefix(i64, String),
    /// Rows of the movie with `actorName` starting with the prefix, via the table key
    ByActorPrefix(i64, String),
}

impl CastQuery {
    pub fn key_query(&self) -> KeyQuery {
        let movie_id = |id: &i64| ("movieId".to_string(), AttributeValue::N(id.to_string()));

        match self {
            Self::ByMovie(id) => KeyQuery {
                index_name: None,
                partition: movie_id(id),
                sort_prefix: None,
            },
            Self::ByRolePrefix(id, prefix) => KeyQuery {
                index_name: Some(ROLE_INDEX.to_string()),
                partition: movie_id(id),
                sort_prefix: Some(("roleName".to_string(), prefix.clone())),
            },
            Self::ByActorPrefix(id, prefix) => KeyQuery {
                index_name: None,
                partition: movie_id(id),
                sort_prefix: Some(("actorName".to_string(), prefix.clone())),
            },
        }
    }
}

/// Storage operations used by the lambdas and the seed loader.
/// All methods are read-only except `batch_write`.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Point lookup by the full primary key. Returns None if there is no such item.
    async fn get_item(&self, table: &str, key: Item) -> Result<Option<Item>, StoreError>;

    /// Returns all items matching the key condition. An empty Vec is a valid result.
    async fn query(&self, table: &str, query: &KeyQuery) -> Result<Vec<Item>, StoreError>;

    /// Writes up to 25 requests in one call and returns the requests that were not processed.
    async fn batch_write(&self, table: &str, requests: Vec<WriteRequest>) -> Result<Vec<WriteRequest>, StoreError>;
}

/// Looks up a single movie by its ID.
pub async fn fetch_movie<G>(gateway: &G, table: &str, movie_id: i64) -> Result<Option<Movie>, StoreError>
where
    G: StorageGateway + ?Sized,
{
    match gateway.get_item(table, Movie::key(movie_id)).await? {
        Some(item) => Ok(Some(Movie::from_item(&item)?)),
        None => Ok(None),
    }
}

/// Runs exactly one cast query and converts the items into cast rows.
pub async fn fetch_cast<G>(gateway: &G, table: &str, query: &CastQuery) -> Result<Vec<CastMember>, StoreError>
where
    G: StorageGateway + ?Sized,
{
    gateway
        .query(table, &query.key_query())
        .await?
        .iter()
        .map(CastMember::from_item)
        .collect()
}

/// The DynamoDB implementation of the gateway.
/// The SDK client is cheap to clone and safe to share between invocations.
#[derive(Clone, Debug)]
pub struct DynamoGateway {
    client: DynamoDbClient,
}

impl DynamoGateway {
    /// Builds the client for the given region or for the region from the default provider chain.
    pub async fn new(region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_owned()));
        }
        let sdk_config = loader.load().await;
        info!("DynamoDB client region: {:?}", sdk_config.region());

        Self {
            client: DynamoDbClient::new(&sdk_config),
        }
    }
}

#[async_trait]
impl StorageGateway for DynamoGateway {
    async fn get_item(&self, table: &str, key: Item) -> Result<Option<Item>, StoreError> {
        let resp = self
            .client
            .get_item()
            .table_name(table)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| StoreError::Upstream(format!("GetItem on {table} failed: {}", DisplayErrorContext(e))))?;

        Ok(resp.item)
    }

    async fn query(&self, table: &str, query: &KeyQuery) -> Result<Vec<Item>, StoreError> {
        let key_condition = query.key_condition_expression();
        debug!("Query {table} / {:?}: {key_condition}", query.index_name);

        let resp = self
            .client
            .query()
            .table_name(table)
            .set_index_name(query.index_name.clone())
            .key_condition_expression(key_condition)
            .set_expression_attribute_values(Some(query.expression_attribute_values()))
            .send()
            .await
            .map_err(|e| StoreError::Upstream(format!("Query on {table} failed: {}", DisplayErrorContext(e))))?;

        // one round trip only: results over the 1MB page limit are not followed up
        let items = resp.items.unwrap_or_default();
        debug!("Query returned {} items", items.len());
        Ok(items)
    }

    async fn batch_write(&self, table: &str, requests: Vec<WriteRequest>) -> Result<Vec<WriteRequest>, StoreError> {
        let resp = self
            .client
            .batch_write_item()
            .request_items(table, requests)
            .send()
            .await
            .map_err(|e| StoreError::Upstream(format!("BatchWriteItem on {table} failed: {}", DisplayErrorContext(e))))?;

        Ok(resp
            .unprocessed_items
            .and_then(|mut unprocessed| unprocessed.remove(table))
            .unwrap_or_default())
    }
}
