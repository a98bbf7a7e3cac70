//! Remote store contract

use async_trait::async_trait;

use crate::error::RemoteError;

/// A table row as the remote store returns it
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Equality filters and ordering for a table call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowQuery {
    /// `(column, value)` pairs, AND logic
    pub filters: Vec<(String, String)>,
    /// Ascending order columns, applied in sequence
    pub order: Vec<String>,
}

impl RowQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter_eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order.push(column.into());
        self
    }

    /// True when `row` satisfies every filter (string or numeric match)
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|(column, value)| {
            row.get(column).and_then(value_as_string).as_deref() == Some(value.as_str())
        })
    }
}

/// Render a scalar JSON value the way ids and foreign keys compare
pub fn value_as_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Hosted relational tables + blob storage, reached by request/response
///
/// Every call is a single attempt. Implementations must not retry internally
/// and must not block indefinitely.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Rows of `table` matching `query`, in the store's order
    async fn fetch_rows(&self, table: &str, query: &RowQuery) -> Result<Vec<Row>, RemoteError>;

    /// Insert or update rows by primary key
    async fn upsert_rows(&self, table: &str, rows: Vec<Row>) -> Result<(), RemoteError>;

    /// Delete rows matching `query`
    async fn delete_rows(&self, table: &str, query: &RowQuery) -> Result<(), RemoteError>;

    /// Store a file and return its public URL
    async fn upload_blob(
        &self,
        bucket: &str,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, RemoteError>;

    /// Replace every child row of one owner: delete all, then insert `rows`
    ///
    /// The delete always runs first, so a failed insert leaves the owner with
    /// no children rather than a mix of old and new.
    async fn replace_children(
        &self,
        table: &str,
        foreign_key: &str,
        owner_id: &str,
        rows: Vec<Row>,
    ) -> Result<(), RemoteError> {
        self.delete_rows(table, &RowQuery::new().filter_eq(foreign_key, owner_id))
            .await?;
        if rows.is_empty() {
            return Ok(());
        }
        self.upsert_rows(table, rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_matches_string_and_numeric_values() {
        let row: Row = serde_json::from_value(json!({"id": 3, "profile_id": "p1"})).unwrap();

        assert!(RowQuery::new().filter_eq("profile_id", "p1").matches(&row));
        assert!(RowQuery::new().filter_eq("id", "3").matches(&row));
        assert!(!RowQuery::new().filter_eq("id", "4").matches(&row));
        assert!(!RowQuery::new().filter_eq("missing", "x").matches(&row));
        assert!(RowQuery::new().matches(&row));
    }
}
