use async_trait::async_trait;
use folio_store_client::StoreClient;

use crate::error::RemoteError;
use crate::traits::{RemoteStore, Row, RowQuery};

/// Translate an SDK query into the REST client's query
pub fn to_store_query(query: &RowQuery) -> folio_store_client::RowQuery {
    let mut store_query = folio_store_client::RowQuery::new();
    for (column, value) in &query.filters {
        store_query = store_query.filter_eq(column.as_str(), value.as_str());
    }
    for column in &query.order {
        store_query = store_query.order_asc(column.as_str());
    }
    store_query
}

#[async_trait]
impl RemoteStore for StoreClient {
    async fn fetch_rows(&self, table: &str, query: &RowQuery) -> Result<Vec<Row>, RemoteError> {
        Ok(self.select(table, &to_store_query(query)).await?)
    }

    async fn upsert_rows(&self, table: &str, rows: Vec<Row>) -> Result<(), RemoteError> {
        Ok(self.upsert(table, &rows).await?)
    }

    async fn delete_rows(&self, table: &str, query: &RowQuery) -> Result<(), RemoteError> {
        Ok(self.delete(table, &to_store_query(query)).await?)
    }

    async fn upload_blob(
        &self,
        bucket: &str,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, RemoteError> {
        Ok(self.upload(bucket, path, data, content_type).await?)
    }
}
