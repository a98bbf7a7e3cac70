//! [`RemoteStore`](crate::traits::RemoteStore) over the hosted HTTP backend

mod store;

pub use store::to_store_query;
