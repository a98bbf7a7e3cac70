//! Core traits
//!
//! The remote store is an external collaborator; the SDK only depends on the
//! contract defined here.

mod remote;

pub use remote::{value_as_string, RemoteStore, Row, RowQuery};
