//! # Semantic Search Module
//!
//! Filtered similarity search over the place index. A query is embedded
//! with the same provider the crawler used, then handed to the store with a
//! conjunctive `SearchFilter`.
//!
//! ## Search Process
//!
//! 1. Convert the query text to an embedding vector
//! 2. Restrict the collection to records satisfying every filter predicate
//! 3. Rank the remainder by cosine similarity and keep the top `limit`
//!
//! Lightweight records are embedded from their title only, so a short query
//! naming a place tends to rank its candidate record above a fully crawled
//! page about it.

mod error;
mod search_impl;

pub use error::SearchError;
pub use search_impl::{DEFAULT_LIMIT, SearchSystem, render_hit};

pub use crate::index::{SearchFilter, SearchHit};
