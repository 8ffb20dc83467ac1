//! # Database Schema Module
//!
//! Tables for the local libsql backend.
//!
//! ## Schema Design
//!
//! 1. `collections` - one row per named collection with its vector dimension
//! 2. `pages` - one row per point, keyed by `(collection, id)`, with every
//!    filterable payload field in its own indexed column, the embedding as a
//!    little-endian f32 blob and the full payload as JSON
//! 3. `page_features` - feature tag membership, one row per tag

use crate::index::error::StoreError;
use libsql::{Connection, params};

/// Initialize the database schema
pub async fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS collections (
            name TEXT PRIMARY KEY,
            dimension INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create collections table: {}", e)))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS pages (
            collection TEXT NOT NULL,
            id INTEGER NOT NULL,
            url TEXT NOT NULL,
            title TEXT NOT NULL,
            kind TEXT NOT NULL,
            location_type TEXT NOT NULL,
            attraction_category TEXT NOT NULL,
            county TEXT,
            region TEXT,
            tourism_related INTEGER NOT NULL DEFAULT 0,
            price_range TEXT,
            opening_hours TEXT,
            embedding BLOB NOT NULL,
            payload TEXT NOT NULL,
            last_updated TEXT NOT NULL,
            PRIMARY KEY (collection, id),
            FOREIGN KEY (collection) REFERENCES collections(name) ON DELETE CASCADE
        )",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create pages table: {}", e)))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS page_features (
            collection TEXT NOT NULL,
            page_id INTEGER NOT NULL,
            feature TEXT NOT NULL,
            PRIMARY KEY (collection, page_id, feature)
        )",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create page_features table: {}", e)))?;

    for column in [
        "kind",
        "location_type",
        "attraction_category",
        "county",
        "region",
        "tourism_related",
    ] {
        conn.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS idx_pages_{column} ON pages(collection, {column})"
            ),
            params![],
        )
        .await
        .map_err(|e| StoreError::Schema(format!("Failed to create index on {}: {}", column, e)))?;
    }

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_page_features_feature ON page_features(collection, feature)",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create index on page_features: {}", e)))?;

    Ok(())
}
