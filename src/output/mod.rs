//! Output module
//!
//! Streams entities to clients as a single JSON array.
//!
//! # Overview
//!
//! This module provides:
//! - `JsonArrayEncoder` - incremental JSON array chunks from an entity stream
//! - `write_json_array` - drains an encoder into any async writer

mod json_array;

pub use json_array::{encode_json_array, JsonArrayEncoder};

use crate::error::Result;
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Encode `items` as a JSON array into `writer`, chunk by chunk
///
/// Returns the number of elements written.
pub async fn write_json_array<S, T, W>(items: S, writer: &mut W) -> Result<usize>
where
    S: Stream<Item = Result<T>> + Unpin,
    T: Serialize,
    W: AsyncWrite + Unpin,
{
    let mut encoder = encode_json_array(items);
    while let Some(chunk) = encoder.next().await {
        writer.write_all(&chunk?).await?;
    }
    writer.flush().await?;
    Ok(encoder.written())
}
