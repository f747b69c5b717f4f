//! Incremental NDJSON decoding
//!
//! Byte chunks from the backend do not line up with JSON objects: one chunk may hold
//! several lines, and a line may be split anywhere, including inside a multi-byte
//! character. The decoder keeps the unterminated tail between calls.
//!
//! ```text
//! {"message":{"thinking":"Let"},"done":false}\n{"message":{"thi
//! nking":" me think"},"done":false}\n
//! ```

use std::marker::PhantomData;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;

use super::json::parse_or_skip;

pub struct NdjsonDecoder<T> {
    carry: BytesMut,
    _item: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> NdjsonDecoder<T> {
    pub fn new() -> Self {
        Self {
            carry: BytesMut::new(),
            _item: PhantomData,
        }
    }

    /// Feed one chunk and decode every line it completes, in order
    pub fn push(&mut self, chunk: &[u8]) -> Vec<T> {
        let searched = self.carry.len();
        self.carry.extend_from_slice(chunk);

        let mut items = Vec::new();
        let mut from = searched;
        while let Some(offset) = self.carry[from..].iter().position(|b| *b == b'\n') {
            let end = from + offset;
            let line = self.carry.split_to(end + 1);
            if let Some(item) = parse_or_skip(&line[..end]) {
                items.push(item);
            }
            from = 0;
        }
        items
    }

    /// Decode whatever is left once the byte stream has ended
    pub fn finish(&mut self) -> Option<T> {
        if self.carry.is_empty() {
            return None;
        }
        let rest = self.carry.split();
        parse_or_skip(&rest)
    }
}

impl<T: DeserializeOwned> Default for NdjsonDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a fallible byte stream into a stream of values.
///
/// A transport error is yielded as an item and ends the stream.
pub fn decode_stream<T, E, S>(bytes: S) -> impl Stream<Item = Result<T, E>> + Send
where
    T: DeserializeOwned + Send + 'static,
    E: Send + 'static,
    S: Stream<Item = Result<Bytes, E>> + Send,
{
    async_stream::stream! {
        let mut decoder = NdjsonDecoder::<T>::new();
        let mut bytes = std::pin::pin!(bytes);

        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    for item in decoder.push(&chunk) {
                        yield Ok(item);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        if let Some(item) = decoder.finish() {
            yield Ok(item);
        }
    }
}
