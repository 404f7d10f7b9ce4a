use crate::domain::{Chunk, Document};

/// Splits a classified document into ordered chunks. Total: empty text
/// yields no chunks, anything else at least one.
pub trait TextSplitter: Send + Sync {
    fn split(&self, document: &Document) -> Vec<Chunk>;
}
