//! Resolution of block id sequences to text.

use super::index::BlockIndex;

/// Joins the text of referenced blocks in reference order.
#[derive(Debug, Clone, Copy)]
pub struct TextResolver<'i, 'a> {
    index: &'i BlockIndex<'a>,
}

impl<'i, 'a> TextResolver<'i, 'a> {
    pub fn new(index: &'i BlockIndex<'a>) -> Self {
        Self { index }
    }

    /// Resolves `ids` to their texts joined by a single space.
    ///
    /// Ids that are dangling or point at textless blocks are skipped entirely,
    /// so they never introduce an extra separator.
    pub fn resolve<I, S>(&self, ids: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parts: Vec<&'a str> = Vec::new();
        for id in ids {
            match self.index.get(id.as_ref()) {
                Some(block) => {
                    if let Some(text) = block.text.as_deref() {
                        parts.push(text);
                    }
                }
                None => tracing::trace!(id = id.as_ref(), "dangling block reference"),
            }
        }
        parts.join(" ")
    }
}
