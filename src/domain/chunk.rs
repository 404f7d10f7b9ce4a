use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static LEADING_SECTION_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+(?:\.[0-9]+)*)").unwrap());

/// A bounded slice of document text processed as one unit.
///
/// `start` and `end` are character offsets into the document. The first
/// `overlap` characters repeat the tail of the previous chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub overlap: usize,
    pub text: String,
    pub section_label: Option<String>,
}

impl Chunk {
    pub fn new(
        index: usize,
        start: usize,
        end: usize,
        overlap: usize,
        text: String,
        section_label: Option<String>,
    ) -> Self {
        Self {
            index,
            start,
            end,
            overlap,
            text,
            section_label,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Offset where the content that is new to this chunk begins.
    pub fn core_start(&self) -> usize {
        self.start + self.overlap
    }

    pub fn label(&self) -> String {
        self.section_label
            .clone()
            .unwrap_or_else(|| format!("section_{}", self.index + 1))
    }

    /// Section number cited by requirements found in this chunk:
    /// `"6.1.2 Determining risks"` yields `"6.1.2"`.
    pub fn article_number(&self) -> String {
        let label = self.label();
        LEADING_SECTION_NUMBER
            .captures(&label)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or(label)
    }
}
