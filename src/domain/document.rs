use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use super::DocumentType;

const DEFAULT_DOCUMENT_NAME: &str = "Compliance Document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

/// An uploaded file before text extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub id: DocumentId,
    pub filename: String,
    pub content_type: ContentType,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Pdf,
    Text,
}

impl ContentType {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(Self::Pdf),
            m if m.starts_with("text/plain") => Some(Self::Text),
            _ => None,
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = filename.rsplit_once('.')?.1.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "text" | "md" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Text => "text/plain",
        }
    }
}

impl Upload {
    pub fn new(filename: String, content_type: ContentType, size_bytes: u64) -> Self {
        Self {
            id: DocumentId::new(),
            filename,
            content_type,
            size_bytes,
        }
    }
}

/// Extracted document text together with its classification.
///
/// Built once per analysis and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub text: String,
    pub document_type: DocumentType,
    char_count: usize,
}

impl Document {
    pub fn new(id: DocumentId, name: String, text: String, document_type: DocumentType) -> Self {
        let char_count = text.chars().count();
        Self {
            id,
            name,
            text,
            document_type,
            char_count,
        }
    }

    /// Classifies `text` and infers the document title from its first
    /// `sample_chars` characters.
    pub fn classify(
        id: DocumentId,
        fallback_name: &str,
        text: String,
        sample_chars: usize,
    ) -> Self {
        let sample = leading_sample(&text, sample_chars);
        let document_type = DocumentType::detect(sample);
        let name = infer_document_name(sample).unwrap_or_else(|| {
            let trimmed = fallback_name.trim();
            if trimmed.is_empty() {
                DEFAULT_DOCUMENT_NAME.to_string()
            } else {
                trimmed.to_string()
            }
        });

        Self::new(id, name, text, document_type)
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.char_count
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

fn leading_sample(text: &str, sample_chars: usize) -> &str {
    match text.char_indices().nth(sample_chars) {
        Some((byte_offset, _)) => &text[..byte_offset],
        None => text,
    }
}

static TITLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(
            r#"(?i)(?:Act|Bill|Standard|Regulation)(?:\s+(?:called|known|as|of))?\s*["']?([^"'\n]{10,80})(?:["']|\.)"#,
        )
        .unwrap(),
        Regex::new(r"(?i)THE\s+([A-Z][^,\n]{10,80})(?:\s+ACT|\s+BILL)").unwrap(),
        Regex::new(r"(?i)INTERNATIONAL\s+STANDARD\s+([^,\n]{10,80})").unwrap(),
        Regex::new(r#"(?i)(\b[A-Z][A-Z\s]+(?:ACT|BILL|STANDARD|REGULATION)['"]?\s*[^,\n]{0,50})"#)
            .unwrap(),
    ]
});

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Best-effort title of a compliance document, e.g. the name of an Act.
pub fn infer_document_name(sample: &str) -> Option<String> {
    TITLE_PATTERNS.iter().find_map(|pattern| {
        let captured = pattern.captures(sample)?.get(1)?.as_str().trim();
        let name = WHITESPACE_RUN.replace_all(captured, " ").into_owned();
        let len = name.chars().count();
        (len > 10 && len < 100).then_some(name)
    })
}
