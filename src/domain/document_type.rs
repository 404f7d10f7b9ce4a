use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Family of compliance standard a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    Iso,
    Dpdp,
    Rbi,
    General,
}

static ISO_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\bISO(?:/IEC)?\s*\d{4,5}").unwrap(),
        Regex::new(r"(?i)\binternational\s+standard\b").unwrap(),
    ]
});

static DPDP_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)digital\s+personal\s+data\s+protection").unwrap(),
        Regex::new(r"(?i)\bdata\s+principals?\b").unwrap(),
        Regex::new(r"(?i)\bdata\s+fiduciar(?:y|ies)\b").unwrap(),
        Regex::new(r"(?m)^[ \t]*SEC\.\s*\d+").unwrap(),
        Regex::new(r"\bAct,\s*(?:19|20)\d{2}\b").unwrap(),
        Regex::new(r"(?i)\bgazette\s+of\s+india\b").unwrap(),
    ]
});

static RBI_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\bRBI\b").unwrap(),
        Regex::new(r"(?i)\breserve\s+bank\b").unwrap(),
    ]
});

impl DocumentType {
    /// Classifies a document from its leading text.
    ///
    /// Each family scores one point per distinct marker found. The highest
    /// score wins; ties go to ISO, then DPDP, then RBI. Text without any
    /// marker, including the empty string, is `General`.
    pub fn detect(text: &str) -> Self {
        let candidates = [
            (DocumentType::Iso, &*ISO_MARKERS),
            (DocumentType::Dpdp, &*DPDP_MARKERS),
            (DocumentType::Rbi, &*RBI_MARKERS),
        ];

        let mut best = (DocumentType::General, 0);
        for (document_type, markers) in candidates {
            let score = markers.iter().filter(|m| m.is_match(text)).count();
            if score > best.1 {
                best = (document_type, score);
            }
        }
        best.0
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Iso => "ISO",
            DocumentType::Dpdp => "DPDP",
            DocumentType::Rbi => "RBI",
            DocumentType::General => "GENERAL",
        }
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ISO" => Ok(DocumentType::Iso),
            "DPDP" => Ok(DocumentType::Dpdp),
            "RBI" => Ok(DocumentType::Rbi),
            "GENERAL" => Ok(DocumentType::General),
            _ => Err(format!("Invalid document type: {}", s)),
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
