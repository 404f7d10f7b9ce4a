use std::sync::LazyLock;

use regex::Regex;

use crate::domain::DocumentType;

/// Where a split lands relative to the matched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cut {
    /// The match opens the next chunk (section headings).
    Before,
    /// The match closes the current chunk (blank lines, line breaks).
    After,
}

pub struct Boundary {
    pub pattern: Regex,
    pub cut: Cut,
}

fn heading(pattern: &str) -> Boundary {
    Boundary {
        pattern: Regex::new(&format!(r"(?m)^[ \t]*{pattern}")).unwrap(),
        cut: Cut::Before,
    }
}

fn separator(pattern: &str) -> Boundary {
    Boundary {
        pattern: Regex::new(pattern).unwrap(),
        cut: Cut::After,
    }
}

fn with_fallbacks(mut boundaries: Vec<Boundary>) -> Vec<Boundary> {
    boundaries.push(separator(r"\n[ \t]*\n"));
    boundaries.push(separator(r"\n"));
    boundaries
}

static ISO: LazyLock<Vec<Boundary>> = LazyLock::new(|| {
    with_fallbacks(vec![
        heading(r"\d+\.\d+\.\d+[ \t]"),
        heading(r"\d+\.\d+[ \t]"),
        heading(r"\d+\.[ \t]"),
        heading(r"Annex\b"),
        heading(r"Bibliography\b"),
        heading(r"Normative references\b"),
        heading(r"#{1,2}[ \t]"),
    ])
});

static DPDP: LazyLock<Vec<Boundary>> = LazyLock::new(|| {
    with_fallbacks(vec![
        heading(r"SEC\.[ \t]"),
        heading(r"Section[ \t]"),
        heading(r"(?:CHAPTER|Chapter)[ \t]"),
        heading(r"\d+\.[ \t]*\(\d+\)[ \t]"),
        heading(r"\d+\.[ \t]"),
        heading(r"Annex\b"),
        heading(r"Bibliography\b"),
        heading(r"Appendix\b"),
    ])
});

static RBI: LazyLock<Vec<Boundary>> = LazyLock::new(|| {
    with_fallbacks(vec![
        heading(r"\d+\.[ \t]"),
        heading(r"\d+\.\d+[ \t]"),
        heading(r"Chapter[ \t]"),
        heading(r"Annexure\b"),
        heading(r"Regulation[ \t]"),
        heading(r"Guideline[ \t]"),
    ])
});

static GENERAL: LazyLock<Vec<Boundary>> = LazyLock::new(|| {
    with_fallbacks(vec![
        heading(r"\d+\.[ \t]"),
        heading(r"\d+\.\d+[ \t]"),
        heading(r"Chapter[ \t]"),
        heading(r"Section[ \t]"),
        heading(r"Article[ \t]"),
        heading(r"Clause[ \t]"),
        heading(r"ANNEX\b"),
        heading(r"Appendix\b"),
    ])
});

/// Split boundaries for a document type, highest priority first.
pub fn boundaries_for(document_type: DocumentType) -> &'static [Boundary] {
    match document_type {
        DocumentType::Iso => ISO.as_slice(),
        DocumentType::Dpdp => DPDP.as_slice(),
        DocumentType::Rbi => RBI.as_slice(),
        DocumentType::General => GENERAL.as_slice(),
    }
}

static SECTION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\d+(?:\.\d+)*\.?(?:\s|$)|(?i:annex|annexure|appendix|section|chapter|article|clause|regulation|guideline)\b|(?i:sec)\.)",
    )
    .unwrap()
});

const MAX_LABEL_CHARS: usize = 80;

/// Section label for text that opens with a recognised heading.
pub fn section_label(core_text: &str) -> Option<String> {
    let first_line = core_text.lines().map(str::trim).find(|l| !l.is_empty())?;
    if !SECTION_HEADING.is_match(first_line) {
        return None;
    }
    Some(first_line.chars().take(MAX_LABEL_CHARS).collect())
}
