use crate::application::ports::TextSplitter;
use crate::domain::{Chunk, Document, DocumentType};
use crate::presentation::config::ChunkingSettings;

use super::boundary_patterns::{Boundary, Cut, boundaries_for, section_label};

/// Splits documents on type-specific section boundaries.
///
/// Each document type has its own size window. The text is cut into core
/// segments of at most `max` characters. A segment ends at the last match of
/// the highest-priority boundary found between `min` and `max`; without one
/// it ends after the last whitespace before the limit, and without
/// whitespace exactly at the limit. A remainder of at most `max + overlap`
/// characters is kept as the last segment rather than split off as a sliver.
/// Each chunk after the first is prefixed with `overlap` characters from the
/// end of the previous segment.
pub struct AdaptiveSplitter {
    iso: SizeWindow,
    dpdp: SizeWindow,
    rbi: SizeWindow,
    general: SizeWindow,
    overlap: usize,
}

#[derive(Debug, Clone, Copy)]
struct SizeWindow {
    min: usize,
    max: usize,
}

impl SizeWindow {
    fn new(min: usize, max: usize) -> Self {
        let max = max.max(1);
        Self {
            min: min.min(max),
            max,
        }
    }
}

impl AdaptiveSplitter {
    /// Uses the same size window for every document type.
    pub fn new(min_chunk_size: usize, max_chunk_size: usize, overlap: usize) -> Self {
        let window = SizeWindow::new(min_chunk_size, max_chunk_size);
        Self {
            iso: window,
            dpdp: window,
            rbi: window,
            general: window,
            overlap,
        }
    }

    pub fn with_sizes(
        mut self,
        document_type: DocumentType,
        min_chunk_size: usize,
        max_chunk_size: usize,
    ) -> Self {
        let window = SizeWindow::new(min_chunk_size, max_chunk_size);
        match document_type {
            DocumentType::Iso => self.iso = window,
            DocumentType::Dpdp => self.dpdp = window,
            DocumentType::Rbi => self.rbi = window,
            DocumentType::General => self.general = window,
        }
        self
    }

    pub fn from_settings(settings: &ChunkingSettings) -> Self {
        let base = Self::new(
            settings.general.min,
            settings.general.max,
            settings.overlap,
        );
        [DocumentType::Iso, DocumentType::Dpdp, DocumentType::Rbi]
            .into_iter()
            .fold(base, |splitter, document_type| {
                let sizes = settings.sizes_for(document_type);
                splitter.with_sizes(document_type, sizes.min, sizes.max)
            })
    }

    /// Maximum core segment size used for `document_type`.
    pub fn max_chunk_size(&self, document_type: DocumentType) -> usize {
        self.window(document_type).max
    }

    fn window(&self, document_type: DocumentType) -> SizeWindow {
        match document_type {
            DocumentType::Iso => self.iso,
            DocumentType::Dpdp => self.dpdp,
            DocumentType::Rbi => self.rbi,
            DocumentType::General => self.general,
        }
    }

    pub fn split_text(&self, text: &str, document_type: DocumentType) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        let offsets = CharOffsets::new(text);
        let boundaries = boundaries_for(document_type);
        let window = self.window(document_type);
        let overlap = self.overlap.min(window.max - 1);

        let mut segments = Vec::new();
        let mut pos = 0;
        while pos < offsets.char_len() {
            let end = if offsets.char_len() - pos <= window.max + overlap {
                offsets.char_len()
            } else {
                find_cut(text, &offsets, pos, window, boundaries)
            };
            segments.push((pos, end));
            pos = end;
        }

        let mut chunks = Vec::with_capacity(segments.len());
        let mut previous_core_start = 0;
        for (index, &(core_start, end)) in segments.iter().enumerate() {
            let overlap = if index == 0 {
                0
            } else {
                overlap.min(core_start - previous_core_start)
            };
            let start = core_start - overlap;

            let chunk_text = offsets.slice(text, start, end).to_string();
            let label = section_label(offsets.slice(text, core_start, end));

            chunks.push(Chunk::new(index, start, end, overlap, chunk_text, label));
            previous_core_start = core_start;
        }

        tracing::debug!(
            document_type = %document_type,
            chunk_count = chunks.len(),
            char_count = offsets.char_len(),
            max_chunk_size = window.max,
            "Document split into chunks"
        );

        chunks
    }
}

fn find_cut(
    text: &str,
    offsets: &CharOffsets,
    pos: usize,
    window: SizeWindow,
    boundaries: &[Boundary],
) -> usize {
    let limit = pos + window.max;
    let window_floor = pos + window.min;
    let base = offsets.byte(pos);
    let haystack = offsets.slice(text, pos, limit);

    for boundary in boundaries {
        let best = boundary
            .pattern
            .find_iter(haystack)
            .map(|m| match boundary.cut {
                Cut::Before => offsets.char_at(base + m.start()),
                Cut::After => offsets.char_at(base + m.end()),
            })
            .filter(|&cut| cut > window_floor && cut <= limit)
            .last();
        if let Some(cut) = best {
            return cut;
        }
    }

    haystack
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(byte, _)| offsets.char_at(base + byte) + 1)
        .filter(|&cut| cut > pos)
        .unwrap_or(limit)
}

impl TextSplitter for AdaptiveSplitter {
    fn split(&self, document: &Document) -> Vec<Chunk> {
        self.split_text(&document.text, document.document_type)
    }
}

/// Byte offset of every character boundary, so sizes are counted in
/// characters while slicing stays on valid UTF-8 boundaries.
struct CharOffsets(Vec<usize>);

impl CharOffsets {
    fn new(text: &str) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());
        Self(offsets)
    }

    fn char_len(&self) -> usize {
        self.0.len() - 1
    }

    fn byte(&self, char_index: usize) -> usize {
        self.0[char_index]
    }

    fn char_at(&self, byte: usize) -> usize {
        self.0.binary_search(&byte).unwrap_or_else(|i| i)
    }

    fn slice<'a>(&self, text: &'a str, start: usize, end: usize) -> &'a str {
        &text[self.byte(start)..self.byte(end)]
    }
}
