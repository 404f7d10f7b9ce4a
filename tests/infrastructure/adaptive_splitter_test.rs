use compliance_agent::application::ports::TextSplitter;
use compliance_agent::domain::{Chunk, Document, DocumentId, DocumentType};
use compliance_agent::infrastructure::text_processing::{AdaptiveSplitter, section_label};
use compliance_agent::presentation::config::ChunkingSettings;

fn splitter() -> AdaptiveSplitter {
    AdaptiveSplitter::new(2000, 2500, 200)
}

fn char_slice(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end - start).collect()
}

/// Every chunk's new content starts where the previous chunk ended, and the
/// chunks together cover the whole text.
fn assert_covers(text: &str, chunks: &[Chunk]) {
    assert!(!chunks.is_empty());
    assert_eq!(chunks[0].start, 0);
    assert_eq!(chunks[0].overlap, 0);
    assert_eq!(chunks.last().unwrap().end, text.chars().count());
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.index, i);
        assert_eq!(chunk.text, char_slice(text, chunk.start, chunk.end));
        if i > 0 {
            assert_eq!(chunk.core_start(), chunks[i - 1].end);
        }
    }
}

#[test]
fn given_ten_thousand_chars_without_headings_when_splitting_then_yields_overlapping_chunks() {
    let text = "abcd ".repeat(2000);

    let chunks = splitter().split_text(&text, DocumentType::General);

    assert_eq!(chunks.len(), 4);
    assert_eq!((chunks[0].start, chunks[0].end), (0, 2500));
    assert_eq!(chunks[1].start, 2300);
    assert_eq!(chunks[1].overlap, 200);
    assert!(chunks.iter().all(|c| c.len() <= 2700));
    assert_covers(&text, &chunks);
}

#[test]
fn given_ten_thousand_chars_of_prose_when_splitting_then_yields_four_chunks() {
    let text: String = "The entity shall keep records. "
        .repeat(400)
        .chars()
        .take(10_000)
        .collect();

    let chunks = splitter().split_text(&text, DocumentType::General);

    let ends: Vec<usize> = chunks.iter().map(|c| c.end).collect();
    assert_eq!(ends, vec![2497, 4995, 7493, 10_000]);
    assert!(chunks[1..].iter().all(|c| c.overlap == 200));
    assert_covers(&text, &chunks);
}

#[test]
fn given_remainder_beyond_overlap_tolerance_when_splitting_then_starts_new_chunk() {
    let text = "abcd ".repeat(600);

    let chunks = splitter().split_text(&text, DocumentType::General);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].end, 2500);
    assert_covers(&text, &chunks);
}

#[test]
fn given_default_settings_when_splitting_then_max_size_follows_document_type() {
    let splitter = AdaptiveSplitter::from_settings(&ChunkingSettings::default());
    let text = "word ".repeat(2000);

    assert_eq!(splitter.max_chunk_size(DocumentType::Iso), 2500);
    assert_eq!(splitter.max_chunk_size(DocumentType::Dpdp), 2000);
    assert_eq!(splitter.max_chunk_size(DocumentType::Rbi), 2200);
    assert_eq!(splitter.max_chunk_size(DocumentType::General), 2000);

    let iso = splitter.split_text(&text, DocumentType::Iso);
    let rbi = splitter.split_text(&text, DocumentType::Rbi);
    let dpdp = splitter.split_text(&text, DocumentType::Dpdp);

    assert_eq!(iso[0].end, 2500);
    assert_eq!(rbi[0].end, 2200);
    assert_eq!(dpdp[0].end, 2000);
    for chunks in [&iso, &rbi, &dpdp] {
        assert_covers(&text, chunks);
    }
}

#[test]
fn given_sizes_for_one_type_when_splitting_other_type_then_keeps_base_window() {
    let splitter = AdaptiveSplitter::new(2000, 2500, 200).with_sizes(DocumentType::Rbi, 800, 1000);
    let text = "word ".repeat(600);

    assert_eq!(splitter.split_text(&text, DocumentType::Rbi)[0].end, 1000);
    assert_eq!(splitter.split_text(&text, DocumentType::Iso).len(), 2);
}

#[test]
fn given_iso_heading_inside_window_when_splitting_then_cuts_before_heading() {
    let text = format!(
        "1. Introduction\n{}\n2. Requirements\n{}",
        "word ".repeat(420),
        "word ".repeat(200)
    );

    let chunks = splitter().split_text(&text, DocumentType::Iso);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].end, 2117);
    assert_eq!(chunks[0].section_label.as_deref(), Some("1. Introduction"));
    assert_eq!(chunks[1].section_label.as_deref(), Some("2. Requirements"));
    assert_eq!(chunks[1].article_number(), "2");
    assert_covers(&text, &chunks);
}

#[test]
fn given_text_shorter_than_max_when_splitting_then_returns_single_chunk() {
    let text = "SEC. 4. A person may process personal data only for a lawful purpose.";

    let chunks = splitter().split_text(text, DocumentType::Dpdp);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, text);
    assert_eq!(chunks[0].label(), text);
}

#[test]
fn given_empty_text_when_splitting_then_returns_no_chunks() {
    assert!(splitter().split_text("", DocumentType::General).is_empty());
}

#[test]
fn given_text_without_whitespace_when_splitting_then_cuts_at_max_size() {
    let text = "é".repeat(3000);

    let chunks = splitter().split_text(&text, DocumentType::General);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].end, 2500);
    assert_eq!(chunks[1].start, 2300);
    assert_eq!(chunks[1].text.chars().count(), 700);
    assert_covers(&text, &chunks);
}

#[test]
fn given_paragraph_breaks_when_splitting_then_prefers_blank_line_over_whitespace() {
    let paragraph = "The entity shall keep records. ".repeat(70);
    let text = format!("{paragraph}\n\n{paragraph}");

    let chunks = splitter().split_text(&text, DocumentType::General);

    let first_paragraph_len = paragraph.chars().count() + 2;
    assert_eq!(chunks[0].end, first_paragraph_len);
    assert_covers(&text, &chunks);
}

#[test]
fn given_mixed_document_when_splitting_then_chunks_cover_text() {
    let mut text = String::new();
    for section in 1..=12 {
        text.push_str(&format!("{section}. Section {section}\n"));
        text.push_str(&"The bank shall report incidents within six hours. ".repeat(12));
        text.push('\n');
    }

    let chunks = splitter().split_text(&text, DocumentType::Rbi);

    assert!(chunks.len() > 1);
    assert_covers(&text, &chunks);
}

#[test]
fn given_document_when_splitting_through_port_then_uses_document_type() {
    let text = "word ".repeat(1000);
    let document = Document::new(
        DocumentId::new(),
        "doc".to_string(),
        text.clone(),
        DocumentType::General,
    );

    let chunks = splitter().split(&document);

    assert_eq!(chunks, splitter().split_text(&text, DocumentType::General));
}

#[test]
fn given_plain_paragraph_when_labelling_then_returns_none() {
    assert_eq!(section_label("The organization shall comply."), None);
}

#[test]
fn given_annex_heading_when_labelling_then_returns_first_line() {
    assert_eq!(
        section_label("\n  Annex A (normative)\nReference control objectives").as_deref(),
        Some("Annex A (normative)")
    );
}
