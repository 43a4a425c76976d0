//! Document chunking with page and position tracking.
//!
//! Splits extracted text into bounded, overlapping segments ready for
//! embedding. Short certificates and similar "important" documents get a
//! low-fragmentation strategy that keeps their context together; everything
//! else is accumulated sentence by sentence.

use serde::{Deserialize, Serialize};

use crate::extract::PageSpan;

/// Filename keywords that mark a document as important enough to chunk
/// conservatively (certificates, IDs and the like).
const IMPORTANT_KEYWORDS: [&str; 7] = [
    "certificate",
    "caste",
    "validity",
    "official",
    "school",
    "leaving",
    "id",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    pub filename: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_important_document: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_position: Option<usize>,
}

/// One chunk of a source document. Immutable once produced; chunk ids are
/// deterministic (`{filename}-chunk-{index}` or `{filename}-full-document`),
/// so re-ingesting a file overwrites its previous vectors in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
}

pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Split `text` into chunks, resolving each chunk's page via `pages`.
    ///
    /// Returns an empty vec for empty or whitespace-only input; the caller
    /// treats that as "no content to index", not a crash.
    pub fn chunk(&self, text: &str, filename: &str, pages: &[PageSpan]) -> Vec<DocumentChunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut chunks = if is_important_document(filename) {
            self.chunk_important(text, filename, pages)
        } else {
            self.chunk_standard(text, filename, pages)
        };

        // total_chunks is only known once the full list exists.
        let total = chunks.len();
        for chunk in &mut chunks {
            chunk.metadata.total_chunks = total;
        }
        chunks
    }

    /// Important documents: one chunk when the whole text fits, otherwise a
    /// sliding window with enlarged overlap so context survives the splits.
    fn chunk_important(&self, text: &str, filename: &str, pages: &[PageSpan]) -> Vec<DocumentChunk> {
        let chars: Vec<char> = text.chars().collect();
        let text_len = chars.len();

        if text_len <= self.chunk_size {
            return vec![DocumentChunk {
                id: format!("{filename}-full-document"),
                text: text.to_string(),
                metadata: ChunkMetadata {
                    filename: filename.to_string(),
                    chunk_index: 0,
                    total_chunks: 1,
                    is_important_document: Some(true),
                    page_number: Some(page_for_position(pages, 0)),
                    start_position: Some(0),
                    end_position: Some(text_len),
                },
            }];
        }

        let enhanced_size = self.chunk_size.min(text_len.div_ceil(2));
        let enhanced_overlap = (self.chunk_overlap * 2).min(enhanced_size / 2);
        let step = (enhanced_size - enhanced_overlap).max(1);

        let mut chunks = Vec::new();
        let mut start = 0usize;
        while start < text_len {
            let end = (start + enhanced_size).min(text_len);
            let chunk_text: String = chars[start..end].iter().collect();
            chunks.push(DocumentChunk {
                id: format!("{filename}-chunk-{}", chunks.len()),
                text: chunk_text,
                metadata: ChunkMetadata {
                    filename: filename.to_string(),
                    chunk_index: chunks.len(),
                    total_chunks: 0,
                    is_important_document: Some(true),
                    page_number: Some(page_for_position(pages, start)),
                    start_position: Some(start),
                    end_position: Some(end),
                },
            });
            start += step;
        }
        chunks
    }

    /// Standard documents: split on sentence boundaries and greedily pack
    /// sentences up to the configured size. A single sentence longer than the
    /// chunk size passes through uncapped.
    fn chunk_standard(&self, text: &str, filename: &str, pages: &[PageSpan]) -> Vec<DocumentChunk> {
        let sentences = text
            .split(|c| matches!(c, '.' | '!' | '?'))
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let mut chunks: Vec<DocumentChunk> = Vec::new();
        let mut current = String::new();
        let mut chunk_start = 0usize;

        let flush = |current: &mut String, chunk_start: &mut usize, chunks: &mut Vec<DocumentChunk>| {
            if current.is_empty() {
                return;
            }
            let len = current.chars().count();
            let end = *chunk_start + len;
            chunks.push(DocumentChunk {
                id: format!("{filename}-chunk-{}", chunks.len()),
                text: std::mem::take(current),
                metadata: ChunkMetadata {
                    filename: filename.to_string(),
                    chunk_index: chunks.len(),
                    total_chunks: 0,
                    is_important_document: None,
                    page_number: Some(page_for_position(pages, *chunk_start)),
                    start_position: Some(*chunk_start),
                    end_position: Some(end),
                },
            });
            *chunk_start = end;
        };

        for sentence in sentences {
            let candidate_len = if current.is_empty() {
                sentence.chars().count()
            } else {
                current.chars().count() + 2 + sentence.chars().count()
            };

            if candidate_len <= self.chunk_size {
                if !current.is_empty() {
                    current.push_str(". ");
                }
                current.push_str(sentence);
            } else {
                flush(&mut current, &mut chunk_start, &mut chunks);
                current.push_str(sentence);
            }
        }
        flush(&mut current, &mut chunk_start, &mut chunks);

        chunks
    }
}

fn is_important_document(filename: &str) -> bool {
    let lowered = filename.to_lowercase();
    IMPORTANT_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

/// Resolve the page a character offset falls on. Defaults to page 1 when no
/// page map is available.
fn page_for_position(pages: &[PageSpan], position: usize) -> u32 {
    if pages.is_empty() {
        return 1;
    }
    for page in pages {
        if position >= page.start_position && position <= page.end_position {
            return page.page_number;
        }
    }
    pages[0].page_number
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker() -> Chunker {
        Chunker::new(1000, 200)
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunker().chunk("", "notes.txt", &[]).is_empty());
        assert!(chunker().chunk("   \n\t ", "notes.txt", &[]).is_empty());
    }

    #[test]
    fn short_important_document_is_a_single_chunk() {
        let text = "Certificate of Achievement. Awarded to Jane Doe on 2024-01-01.";
        let chunks = chunker().chunk(text, "achievement_certificate.pdf", &[]);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "achievement_certificate.pdf-full-document");
        assert_eq!(chunks[0].text, text);
        assert_eq!(chunks[0].metadata.total_chunks, 1);
        assert_eq!(chunks[0].metadata.is_important_document, Some(true));
        assert_eq!(chunks[0].metadata.page_number, Some(1));
    }

    #[test]
    fn long_important_document_uses_enhanced_overlap_window() {
        let text = "x".repeat(1500);
        let chunks = chunker().chunk(&text, "caste_certificate.pdf", &[]);

        // enhanced size 750, overlap min(400, 375) = 375, step 375
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 750);
            assert_eq!(chunk.metadata.is_important_document, Some(true));
        }
        // windows cover the whole text
        assert_eq!(chunks[0].metadata.start_position, Some(0));
        assert_eq!(chunks.last().unwrap().metadata.end_position, Some(1500));
    }

    #[test]
    fn standard_chunks_accumulate_sentences() {
        let sentence = "This is a simple sentence that fills some space";
        let text = format!("{}. ", sentence).repeat(60);
        let chunks = chunker().chunk(&text, "report.txt", &[]);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 1000);
        }
    }

    #[test]
    fn oversized_sentence_passes_through_uncapped() {
        let long_sentence = "word ".repeat(400);
        let text = format!("Short one. {}. Another short one.", long_sentence.trim());
        let chunks = chunker().chunk(&text, "report.txt", &[]);

        assert!(chunks.iter().any(|c| c.text.chars().count() > 1000));
    }

    #[test]
    fn total_chunks_and_indices_are_consistent() {
        let text = "A sentence goes here. ".repeat(200);
        let chunks = chunker().chunk(&text, "report.txt", &[]);

        let total = chunks.len();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.chunk_index, i);
            assert_eq!(chunk.metadata.total_chunks, total);
            assert_eq!(chunk.id, format!("report.txt-chunk-{i}"));
        }
    }

    #[test]
    fn chunk_ids_are_deterministic_across_runs() {
        let text = "A sentence goes here. ".repeat(200);
        let first: Vec<String> = chunker()
            .chunk(&text, "report.txt", &[])
            .into_iter()
            .map(|c| c.id)
            .collect();
        let second: Vec<String> = chunker()
            .chunk(&text, "report.txt", &[])
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn every_sentence_survives_chunking() {
        let sentences: Vec<String> = (0..120)
            .map(|i| format!("Sentence number {i} carries its own payload"))
            .collect();
        let text = sentences.join(". ");
        let chunks = chunker().chunk(&text, "coverage.txt", &[]);

        let combined: String = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
        for sentence in &sentences {
            assert!(combined.contains(sentence.as_str()), "lost: {sentence}");
        }
    }

    #[test]
    fn chunk_pages_follow_the_page_map() {
        let pages = vec![
            PageSpan {
                page_number: 1,
                text: String::new(),
                start_position: 0,
                end_position: 40,
            },
            PageSpan {
                page_number: 2,
                text: String::new(),
                start_position: 41,
                end_position: 2000,
            },
        ];
        let text = "Front matter sits on the first page here. ".to_string()
            + &"Body text on the second page. ".repeat(60);
        let chunks = Chunker::new(100, 20).chunk(&text, "paged.txt", &pages);

        assert_eq!(chunks[0].metadata.page_number, Some(1));
        assert!(chunks.iter().any(|c| c.metadata.page_number == Some(2)));
    }
}
