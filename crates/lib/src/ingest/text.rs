//! # Text Chunking
//!
//! Splits extracted book text into overlapping chunks small enough to embed.

use std::collections::VecDeque;
use thiserror::Error;
use tracing::debug;

/// The maximum size of a single chunk, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// The characters carried over between neighbouring chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Separators tried in order, coarsest first. Text with none of them left is
/// cut at character boundaries.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

#[derive(Error, Debug, PartialEq)]
pub enum IngestError {
    #[error("Text content is empty or only whitespace")]
    EmptyContent,
    #[error("Chunk size must be greater than zero")]
    ZeroChunkSize,
}

/// Chunks `text` with the default size and overlap.
pub fn chunk_text(text: &str) -> Result<Vec<String>, IngestError> {
    chunk_text_with(text, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
}

/// Chunks a text recursively on paragraph, line and word boundaries.
///
/// The chunking strategy is as follows:
/// 1. Split on the coarsest separator present in the text.
/// 2. Greedily merge neighbouring pieces into chunks of at most `size`
///    characters, starting each new chunk with up to `overlap` characters of
///    trailing pieces from the previous one.
/// 3. Pieces still longer than `size` are split again with the next
///    separator, and finally by character count.
pub fn chunk_text_with(
    text: &str,
    size: usize,
    overlap: usize,
) -> Result<Vec<String>, IngestError> {
    if size == 0 {
        return Err(IngestError::ZeroChunkSize);
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(IngestError::EmptyContent);
    }
    // An overlap as large as the chunk itself would never advance.
    let overlap = overlap.min(size.saturating_sub(1));

    let chunks = split_recursive(trimmed, &SEPARATORS, size, overlap);
    debug!(chunks = chunks.len(), size, overlap, "Chunked text");
    Ok(chunks)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_recursive(text: &str, separators: &[&str], size: usize, overlap: usize) -> Vec<String> {
    if char_len(text) <= size {
        let trimmed = text.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    }

    let Some(position) = separators.iter().position(|sep| text.contains(sep)) else {
        return split_by_chars(text, size, overlap);
    };
    let separator = separators[position];
    let finer = &separators[position + 1..];

    let mut chunks = Vec::new();
    let mut pending: Vec<&str> = Vec::new();
    for piece in text.split(separator).filter(|p| !p.trim().is_empty()) {
        if char_len(piece) <= size {
            pending.push(piece);
            continue;
        }
        if !pending.is_empty() {
            chunks.extend(merge_pieces(&pending, separator, size, overlap));
            pending.clear();
        }
        chunks.extend(split_recursive(piece, finer, size, overlap));
    }
    if !pending.is_empty() {
        chunks.extend(merge_pieces(&pending, separator, size, overlap));
    }
    chunks
}

/// Greedily joins pieces (each at most `size` long) into chunks.
fn merge_pieces(pieces: &[&str], separator: &str, size: usize, overlap: usize) -> Vec<String> {
    let separator_len = char_len(separator);
    let mut chunks = Vec::new();
    let mut window: VecDeque<(&str, usize)> = VecDeque::new();
    // Length of the window joined by the separator.
    let mut total = 0;

    for &piece in pieces {
        let len = char_len(piece);
        let joined_len = |total: usize, window: &VecDeque<(&str, usize)>| {
            if window.is_empty() {
                len
            } else {
                total + separator_len + len
            }
        };

        if !window.is_empty() && joined_len(total, &window) > size {
            push_window(&mut chunks, &window, separator);
            while let Some(&(_, front_len)) = window.front() {
                if total <= overlap && joined_len(total, &window) <= size {
                    break;
                }
                window.pop_front();
                total -= if window.is_empty() {
                    front_len
                } else {
                    front_len + separator_len
                };
            }
        }

        total = joined_len(total, &window);
        window.push_back((piece, len));
    }
    push_window(&mut chunks, &window, separator);
    chunks
}

fn push_window(chunks: &mut Vec<String>, window: &VecDeque<(&str, usize)>, separator: &str) {
    let joined = window
        .iter()
        .map(|(piece, _)| *piece)
        .collect::<Vec<_>>()
        .join(separator);
    let joined = joined.trim();
    if !joined.is_empty() {
        chunks.push(joined.to_string());
    }
}

/// Cuts text without usable separators into `size`-character windows.
fn split_by_chars(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let step = size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}
