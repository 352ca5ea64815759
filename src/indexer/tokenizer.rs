//! Token normalization and context windows.
//!
//! Word characters are ASCII letters, digits and `_`; everything else separates tokens.
//! Because tokens are pure ASCII, lowercasing is done per character with
//! [`char::to_ascii_lowercase`], which keeps character offsets in the lowered text aligned
//! with the original. Offsets throughout the index are character offsets, not byte offsets.

const ELLIPSIS: &str = "...";

/// Tokens shorter than this are dropped
const MIN_TOKEN_LEN: usize = 3;

const STOPWORDS: &[&str] = &[
    "a", "about", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been", "being",
    "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have", "he",
    "her", "him", "his", "how", "i", "in", "into", "is", "it", "its", "just", "may", "me",
    "might", "my", "not", "of", "on", "or", "our", "she", "should", "so", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those", "to", "was", "we",
    "were", "what", "when", "where", "which", "who", "will", "with", "would", "you", "your",
];

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.binary_search(&token).is_ok()
}

/// Lowercase, split on runs of non-word characters, drop short tokens and stopwords.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !is_word_char(c))
        .filter(|word| word.len() >= MIN_TOKEN_LEN)
        .map(str::to_ascii_lowercase)
        .filter(|token| !is_stopword(token))
        .collect()
}

/// Characters of `text` with ASCII letters lowercased, one entry per source character.
pub fn folded_chars(text: &str) -> Vec<char> {
    text.chars().map(|c| c.to_ascii_lowercase()).collect()
}

/// Character offset of the first occurrence of `needle` in `haystack` at or after `from`.
pub fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() || needle.len() > haystack.len() - from {
        return None;
    }
    haystack[from..].windows(needle.len()).position(|window| window == needle).map(|p| p + from)
}

/// Window of `text` around character `position`, `half_width` characters to each side.
///
/// When the window is clamped on a side, its outermost three characters on that side are
/// replaced by `...`, so a clamped snippet never grows past `2 * half_width` characters.
/// Text that fits entirely inside the window is returned unchanged.
pub fn extract_context(text: &str, position: usize, half_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    extract_context_chars(&chars, position, half_width)
}

pub(crate) fn extract_context_chars(chars: &[char], position: usize, half_width: usize) -> String {
    let len = chars.len();
    let start = position.saturating_sub(half_width).min(len);
    let end = position.saturating_add(half_width).min(len);

    let clipped_left = start > 0;
    let clipped_right = end < len;
    let inner_start = if clipped_left { start + ELLIPSIS.len() } else { start };
    let inner_end = if clipped_right { end.saturating_sub(ELLIPSIS.len()) } else { end };

    let mut context = String::with_capacity(end - start + 2 * ELLIPSIS.len());
    if clipped_left {
        context.push_str(ELLIPSIS);
    }
    if inner_start < inner_end {
        context.extend(&chars[inner_start..inner_end]);
    }
    if clipped_right {
        context.push_str(ELLIPSIS);
    }
    context
}
