//! Sentence tokenization.
//!
//! The boundary rule is a heuristic, not a grammar: a sentence ends at a
//! terminator (`.`, `!`, `?`) that is followed by whitespace or by the end of
//! the text. Whitespace between sentences forms tokens of its own, so joining
//! the tokens reproduces the input exactly.

/// Returns `true` for characters that can end a sentence.
pub fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Split `text` into sentence and separator tokens.
///
/// Every token is a non-empty slice of `text` and the tokens concatenate back
/// to `text`. Trailing text without a terminator becomes the final token.
pub fn tokenize_sentences(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if i == start && c.is_whitespace() {
            // Separator run between sentences.
            let mut end = text.len();
            while let Some(&(j, next)) = chars.peek() {
                if !next.is_whitespace() {
                    end = j;
                    break;
                }
                chars.next();
            }
            tokens.push(&text[start..end]);
            start = end;
            continue;
        }

        if is_terminator(c) {
            let at_boundary = chars.peek().map_or(true, |&(_, next)| next.is_whitespace());
            if at_boundary {
                let end = i + c.len_utf8();
                tokens.push(&text[start..end]);
                start = end;
            }
        }
    }

    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}
