//! Excerpt generation
//!
//! All windowing happens in character positions. Substring search returns
//! byte offsets, which are converted before any slicing so multi-byte text
//! is never cut inside a character.

/// Marker for text cut from either side of an excerpt
pub const ELLIPSIS: &str = "...";

/// Summarize `body` around `keyword`
///
/// With a non-empty keyword present in the body, the first occurrence is
/// kept with `context_len` characters on each side, clipped to the body.
/// Otherwise the first `max_len` characters are kept. [`ELLIPSIS`] marks
/// each side where text was cut.
pub fn summarize(body: &str, keyword: &str, max_len: usize, context_len: usize) -> String {
    if body.is_empty() {
        return String::new();
    }

    if !keyword.is_empty() {
        if let Some(byte_idx) = body.find(keyword) {
            let total = body.chars().count();
            let keyword_start = body[..byte_idx].chars().count();
            let keyword_len = keyword.chars().count();

            let start = keyword_start.saturating_sub(context_len);
            let end = keyword_start
                .saturating_add(keyword_len)
                .saturating_add(context_len)
                .min(total);

            let mut excerpt = String::new();
            if start > 0 {
                excerpt.push_str(ELLIPSIS);
            }
            excerpt.push_str(char_slice(body, start, end));
            if end < total {
                excerpt.push_str(ELLIPSIS);
            }
            return excerpt;
        }
    }

    match body.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}{}", &body[..cut], ELLIPSIS),
        None => body.to_string(),
    }
}

/// Pick the keyword to center an excerpt on
///
/// The raw query wins when it appears verbatim; otherwise the first query
/// token found in the body.
pub fn pick_keyword<'a>(body: &str, raw_query: &'a str, tokens: &'a [String]) -> Option<&'a str> {
    let raw = raw_query.trim();
    if !raw.is_empty() && body.contains(raw) {
        return Some(raw);
    }
    tokens
        .iter()
        .map(String::as_str)
        .find(|token| !token.is_empty() && body.contains(token))
}

/// Characters `[start, end)` of `text`
fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let byte_at = |n: usize| {
        text.char_indices()
            .nth(n)
            .map(|(idx, _)| idx)
            .unwrap_or(text.len())
    };
    &text[byte_at(start)..byte_at(end)]
}
