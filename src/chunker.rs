use crate::error::{Result, XtError};
use crate::tokens::split_token_pieces;

struct ChunkState {
    chunks: Vec<String>,
    buf: String,
    buf_chars: usize,
    buf_tokens: usize,
}

impl ChunkState {
    fn flush(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        self.chunks.push(std::mem::take(&mut self.buf));
        self.buf_chars = 0;
        self.buf_tokens = 0;
    }
}

/// Splits masked text into chunks of at most `max_chars` characters without cutting a token.
///
/// A token longer than `max_chars` is emitted as its own chunk. With `max_tokens_per_chunk`
/// set, a chunk never holds more tokens than that.
pub fn split_token_aware(
    text: &str,
    max_chars: usize,
    max_tokens_per_chunk: Option<usize>,
) -> Result<Vec<String>> {
    if max_chars == 0 {
        return Err(XtError::InvalidChunkArgs("max_chars must be > 0".to_string()));
    }
    if max_tokens_per_chunk == Some(0) {
        return Err(XtError::InvalidChunkArgs(
            "max_tokens_per_chunk must be unset or > 0".to_string(),
        ));
    }
    if max_tokens_per_chunk.is_none() && text.chars().count() <= max_chars {
        return Ok(vec![text.to_string()]);
    }

    let mut state = ChunkState {
        chunks: Vec::new(),
        buf: String::new(),
        buf_chars: 0,
        buf_tokens: 0,
    };
    for piece in split_token_pieces(text) {
        let piece_chars = piece.text.chars().count();
        let piece_tokens = usize::from(piece.is_token);

        if let Some(limit) = max_tokens_per_chunk {
            if !state.buf.is_empty() && state.buf_tokens + piece_tokens > limit {
                state.flush();
            }
        }
        if !state.buf.is_empty() && state.buf_chars + piece_chars > max_chars {
            state.flush();
        }
        if piece_chars > max_chars {
            if piece.is_token {
                state.chunks.push(piece.text.to_string());
            } else {
                state.chunks.extend(split_plain_text(piece.text, max_chars));
            }
            continue;
        }
        state.buf.push_str(piece.text);
        state.buf_chars += piece_chars;
        state.buf_tokens += piece_tokens;
    }
    state.flush();

    if state.chunks.is_empty() {
        return Ok(vec![text.to_string()]);
    }
    Ok(state.chunks)
}

/// Hard-wraps plain text, cutting after the last whitespace inside the window when there is one.
fn split_plain_text(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut start = 0usize;
    while start < chars.len() {
        let remaining = chars.len() - start;
        if remaining <= max_chars {
            out.push(chars[start..].iter().collect());
            break;
        }
        let end = start + max_chars;
        let cut = (start + 1..end)
            .rev()
            .find(|&i| chars[i].is_whitespace())
            .map_or(end, |i| i + 1);
        out.push(chars[start..cut].iter().collect());
        start = cut;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::XT_TOKEN_RE;

    #[test]
    fn short_text_is_single_chunk() {
        assert_eq!(split_token_aware("hello", 10, None).expect("split"), vec!["hello"]);
        assert_eq!(split_token_aware("", 10, None).expect("split"), vec![""]);
    }

    #[test]
    fn rejects_zero_limits() {
        assert!(split_token_aware("a", 0, None).is_err());
        assert!(split_token_aware("a", 5, Some(0)).is_err());
    }

    #[test]
    fn never_cuts_tokens() {
        let mut text = String::new();
        for i in 0..200 {
            text.push_str(&format!("word{i} __XT_PH_{:04}__ ", i % 10000));
        }
        let chunks = split_token_aware(&text, 80, None).expect("split");
        assert_eq!(chunks.concat(), text);
        let mut offset = 0usize;
        let token_spans: Vec<(usize, usize)> = XT_TOKEN_RE
            .find_iter(&text)
            .map(|m| (m.start(), m.end()))
            .collect();
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 80);
            offset += chunk.len();
            assert!(
                !token_spans.iter().any(|&(s, e)| s < offset && offset < e),
                "boundary {offset} falls inside a token"
            );
        }
    }

    #[test]
    fn hard_wraps_without_empty_chunks() {
        let text = "A".repeat(1000);
        let chunks = split_token_aware(&text, 123, None).expect("split");
        assert!(chunks.iter().all(|c| !c.is_empty() && c.chars().count() <= 123));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn prefers_whitespace_cuts() {
        let chunks = split_token_aware("alpha beta gamma delta", 12, None).expect("split");
        assert_eq!(chunks, vec!["alpha beta ", "gamma delta"]);
    }

    #[test]
    fn token_budget_starts_new_chunks() {
        let text = "a __XT_PH_0000__ b __XT_PH_0001__ c __XT_PH_0002__";
        let chunks = split_token_aware(text, 1000, Some(2)).expect("split");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks.concat(), text);
        assert_eq!(XT_TOKEN_RE.find_iter(&chunks[0]).count(), 2);
    }
}
