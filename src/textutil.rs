use regex::{Captures, Regex};

const INVISIBLE_SEPARATORS: [char; 3] = ['\u{200B}', '\u{FEFF}', '\u{2060}'];

/// Removes zero-width separators that models sometimes emit between a placeholder and its unit.
pub fn strip_invisible(text: &str) -> String {
    if !text.contains(INVISIBLE_SEPARATORS) {
        return text.to_string();
    }
    text.chars()
        .filter(|c| !INVISIBLE_SEPARATORS.contains(c))
        .collect()
}

/// Whether a target-language label names Korean (`ko`, `ko-KR`, `ko_kr`, `Korean`, `한국어`, ...).
pub fn is_korean_language(lang: &str) -> bool {
    let s = lang.trim();
    if s.is_empty() {
        return false;
    }
    let lower = s.to_lowercase();
    lower == "korean"
        || lower == "ko"
        || lower.starts_with("ko-")
        || lower.starts_with("ko_")
        || lower.contains("korean")
        || s.contains("한국")
}

pub fn contains_hangul(text: &str) -> bool {
    text.chars().any(is_hangul_syllable)
}

pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

pub fn is_hangul_syllable(ch: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&ch)
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Case-insensitive substring test (Unicode simple lowercase).
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    find_ci(haystack, needle, 0).is_some()
}

pub fn prev_char(text: &str, idx: usize) -> Option<char> {
    text[..idx].chars().next_back()
}

pub fn next_char(text: &str, idx: usize) -> Option<char> {
    text[idx..].chars().next()
}

fn step_past(text: &str, idx: usize) -> usize {
    idx + next_char(text, idx).map_or(1, char::len_utf8)
}

/// Replace-all where every candidate match is first offered to `accept`.
///
/// A rejected candidate is retried from the next character, so context checks on the
/// text around a match behave like zero-width lookaround assertions.
pub fn replace_guarded<A, R>(re: &Regex, text: &str, mut accept: A, mut render: R) -> String
where
    A: FnMut(&str, &Captures<'_>) -> bool,
    R: FnMut(&Captures<'_>) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0usize;
    let mut pos = 0usize;
    while pos <= text.len() {
        let Some(caps) = re.captures_at(text, pos) else {
            break;
        };
        let Some(m) = caps.get(0) else {
            break;
        };
        if !accept(text, &caps) {
            if m.start() >= text.len() {
                break;
            }
            pos = step_past(text, m.start());
            continue;
        }
        out.push_str(&text[last..m.start()]);
        out.push_str(&render(&caps));
        last = m.end();
        pos = if m.end() == m.start() {
            if m.end() >= text.len() {
                break;
            }
            step_past(text, m.end())
        } else {
            m.end()
        };
    }
    out.push_str(&text[last..]);
    out
}

/// Replace-all for patterns whose named group `la` stands in for a trailing lookahead.
///
/// Only the text before `la` is replaced; the search resumes at the start of `la` so the
/// asserted text can begin the next match.
pub fn replace_with_lookahead<R>(re: &Regex, text: &str, mut render: R) -> String
where
    R: FnMut(&Captures<'_>) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0usize;
    let mut pos = 0usize;
    while pos <= text.len() {
        let Some(caps) = re.captures_at(text, pos) else {
            break;
        };
        let Some(m) = caps.get(0) else {
            break;
        };
        let end = caps.name("la").map_or(m.end(), |la| la.start());
        out.push_str(&text[last..m.start()]);
        out.push_str(&render(&caps));
        last = end;
        pos = if end == m.start() {
            if end >= text.len() {
                break;
            }
            step_past(text, end)
        } else {
            end
        };
    }
    out.push_str(&text[last..]);
    out
}

pub fn group<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map_or("", |m| m.as_str())
}

pub fn nth<'t>(caps: &Captures<'t>, i: usize) -> &'t str {
    caps.get(i).map_or("", |m| m.as_str())
}

/// Replaces every case-insensitive occurrence of `needle` with `replacement`.
pub fn replace_ci(text: &str, needle: &str, replacement: &str) -> String {
    if needle.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut last = 0usize;
    while let Some((start, end)) = find_ci(text, needle, last) {
        out.push_str(&text[last..start]);
        out.push_str(replacement);
        last = end;
    }
    out.push_str(&text[last..]);
    out
}

/// First case-insensitive occurrence of `needle` at or after byte offset `from`.
pub fn find_ci(text: &str, needle: &str, from: usize) -> Option<(usize, usize)> {
    if needle.is_empty() || from > text.len() {
        return None;
    }
    for (offset, _) in text[from..].char_indices() {
        let start = from + offset;
        let mut rest = text[start..].char_indices();
        let mut end = start;
        let matched = needle.chars().all(|n| match rest.next() {
            Some((i, c)) if chars_eq_ci(c, n) => {
                end = start + i + c.len_utf8();
                true
            }
            _ => false,
        });
        if matched {
            return Some((start, end));
        }
    }
    None
}

fn chars_eq_ci(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
