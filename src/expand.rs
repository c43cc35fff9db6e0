//! Rewrites compressed English lists into explicit ones before translation.
//!
//! Both expanders run on masked text and only ever add words around existing tokens.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::textutil::{find_ci, is_blank};

static FORTIFY_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?P<fortify>Fortify)\s+(?P<list>[A-Za-z][A-Za-z0-9\-' ]*(?:\s*,\s*[A-Za-z0-9][A-Za-z0-9\-' ]*)*(?:\s*,?\s*(?:and|or)\s*[A-Za-z0-9][A-Za-z0-9\-' ]*)?)\s+(?P<verb>is|are)\b",
    )
    .expect("fortify list regex")
});

static VALUES_PER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?P<values>(?:__XT_PH_NUM_[0-9]{4}__\s*/\s*)+__XT_PH_NUM_[0-9]{4}__)\s*per\s+(?P<unit>point|points|level|levels)\s+of\s+(?:the\s+)?",
    )
    .expect("paired slash regex")
});

const NUM_TOKEN_PREFIX: &str = "__XT_PH_NUM_";
const LIST_STOPS: &[char] = &[',', '.', ';', ':', ')', '(', '\r', '\n'];
const SUFFIX_WORDS: &[&str] = &["skill", "skills", "level", "levels"];

/// `Fortify A, B and C are` becomes `Fortify A, Fortify B and Fortify C are`.
///
/// Single items, lists without a separator and lists that already repeat `Fortify` are left alone.
pub fn expand_fortify_list(text: &str) -> String {
    if find_ci(text, "Fortify", 0).is_none() {
        return text.to_string();
    }
    FORTIFY_LIST_RE
        .replace_all(text, |caps: &Captures<'_>| {
            expand_fortify_match(caps).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn expand_fortify_match(caps: &Captures<'_>) -> Option<String> {
    let list = &caps["list"];
    if is_blank(list) || find_ci(list, "Fortify", 0).is_some() {
        return None;
    }
    let lower = list.to_ascii_lowercase();
    if !(list.contains(',') || lower.contains(" and ") || lower.contains(" or ")) {
        return None;
    }
    let parsed = parse_list(list)?;
    if parsed.items.len() <= 1 {
        return None;
    }
    let expanded = parsed.render();
    if expanded == list {
        return None;
    }
    Some(format!("{} {expanded} {}", &caps["fortify"], &caps["verb"]))
}

struct ParsedList {
    items: Vec<String>,
    conjunction: &'static str,
    oxford_comma: bool,
}

fn parse_list(list: &str) -> Option<ParsedList> {
    let lower = list.to_ascii_lowercase();
    let and_idx = lower.rfind(" and ");
    let or_idx = lower.rfind(" or ");
    let conj = match (and_idx, or_idx) {
        (Some(a), Some(o)) if o > a => Some((o, "or")),
        (Some(a), _) => Some((a, "and")),
        (None, Some(o)) => Some((o, "or")),
        (None, None) => None,
    };

    let mut raw: Vec<&str> = Vec::new();
    let mut conjunction = "and";
    let mut oxford_comma = false;
    match conj {
        Some((idx, word)) => {
            conjunction = word;
            let left = &list[..idx];
            let right = &list[idx + word.len() + 2..];
            oxford_comma = left.trim_end().ends_with(',');
            raw.extend(comma_items(left));
            raw.extend(comma_items(right));
        }
        None => raw.extend(comma_items(list)),
    }

    let mut items: Vec<String> = Vec::with_capacity(raw.len());
    for item in raw {
        if !items.iter().any(|seen| seen == item) {
            items.push(item.to_string());
        }
    }

    // "X, Y,and Z" reaches here without a spaced conjunction.
    if conj.is_none() {
        let glued = items.iter().any(|i| {
            let l = i.to_ascii_lowercase();
            l.starts_with("and ") || l.starts_with("or ")
        });
        if glued {
            return None;
        }
    }

    (!items.is_empty()).then_some(ParsedList {
        items,
        conjunction,
        oxford_comma,
    })
}

fn comma_items(segment: &str) -> impl Iterator<Item = &str> {
    segment.split(',').map(str::trim).filter(|s| !s.is_empty())
}

impl ParsedList {
    fn render(&self) -> String {
        let prefixed = |item: &str| {
            if item.to_ascii_lowercase().starts_with("fortify ") {
                item.to_string()
            } else {
                format!("Fortify {item}")
            }
        };
        let (first, rest) = match self.items.split_first() {
            Some(parts) => parts,
            None => return String::new(),
        };
        let Some((last, middle)) = rest.split_last() else {
            return first.clone();
        };

        let mut out = first.clone();
        for item in middle {
            out.push_str(", ");
            out.push_str(&prefixed(item));
        }
        out.push_str(if self.oxford_comma && !middle.is_empty() { ", " } else { " " });
        out.push_str(self.conjunction);
        out.push(' ');
        out.push_str(&prefixed(last));
        out
    }
}

/// `__XT_PH_NUM_0000__/__XT_PH_NUM_0001__ per point of A/B skill` becomes
/// `per point of skill: A: __XT_PH_NUM_0000__; B: __XT_PH_NUM_0001__`.
///
/// A list is rewritten only when every value is a numeric token and the label count matches.
pub fn expand_paired_slash_list(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0usize;
    let mut search = 0usize;
    let mut changed = false;

    while let Some(caps) = VALUES_PER_RE.captures_at(text, search) {
        let Some(whole) = caps.get(0) else { break };
        match expand_pair_at(text, &caps) {
            Some((replacement, end)) => {
                out.push_str(&text[last..whole.start()]);
                out.push_str(&replacement);
                last = end;
                search = end;
                changed = true;
            }
            None => search = whole.start() + 1,
        }
    }

    if !changed {
        return text.to_string();
    }
    out.push_str(&text[last..]);
    out
}

fn expand_pair_at(text: &str, caps: &Captures<'_>) -> Option<(String, usize)> {
    let values: Vec<&str> = caps["values"].split('/').map(str::trim).filter(|v| !v.is_empty()).collect();
    if values.len() < 2 || !values.iter().all(|v| is_numeric_token(v)) {
        return None;
    }
    let unit = if caps["unit"].to_ascii_lowercase().starts_with("point") {
        "point"
    } else {
        "level"
    };

    let labels_start = caps.get(0)?.end();
    let (labels, after_labels) = read_labels(text, labels_start, values.len())?;
    let suffix_end = find_stop(text, after_labels);
    let suffix = text[after_labels..suffix_end].trim();

    let per = if suffix.is_empty() {
        format!("per {unit}")
    } else {
        format!("per {unit} of {suffix}")
    };
    let pairs: Vec<String> = labels
        .iter()
        .zip(&values)
        .map(|(label, value)| format!("{label}: {value}"))
        .collect();
    Some((format!("{per}: {}", pairs.join("; ")), suffix_end))
}

fn is_numeric_token(token: &str) -> bool {
    token.len() == NUM_TOKEN_PREFIX.len() + 6
        && token.starts_with(NUM_TOKEN_PREFIX)
        && token.ends_with("__")
        && token[NUM_TOKEN_PREFIX.len()..NUM_TOKEN_PREFIX.len() + 4]
            .bytes()
            .all(|b| b.is_ascii_digit())
}

fn read_labels(text: &str, start: usize, count: usize) -> Option<(Vec<String>, usize)> {
    let mut labels = Vec::with_capacity(count);
    let mut cursor = start;
    for i in 0..count {
        cursor = skip_whitespace(text, cursor);
        let (item, next) = if i + 1 == count {
            let end = find_label_end(text, cursor);
            (text[cursor..end].trim(), end)
        } else {
            let slash = cursor + text[cursor..].find('/')?;
            (text[cursor..slash].trim(), slash + 1)
        };
        if item.is_empty() || item.contains('/') {
            return None;
        }
        labels.push(item.to_string());
        cursor = next;
    }
    Some((labels, cursor))
}

fn skip_whitespace(text: &str, idx: usize) -> usize {
    let rest = &text[idx..];
    idx + (rest.len() - rest.trim_start().len())
}

/// End of the last label: list punctuation, or a trailing `skill`/`level` word.
fn find_label_end(text: &str, start: usize) -> usize {
    for (offset, c) in text[start..].char_indices() {
        let idx = start + offset;
        if LIST_STOPS.contains(&c) || is_suffix_word_start(text, idx) {
            return idx;
        }
    }
    text.len()
}

fn is_suffix_word_start(text: &str, idx: usize) -> bool {
    let Some(prev) = text[..idx].chars().next_back() else {
        return false;
    };
    if prev.is_alphanumeric() || prev == '_' {
        return false;
    }
    SUFFIX_WORDS.iter().any(|word| starts_with_word(&text[idx..], word))
}

fn starts_with_word(rest: &str, word: &str) -> bool {
    let Some(head) = rest.get(..word.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(word) {
        return false;
    }
    rest[word.len()..]
        .chars()
        .next()
        .map_or(true, |c| !c.is_alphanumeric() && c != '_')
}

fn find_stop(text: &str, start: usize) -> usize {
    text[start..]
        .find(LIST_STOPS)
        .map_or(text.len(), |offset| start + offset)
}
