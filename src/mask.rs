use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, XtError};
use crate::tokens::{placeholder_token, PlaceholderLabel, MAX_PLACEHOLDERS};

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    let line_break = r"\r\n|\r|\n";
    let angle_pct = r"[+-]?<[^>]+>[\t ]*%";
    let angle = r"[+-]?<[^>]+>";
    let page_break = r"\[pagebreak\]";
    let pct_name = r"%[A-Za-z0-9_]+%";
    let printf = r"%(?:[0-9]+\$)?[-+0-9.]*[A-Za-z]";
    let dollar = r"\$[A-Za-z0-9_]+\$";
    let brace2 = r"\{\{[A-Za-z0-9_.,:+-]{1,40}\}\}";
    let brace = r"\{[A-Za-z0-9_.,:+-]{1,40}\}";
    let num_pct = r"[+-]?\d+(?:\.\d+)?[\t ]*%";
    let pat = format!(
        "(?i)({line_break}|{angle_pct}|{angle}|{page_break}|{pct_name}|{printf}|{dollar}|{brace2}|{brace}|{num_pct}|%)"
    );
    Regex::new(&pat).expect("placeholder regex")
});

static SECONDS_AFTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*seconds?\b").expect("seconds regex"));

#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct MaskOptions {
    /// Leave `<mag>`, `<dur>` and `<bur>` tags in the text for consumers that understand them.
    #[serde(default)]
    pub keep_skyrim_tags_raw: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedText {
    pub text: String,
    pub token_to_original: HashMap<String, String>,
}

/// Replaces structural markup with `__XT_PH_*__` tokens.
///
/// Tokens are numbered in match order, so identical input always yields identical tokens.
pub fn mask(text: &str, options: MaskOptions) -> Result<MaskedText> {
    let mut token_to_original: HashMap<String, String> = HashMap::new();
    let mut out = String::with_capacity(text.len());
    let mut pos = 0usize;
    for m in PLACEHOLDER_RE.find_iter(text) {
        out.push_str(&text[pos..m.start()]);
        pos = m.end();
        let original = m.as_str();
        if options.keep_skyrim_tags_raw && is_raw_skyrim_tag(original) {
            out.push_str(original);
            continue;
        }
        let idx = token_to_original.len();
        if idx >= MAX_PLACEHOLDERS {
            return Err(XtError::PlaceholderBudgetExceeded);
        }
        let label = semantic_label(original, &text[m.end()..]);
        let token = placeholder_token(idx, label);
        out.push_str(&token);
        token_to_original.insert(token, original.to_string());
    }
    out.push_str(&text[pos..]);
    Ok(MaskedText {
        text: out,
        token_to_original,
    })
}

/// Restores the original markup. Every token of the map must be present in `text`.
pub fn unmask(text: &str, token_to_original: &HashMap<String, String>) -> Result<String> {
    let mut tokens: Vec<&String> = token_to_original.keys().collect();
    tokens.sort();
    if let Some(missing) = tokens.iter().find(|tok| !text.contains(tok.as_str())) {
        return Err(XtError::MissingPlaceholder {
            token: (*missing).clone(),
        });
    }
    let mut working = text.to_string();
    for tok in tokens {
        if let Some(original) = token_to_original.get(tok) {
            working = working.replace(tok.as_str(), original);
        }
    }
    Ok(working)
}

fn strip_sign(s: &str) -> &str {
    s.strip_prefix(['+', '-']).unwrap_or(s)
}

fn strip_percent_suffix(s: &str) -> (&str, bool) {
    match s.strip_suffix('%') {
        Some(rest) => (rest.trim_end(), true),
        None => (s, false),
    }
}

fn angle_inner(s: &str) -> Option<&str> {
    if s.len() < 3 {
        return None;
    }
    s.strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .map(str::trim)
}

fn is_ascii_number(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit()) && s.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}

fn is_ascii_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_raw_skyrim_tag(placeholder: &str) -> bool {
    let (s, _) = strip_percent_suffix(strip_sign(placeholder).trim());
    angle_inner(s).is_some_and(|inner| {
        ["mag", "dur", "bur"]
            .iter()
            .any(|name| inner.eq_ignore_ascii_case(name))
    })
}

fn semantic_label(placeholder: &str, rest: &str) -> Option<PlaceholderLabel> {
    let (s, has_pct) = strip_percent_suffix(strip_sign(placeholder));
    if has_pct && is_ascii_number(s) {
        return Some(PlaceholderLabel::Num);
    }
    let inner = angle_inner(s)?;
    if inner.eq_ignore_ascii_case("mag") {
        return Some(PlaceholderLabel::Mag);
    }
    if inner.eq_ignore_ascii_case("dur") {
        return Some(PlaceholderLabel::Dur);
    }
    if let Some(num) = inner.strip_suffix('%') {
        if inner.len() >= 2 && is_ascii_number(num.trim_end()) {
            return Some(PlaceholderLabel::Num);
        }
    }
    if !is_ascii_digits(inner) {
        return None;
    }
    if has_pct {
        return Some(PlaceholderLabel::Num);
    }
    let window: String = rest.chars().take(24).collect();
    if SECONDS_AFTER_RE.is_match(&window) {
        Some(PlaceholderLabel::Dur)
    } else {
        Some(PlaceholderLabel::Num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_default(text: &str) -> MaskedText {
        mask(text, MaskOptions::default()).expect("mask")
    }

    #[test]
    fn labels_mag_and_dur_tags() {
        let m = mask_default("+<mag> Speech for <dur> seconds. -<mag> Health.");
        assert_eq!(
            m.text,
            "__XT_PH_MAG_0000__ Speech for __XT_PH_DUR_0001__ seconds. __XT_PH_MAG_0002__ Health."
        );
        assert_eq!(m.token_to_original["__XT_PH_MAG_0000__"], "+<mag>");
        assert_eq!(m.token_to_original["__XT_PH_MAG_0002__"], "-<mag>");
    }

    #[test]
    fn numeric_angle_tags_before_seconds_are_durations() {
        let m = mask_default("Heals <2> points per second for <120> seconds.");
        assert_eq!(
            m.text,
            "Heals __XT_PH_NUM_0000__ points per second for __XT_PH_DUR_0001__ seconds."
        );
        assert_eq!(mask_default("< 15 >").text, "__XT_PH_NUM_0000__");
        assert_eq!(mask_default("< Dur >").text, "__XT_PH_DUR_0000__");
    }

    #[test]
    fn percent_forms_are_numeric() {
        assert_eq!(mask_default("80 %").text, "__XT_PH_NUM_0000__");
        assert_eq!(mask_default("<10> %").text, "__XT_PH_NUM_0000__");
        assert_eq!(mask_default("<100%>").text, "__XT_PH_NUM_0000__");
    }

    #[test]
    fn format_specifiers_are_unlabeled() {
        for src in ["%PLAYERNAME%", "%1$s", "$PLAYERNAME$", "{PLAYERNAME}", "{{PLAYERNAME}}"] {
            let m = mask_default(src);
            assert_eq!(m.text, "__XT_PH_0000__", "{src}");
            assert_eq!(m.token_to_original["__XT_PH_0000__"], src);
        }
    }

    #[test]
    fn crlf_is_one_token() {
        let m = mask_default("a\r\nb");
        assert_eq!(m.text, "a__XT_PH_0000__b");
        assert_eq!(m.token_to_original["__XT_PH_0000__"], "\r\n");
    }

    #[test]
    fn round_trip_restores_text() {
        let src = "[pagebreak]\nWeapons are <mag>% better.\n%0f research points earned";
        let m = mask_default(src);
        assert!(!m.text.contains('%'));
        assert_eq!(unmask(&m.text, &m.token_to_original).expect("unmask"), src);
    }

    #[test]
    fn plain_text_is_identity() {
        let m = mask_default("Nothing to hide here.");
        assert_eq!(m.text, "Nothing to hide here.");
        assert!(m.token_to_original.is_empty());
    }

    #[test]
    fn keeps_skyrim_tags_raw_when_asked() {
        let m = mask(
            "Absorb <mag> points for <dur> seconds, {NAME}.",
            MaskOptions {
                keep_skyrim_tags_raw: true,
            },
        )
        .expect("mask");
        assert_eq!(m.text, "Absorb <mag> points for <dur> seconds, __XT_PH_0000__.");
    }

    #[test]
    fn unmask_names_missing_token() {
        let m = mask_default("Deal <mag> damage.");
        let err = unmask("피해를 줍니다.", &m.token_to_original).expect_err("missing");
        assert_eq!(
            err.to_string(),
            "Missing placeholder token in translation: __XT_PH_MAG_0000__"
        );
    }

    #[test]
    fn budget_is_enforced() {
        let text = "%".repeat(MAX_PLACEHOLDERS + 1);
        assert_eq!(
            mask(&text, MaskOptions::default()),
            Err(XtError::PlaceholderBudgetExceeded)
        );
    }
}
