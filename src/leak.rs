//! Removes placeholder instructions that a model echoed after its translation.

use crate::textutil::{find_ci, is_blank};

/// Source mentions that make an echoed instruction plausibly part of the real text.
const SOURCE_OPT_OUT: &[&str] = &["placeholder", "token", "__XT_", "자리표시자", "토큰"];

/// Leak openers in search order. The first one found marks the cut.
const LEAK_STARTS: &[&str] = &[
    "Do NOT modify",
    "Preserve all placeholders",
    "placeholder token",
    "__XT_PH_",
    "__XT_TERM_",
    "자리표시자",
    "서식 자리표시자",
];

const ENGLISH_LEAK_VERBS: &[&str] = &["Do not", "Preserve", "Output only"];
const KOREAN_LEAK_WORDS: &[&str] = &["토큰", "순서", "유지", "제거", "변경", "줄바꿈", "페이지"];

const TRAILING_SEPARATORS: &[char] = &[' ', '\t', '/', '-', '•', '·', ':', ';'];

/// Cuts `translated` at an echoed "keep the placeholders" instruction and returns the text before it.
///
/// Nothing is cut unless the tail really reads like such an instruction, and the source itself
/// never talks about placeholders or tokens.
pub fn strip_leaked_instructions(source: &str, translated: &str) -> String {
    if is_blank(translated) || is_blank(source) {
        return translated.to_string();
    }
    if SOURCE_OPT_OUT.iter().any(|n| find_ci(source, n, 0).is_some()) {
        return translated.to_string();
    }
    let Some(idx) = leak_start(translated) else {
        return translated.to_string();
    };
    if !looks_like_leak_tail(&translated[idx..]) {
        return translated.to_string();
    }
    trim_trailing_separators(&translated[..idx]).to_string()
}

fn leak_start(text: &str) -> Option<usize> {
    LEAK_STARTS
        .iter()
        .find_map(|needle| find_ci(text, needle, 0).map(|(start, _)| start))
}

fn looks_like_leak_tail(tail: &str) -> bool {
    if is_blank(tail) {
        return false;
    }
    let english = find_ci(tail, "placeholder", 0).is_some()
        && ENGLISH_LEAK_VERBS.iter().any(|v| find_ci(tail, v, 0).is_some());
    let korean = tail.contains("자리표시자") && KOREAN_LEAK_WORDS.iter().any(|w| tail.contains(w));
    english || korean
}

fn trim_trailing_separators(s: &str) -> &str {
    let mut out = s.trim_end();
    while let Some(rest) = out.strip_suffix(TRAILING_SEPARATORS) {
        out = rest.trim_end();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_english_instruction_tail() {
        assert_eq!(
            strip_leaked_instructions(
                "Deals <mag> fire damage.",
                "<mag>의 화염 피해를 줍니다. Do NOT modify placeholder tokens."
            ),
            "<mag>의 화염 피해를 줍니다."
        );
        assert_eq!(
            strip_leaked_instructions(
                "Restores Health.",
                "체력을 회복합니다. - Preserve all placeholders exactly."
            ),
            "체력을 회복합니다."
        );
    }

    #[test]
    fn strips_korean_instruction_tail() {
        assert_eq!(
            strip_leaked_instructions(
                "Deals fire damage.",
                "화염 피해를 줍니다.\n자리표시자 토큰은 순서를 유지하세요."
            ),
            "화염 피해를 줍니다."
        );
    }

    #[test]
    fn keeps_text_when_source_talks_about_tokens() {
        let translated = "토큰을 얻습니다. Do not modify placeholder tokens.";
        assert_eq!(
            strip_leaked_instructions("Gain a token.", translated),
            translated
        );
    }

    #[test]
    fn keeps_real_tokens_without_instruction() {
        let translated = "__XT_PH_MAG_0000__ 피해를 줍니다.";
        assert_eq!(strip_leaked_instructions("Deals <mag> damage.", translated), translated);
        assert_eq!(strip_leaked_instructions("Deals damage.", "피해를 줍니다. 자리표시자"), "피해를 줍니다. 자리표시자");
    }
}
