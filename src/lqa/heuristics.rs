//! Stateless checks over one source/destination pair.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::glossary::{suppress_reach, ForceMode, GlossaryEntry, MatchMode};
use crate::korean::particle::{has_final_consonant, is_latin_vowel};
use crate::textutil::{contains_ci, find_ci, group, is_blank, is_word_char, next_char, prev_char};

static UI_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[+-]?<\s*[^>]+\s*>|\[pagebreak\]|__XT_[A-Za-z0-9_]+__").expect("ui token regex")
});
static ASCII_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]{2,}").expect("ascii word regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));
static DOUBLED_PARTICLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"을\s*를|를\s*을|은\s*는|는\s*은|이\s*가|가\s*이|와\s*과|과\s*와").expect("doubled particle regex")
});
static HANGUL_PARTICLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<word>[가-힣]{1,20})(?P<particle>을|를|은|는|이|가|와|과)(?P<la>$|[\s\p{P}])")
        .expect("hangul particle regex")
});
static ROMAN_PARTICLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?P<word>[A-Za-z][A-Za-z0-9'’\-]{1,})(?P<particle>을|은|이|과)(?P<la>$|[\s\p{P}])")
        .expect("roman particle regex")
});
static DUPLICATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"효과\s+효과|초\s+초").expect("duplication artifact regex"));
static PERCENT_ARTIFACT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:<\s*\d+\s*>|\d+)\s*%\s*포인트|[가-힣]{2,}%").expect("percent artifact regex")
});
static PARTICLE_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"을\(를\)|를\(을\)|은\(는\)|는\(은\)|을/를|를/을|은/는|는/은|",
        r"\(\s*을\s*\)\s*를|\(\s*를\s*\)\s*을|\(\s*은\s*\)\s*는|\(\s*는\s*\)\s*은|",
        r"이\(가\)|가\(이\)|이/가|가/이|\(\s*이\s*\)\s*가|\(\s*가\s*\)\s*이|",
        r"과\(와\)|와\(과\)|과/와|와/과|\(\s*와\s*\)\s*과|\(\s*과\s*\)\s*와|",
        r"으로\(로\)|로\(으로\)|으로/로|로/으로|\(\s*으\s*\)\s*로",
    ))
    .expect("particle marker regex")
});

pub fn strip_ui_tokens(text: &str) -> String {
    UI_TOKEN_RE.replace_all(text, "").into_owned()
}

/// Structural tokens in order, normalized for comparison.
pub fn ui_tokens(text: &str) -> Vec<String> {
    UI_TOKEN_RE
        .find_iter(text)
        .map(|m| normalize_token(m.as_str()))
        .collect()
}

fn normalize_token(raw: &str) -> String {
    if raw.starts_with('<') {
        raw.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase()
    } else if raw.starts_with('[') {
        raw.to_lowercase()
    } else if raw.starts_with("__XT_") {
        raw.to_uppercase()
    } else {
        raw.to_string()
    }
}

/// Whether the destination's token multiset differs from the source's.
///
/// Sources without tokens never mismatch.
pub fn has_token_mismatch(source: &str, dest: &str) -> bool {
    let mut src = ui_tokens(source);
    if src.is_empty() {
        return false;
    }
    let mut dst = ui_tokens(dest);
    if src.len() != dst.len() {
        return true;
    }
    src.sort();
    dst.sort();
    src != dst
}

pub fn has_english_residue(dest: &str) -> bool {
    ASCII_WORD_RE.is_match(&strip_ui_tokens(dest))
}

pub fn has_bracket_mismatch(dest: &str) -> bool {
    let count = |c: char| dest.chars().filter(|x| *x == c).count();
    count('(') != count(')') || count('[') != count(']')
}

/// Record type without its form id: `"mesg:0001"` becomes `"MESG"`.
pub fn rec_base(rec: Option<&str>) -> String {
    let rec = rec.unwrap_or("").trim();
    let base = rec.split(':').next().unwrap_or(rec);
    base.trim().to_uppercase()
}

/// Editor id with its numeric suffix and trailing separators removed.
pub fn normalize_edid_stem(edid: Option<&str>) -> String {
    let edid = edid.unwrap_or("").trim();
    let stem = edid.trim_end_matches(|c: char| c.is_ascii_digit());
    if stem.is_empty() {
        return String::new();
    }
    stem.trim_end_matches(['_', '-', ' ']).to_string()
}

fn normalize_comparable(text: &str) -> String {
    let stripped = strip_ui_tokens(text);
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_lowercase()
}

pub fn is_likely_untranslated(source: &str, dest: &str) -> bool {
    let src = normalize_comparable(source);
    if src.chars().count() < 6 || !src.chars().any(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    src == normalize_comparable(dest)
}

pub fn has_unresolved_particle_markers(dest: &str) -> bool {
    PARTICLE_MARKER_RE.is_match(dest)
}

pub fn find_doubled_particle(dest: &str) -> Option<String> {
    let m = DOUBLED_PARTICLE_RE.find(dest)?;
    Some(WHITESPACE_RE.replace_all(m.as_str(), "").into_owned())
}

fn expected_particle(particle: &str, has_final: bool) -> Option<&'static str> {
    if has_final {
        match particle {
            "를" => Some("을"),
            "는" => Some("은"),
            "가" => Some("이"),
            "와" => Some("과"),
            _ => None,
        }
    } else {
        match particle {
            "을" => Some("를"),
            "은" => Some("는"),
            "이" => Some("가"),
            "과" => Some("와"),
            _ => None,
        }
    }
}

// The `la` group only asserts what follows the particle. It is always whitespace or
// punctuation, which cannot begin another match, so consuming it is harmless.
fn first_suggestion<F>(re: &Regex, dest: &str, mut expected: F) -> Option<String>
where
    F: FnMut(&Captures<'_>) -> Option<&'static str>,
{
    re.captures_iter(dest).find_map(|caps| {
        let word = group(&caps, "word");
        let particle = group(&caps, "particle");
        let fixed = expected(&caps)?;
        Some(format!("{word}{particle} → {word}{fixed}"))
    })
}

pub fn find_hangul_particle_mismatch(dest: &str) -> Option<String> {
    first_suggestion(&HANGUL_PARTICLE_RE, dest, |caps| {
        let last = group(caps, "word").chars().last()?;
        expected_particle(group(caps, "particle"), has_final_consonant(last))
    })
}

pub fn find_roman_particle_mismatch(dest: &str) -> Option<String> {
    first_suggestion(&ROMAN_PARTICLE_RE, dest, |caps| {
        let last = group(caps, "word").chars().last()?;
        if !is_latin_vowel(last) {
            return None;
        }
        expected_particle(group(caps, "particle"), false)
    })
}

pub fn find_duplication_artifact(dest: &str) -> Option<String> {
    let m = DUPLICATION_RE.find(dest)?;
    Some(WHITESPACE_RE.replace_all(m.as_str(), " ").trim().to_string())
}

pub fn find_percent_artifact(dest: &str) -> Option<String> {
    let m = PERCENT_ARTIFACT_RE.find(dest)?;
    Some(WHITESPACE_RE.replace_all(m.as_str(), " ").trim().to_string())
}

/// First force-token glossary term used in the source whose target never shows up.
///
/// Regex entries are skipped; they over-match too easily for a report.
pub fn find_missing_force_token_term<'g>(
    source: &str,
    dest: &str,
    glossary: &'g [GlossaryEntry],
) -> Option<&'g GlossaryEntry> {
    let src = strip_ui_tokens(source);
    if is_blank(&src) {
        return None;
    }
    let dst = strip_ui_tokens(dest);
    glossary.iter().find(|entry| {
        let source_term = entry.source_term.trim();
        let target_term = entry.target_term.trim();
        entry.enabled
            && entry.force_mode == ForceMode::ForceToken
            && !source_term.is_empty()
            && !target_term.is_empty()
            && entry.match_mode != MatchMode::Regex
            && !contains_ci(&dst, target_term)
            && contains_source_term(&src, source_term, entry)
    })
}

fn contains_source_term(src: &str, term: &str, entry: &GlossaryEntry) -> bool {
    match entry.match_mode {
        MatchMode::Substring => contains_ci(src, term),
        MatchMode::WordBoundary if entry.is_builtin_reach() => {
            word_hits(src, term)
                .into_iter()
                .any(|(start, end)| !suppress_reach(src, &src[start..end], end))
        }
        MatchMode::WordBoundary => !word_hits(src, term).is_empty(),
        MatchMode::Regex => false,
    }
}

/// Case-insensitive occurrences of `term` standing as a whole word.
fn word_hits(text: &str, term: &str) -> Vec<(usize, usize)> {
    let mut hits = Vec::new();
    let mut pos = 0usize;
    while let Some((start, end)) = find_ci(text, term, pos) {
        let isolated = !prev_char(text, start).is_some_and(is_word_char)
            && !next_char(text, end).is_some_and(is_word_char);
        if isolated {
            hits.push((start, end));
        }
        pos = start + next_char(text, start).map_or(1, char::len_utf8);
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_english_is_untranslated() {
        assert!(is_likely_untranslated("Saarthal Amulet", "Saarthal  amulet"));
        assert!(!is_likely_untranslated("Iron", "Iron"));
        assert!(!is_likely_untranslated("<mag> 12345", "<mag> 12345"));
    }

    #[test]
    fn token_multiset_is_normalized() {
        assert!(!has_token_mismatch("Deal < MAG > damage [PageBreak]", "[pagebreak] <mag> 피해"));
        assert!(has_token_mismatch("Absorb <mag> points [pagebreak] __XT_ONE__.", "매지카 흡수"));
        assert!(has_token_mismatch("<mag> and <mag>", "<mag>"));
        assert!(!has_token_mismatch("No tokens here", "<mag>"));
    }

    #[test]
    fn missing_force_token_term() {
        let glossary = vec![GlossaryEntry::new(1, "Saarthal", "사아쌀")
            .with_match_mode(MatchMode::WordBoundary)
            .with_force_mode(ForceMode::ForceToken)];
        let missing = find_missing_force_token_term("Saarthal Amulet", "사르달 아뮬렛", &glossary);
        assert_eq!(missing.map(|e| e.target_term.as_str()), Some("사아쌀"));
        assert!(find_missing_force_token_term("Saarthal Amulet", "사아쌀 아뮬렛", &glossary).is_none());
        assert!(find_missing_force_token_term("Saarthals", "없음", &glossary).is_none());
    }

    #[test]
    fn builtin_reach_requires_place_name_usage() {
        let glossary = vec![GlossaryEntry::new(1, "Reach", "리치")
            .with_match_mode(MatchMode::WordBoundary)
            .with_force_mode(ForceMode::ForceToken)
            .with_note("Built-in default glossary (Skyrim)")];
        assert!(find_missing_force_token_term("Travel to the Reach.", "여행", &glossary).is_some());
        assert!(find_missing_force_token_term("Out of reach.", "닿지 않음", &glossary).is_none());
        assert!(find_missing_force_token_term("Reach level 10.", "10레벨 도달", &glossary).is_none());
    }

    #[test]
    fn particle_checks() {
        assert_eq!(find_doubled_particle("매지카을를 흡수합니다.").as_deref(), Some("을를"));
        assert_eq!(find_doubled_particle("매지카를 흡수합니다."), None);
        assert_eq!(
            find_hangul_particle_mismatch("매지카을 흡수합니다.").as_deref(),
            Some("매지카을 → 매지카를")
        );
        assert_eq!(find_hangul_particle_mismatch("매지카를 흡수합니다."), None);
        assert_eq!(
            find_roman_particle_mismatch("Magicka을 흡수합니다.").as_deref(),
            Some("Magicka을 → Magicka를")
        );
        assert_eq!(find_roman_particle_mismatch("Blood을 흡수합니다."), None);
        assert!(has_unresolved_particle_markers("매지카을(를) 흡수합니다."));
        assert!(has_unresolved_particle_markers("검(을) 를 든다"));
        assert!(!has_unresolved_particle_markers("매지카를 흡수합니다."));
    }

    #[test]
    fn artifact_examples() {
        assert_eq!(
            find_duplication_artifact("치명적인 마법부여 효과 효과가 발동합니다.").as_deref(),
            Some("효과 효과")
        );
        assert_eq!(find_duplication_artifact("<dur>초 초 동안 마비시킵니다.").as_deref(), Some("초 초"));
        assert_eq!(find_duplication_artifact("<dur>초 동안 마비시킵니다."), None);
        assert_eq!(
            find_percent_artifact("10%포인트의 추가 방어 보호를 얻습니다.").as_deref(),
            Some("10%포인트")
        );
        assert_eq!(
            find_percent_artifact("방패 피해가 밀어치기% 증가합니다.").as_deref(),
            Some("밀어치기%")
        );
        assert_eq!(find_percent_artifact("공격 시 10% 확률로 무장을 해제합니다."), None);
    }

    #[test]
    fn record_and_editor_id_keys() {
        assert_eq!(rec_base(Some(" mesg:000003 ")), "MESG");
        assert_eq!(rec_base(None), "");
        assert_eq!(normalize_edid_stem(Some("NPC_GREETING_001")), "NPC_GREETING");
        assert_eq!(normalize_edid_stem(Some("12345")), "");
        assert_eq!(normalize_edid_stem(Some("Guard-07")), "Guard");
    }

    #[test]
    fn residue_and_brackets() {
        assert!(has_english_residue("Aela을 (테스트"));
        assert!(!has_english_residue("<mag> 피해 [pagebreak] __XT_PH_0001__"));
        assert!(has_bracket_mismatch("Aela을 (테스트"));
        assert!(!has_bracket_mismatch("(괄호) [대괄호]"));
    }

    #[test]
    fn word_hits_are_case_insensitive_and_isolated() {
        assert_eq!(word_hits("Reach the reach, REACHING", "reach"), vec![(0, 5), (10, 15)]);
        assert_eq!(word_hits("용사 Dovah, dovahkiin", "DOVAH"), vec![(7, 12)]);
        assert!(word_hits("a.b", "").is_empty());
    }
}
