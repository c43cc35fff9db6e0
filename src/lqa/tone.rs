use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::heuristics::strip_ui_tokens;
use super::LqaThresholds;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ToneKind {
    Unknown,
    Hamnida,
    Haeyo,
    PlainDa,
    Casual,
}

impl fmt::Display for ToneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ToneKind::Unknown => "Unknown",
            ToneKind::Hamnida => "Hamnida",
            ToneKind::Haeyo => "Haeyo",
            ToneKind::PlainDa => "PlainDa",
            ToneKind::Casual => "Casual",
        })
    }
}

const TRAILING_PUNCT: &[char] = &[
    ' ', '\t', '\r', '\n', '.', ',', '!', '?', '…', '"', '\'', '”', '’', ')', ']', '」', '』',
];

const FORMAL_ENDINGS: &[&str] = &[
    "습니다", "읍니다", "입니다", "합니다", "됩니까", "됩시다", "십시오", "습니까",
];

/// Classifies the sentence-final register of a Korean line.
pub fn classify(text: &str) -> ToneKind {
    let stripped = strip_ui_tokens(text);
    let t = stripped.trim().trim_end_matches(TRAILING_PUNCT);
    if t.is_empty() {
        return ToneKind::Unknown;
    }
    if FORMAL_ENDINGS.iter().any(|e| t.ends_with(e)) {
        return ToneKind::Hamnida;
    }
    if t.ends_with("나요") || t.ends_with("군요") || t.ends_with('요') {
        return ToneKind::Haeyo;
    }
    if t.ends_with('다') {
        return ToneKind::PlainDa;
    }
    if ['해', '야', '지', '냐', '라'].iter().any(|c| t.ends_with(*c)) {
        return ToneKind::Casual;
    }
    ToneKind::Unknown
}

/// The tone a record type is expected to use, if any.
pub fn expected_for_rec(rec_base: &str) -> Option<ToneKind> {
    match rec_base {
        "BOOK" => Some(ToneKind::PlainDa),
        "QUST" | "MESG" => Some(ToneKind::Hamnida),
        _ => None,
    }
}

/// Dominant tone of a group, when one clearly leads.
///
/// Unknown tones are ignored. Ties keep the tone counted first.
pub fn majority(tones: &[ToneKind], thresholds: &LqaThresholds) -> Option<ToneKind> {
    let mut order: Vec<ToneKind> = Vec::new();
    let mut counts: HashMap<ToneKind, usize> = HashMap::new();
    let mut total = 0usize;
    for &tone in tones.iter().filter(|t| **t != ToneKind::Unknown) {
        total += 1;
        let count = counts.entry(tone).or_insert(0);
        if *count == 0 {
            order.push(tone);
        }
        *count += 1;
    }
    if total < thresholds.tone_min_classified || order.len() < 2 {
        return None;
    }

    let mut best: Option<(ToneKind, usize)> = None;
    for tone in order {
        let count = counts.get(&tone).copied().unwrap_or(0);
        if best.map_or(true, |(_, b)| count > b) {
            best = Some((tone, count));
        }
    }
    let (tone, count) = best?;
    if count < thresholds.tone_min_leading {
        return None;
    }
    let ratio = count as f64 / total as f64;
    (ratio >= thresholds.tone_majority_ratio).then_some(tone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_endings() {
        assert_eq!(classify("안내합니다."), ToneKind::Hamnida);
        assert_eq!(classify("준비되었습니까?"), ToneKind::Hamnida);
        assert_eq!(classify("이제 가요."), ToneKind::Haeyo);
        assert_eq!(classify("그랬군요!"), ToneKind::Haeyo);
        assert_eq!(classify("검을 든다."), ToneKind::PlainDa);
        assert_eq!(classify("빨리 해!"), ToneKind::Casual);
        assert_eq!(classify("「어디 가냐」"), ToneKind::Casual);
        assert_eq!(classify("<mag>"), ToneKind::Unknown);
        assert_eq!(classify("Sword"), ToneKind::Unknown);
        // Only the listed formal endings count; other -ㅂ니다 forms read as plain.
        assert_eq!(classify("피해를 줍니다."), ToneKind::PlainDa);
    }

    #[test]
    fn classify_ignores_trailing_tokens() {
        assert_eq!(classify("피해를 흡수합니다. [pagebreak]"), ToneKind::Hamnida);
    }

    #[test]
    fn majority_needs_a_clear_leader() {
        let t = LqaThresholds::default();
        use ToneKind::*;
        assert_eq!(majority(&[Hamnida, Hamnida, Hamnida, Haeyo], &t), Some(Hamnida));
        assert_eq!(majority(&[Hamnida, Haeyo], &t), None);
        assert_eq!(majority(&[Hamnida, Hamnida, Hamnida, Hamnida], &t), None);
        assert_eq!(majority(&[Hamnida, Hamnida, Haeyo, Haeyo, Casual], &t), None);
        assert_eq!(majority(&[Hamnida, Hamnida, Hamnida, Unknown, Casual], &t), Some(Hamnida));
    }

    #[test]
    fn expected_tone_by_record() {
        assert_eq!(expected_for_rec("BOOK"), Some(ToneKind::PlainDa));
        assert_eq!(expected_for_rec("MESG"), Some(ToneKind::Hamnida));
        assert_eq!(expected_for_rec("DIAL"), None);
    }
}
