//! Time/rate/amount unit repair for short effect strings translated into Korean.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::textutil::{group, is_blank, is_korean_language, replace_guarded, strip_invisible};

pub const DEFAULT_MAX_CHARS: usize = 2000;

const UNIT_SECONDS_TAG: &str = "<XT_SEC>";
const UNIT_PER_SECOND_TAG: &str = "<XT_PER_SEC>";
const UNIT_POINTS_TAG: &str = "<XT_PT>";

const TIME_UNITS: [&str; 8] = ["초간", "초", "분", "시간", "일", "주", "개월", "년"];

static PER_SECOND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:per|every|each)\s+second\b").expect("per second regex"));
static ANY_PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[+-]?<[^>]+>").expect("placeholder regex"));
static PLACEHOLDER_SECONDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?P<ph>[+-]?<[^>]+>)\s*seconds?\b").expect("placeholder seconds regex")
});
static SOURCE_HAS_POINTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bpoints?\b").expect("points regex"));
static POINTS_AFTER_PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<tok>[+-]?<[^>]+>)\s*포인트(?P<post>(?:의|가|이|을|를|은|는|도|만|까지|부터)?\b)?")
        .expect("points ko regex")
});
static NUMERIC_ANGLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?<\s*(?P<n>[0-9]+)\s*>$").expect("numeric angle regex"));
static DUR_ANGLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[+-]?<\s*dur\s*>$").expect("dur angle regex"));
static MAG_ANGLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[+-]?<\s*mag\s*>$").expect("mag angle regex"));
static HAS_PER_SECOND_KO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:초\s*당|매\s*초|초\s*마다)\b").expect("per second ko regex"));
static RATE_SPACING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<prev>[가-힣A-Za-z])초당\b").expect("rate spacing regex"));
static RATE_GAP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"초당\s+<").expect("rate gap regex"));
static TIGHTEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<v>[+-]?<[^>]+>|\b[0-9]+(?:\.[0-9]+)?\b)\s+(?P<unit>초|포인트)\b")
        .expect("tighten regex")
});

#[derive(Debug, Default)]
struct UnitPlan {
    dur_seconds: bool,
    numeric_seconds: BTreeSet<String>,
    per_second: bool,
    strip_points: bool,
}

impl UnitPlan {
    fn is_noop(&self) -> bool {
        !self.dur_seconds && self.numeric_seconds.is_empty() && !self.per_second && !self.strip_points
    }
}

/// Makes the Korean translation carry the units the English source implies.
///
/// `<dur> seconds` gains `초`, a `per second` rate gains `초당`, and `포인트` is dropped
/// after placeholders when the source never says "points".
pub fn enforce_units_from_source(target_lang: &str, source: &str, translated: &str) -> String {
    enforce_units_with_limit(target_lang, source, translated, DEFAULT_MAX_CHARS)
}

pub fn enforce_units_with_limit(
    target_lang: &str,
    source: &str,
    translated: &str,
    max_chars: usize,
) -> String {
    if !is_korean_language(target_lang) || is_blank(source) || is_blank(translated) {
        return translated.to_string();
    }
    if source.chars().count() > max_chars || translated.chars().count() > max_chars {
        return translated.to_string();
    }

    let working = strip_invisible(translated);
    let plan = analyze(source, &working);
    if plan.is_noop() {
        return working;
    }
    apply_plan(source, working, &plan)
}

fn analyze(source: &str, translated: &str) -> UnitPlan {
    let mut plan = UnitPlan {
        strip_points: translated.contains('<')
            && translated.contains("포인트")
            && !SOURCE_HAS_POINTS_RE.is_match(source),
        per_second: PER_SECOND_RE.is_match(source),
        ..UnitPlan::default()
    };
    for caps in PLACEHOLDER_SECONDS_RE.captures_iter(source) {
        let ph = group(&caps, "ph");
        if DUR_ANGLE_RE.is_match(ph) {
            plan.dur_seconds = true;
        } else if let Some(num) = NUMERIC_ANGLE_RE.captures(ph) {
            plan.numeric_seconds.insert(group(&num, "n").to_string());
        }
    }
    plan
}

fn apply_plan(source: &str, mut working: String, plan: &UnitPlan) -> String {
    if plan.dur_seconds {
        working = ensure_time_unit_after(&working, r"[+-]?<\s*dur\s*>");
    }
    for n in &plan.numeric_seconds {
        working = ensure_time_unit_after(&working, &format!(r"[+-]?<\s*{}\s*>", regex::escape(n)));
    }
    if plan.per_second {
        if let Some(pattern) = rate_token_pattern(source) {
            working = ensure_rate_word_before(&working, &pattern);
        }
    }
    if plan.strip_points {
        working = POINTS_AFTER_PLACEHOLDER_RE
            .replace_all(&working, |caps: &regex::Captures<'_>| {
                format!("{}{}", group(caps, "tok"), group(caps, "post"))
            })
            .into_owned();
    }
    tighten_unit_spacing(&working)
}

fn ensure_time_unit_after(text: &str, token_pattern: &str) -> String {
    let Ok(re) = Regex::new(&format!(r"(?i)(?P<tok>{token_pattern})(?P<ws>\s*)")) else {
        return text.to_string();
    };
    replace_guarded(
        &re,
        text,
        |hay, caps| {
            let end = caps.get(0).map_or(hay.len(), |m| m.end());
            let rest = &hay[end..];
            !TIME_UNITS.iter().any(|unit| rest.starts_with(unit))
        },
        |caps| format!("{}초{}", group(caps, "tok"), group(caps, "ws")),
    )
}

fn rate_token_pattern(source: &str) -> Option<String> {
    let per_second = PER_SECOND_RE.find(source)?;
    let token = ANY_PLACEHOLDER_RE
        .find_iter(source)
        .take_while(|m| m.start() < per_second.start())
        .last()?
        .as_str()
        .trim();
    if MAG_ANGLE_RE.is_match(token) {
        return Some(r"[+-]?<\s*mag\s*>".to_string());
    }
    let num = NUMERIC_ANGLE_RE.captures(token)?;
    Some(format!(r"[+-]?<\s*{}\s*>", regex::escape(group(&num, "n"))))
}

fn ensure_rate_word_before(text: &str, token_pattern: &str) -> String {
    if HAS_PER_SECOND_KO_RE.is_match(text) {
        return text.to_string();
    }
    let Ok(token_re) = RegexBuilder::new(token_pattern).case_insensitive(true).build() else {
        return text.to_string();
    };
    let Some(m) = token_re.find(text) else {
        return text.to_string();
    };
    let mut working = String::with_capacity(text.len() + 8);
    working.push_str(&text[..m.start()]);
    working.push_str("초당 ");
    working.push_str(&text[m.start()..]);
    let working = RATE_SPACING_RE.replace_all(&working, "$prev 초당");
    RATE_GAP_RE.replace_all(&working, "초당 <").into_owned()
}

fn tighten_unit_spacing(text: &str) -> String {
    if !text.contains(' ') {
        return text.to_string();
    }
    TIGHTEN_RE.replace_all(text, "${v}${unit}").into_owned()
}

/// Expands internal unit tags (`<XT_SEC>`, `<XT_PT>`, `<XT_PER_SEC>`) left in an unmasked translation.
pub fn replace_units_after_unmask(target_lang: &str, text: &str) -> String {
    if !is_korean_language(target_lang) || is_blank(text) || !text.contains('<') {
        return text.to_string();
    }
    let working = text
        .replace(UNIT_PER_SECOND_TAG, "초당")
        .replace(UNIT_POINTS_TAG, "포인트")
        .replace(UNIT_SECONDS_TAG, "초");
    tighten_unit_spacing(&working)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_seconds_after_dur() {
        let out = enforce_units_from_source(
            "ko",
            "Deals <mag> damage for <dur> seconds.",
            "<mag> <dur> 동안 피해를 입힙니다.",
        );
        assert_eq!(out, "<mag> <dur>초 동안 피해를 입힙니다.");
    }

    #[test]
    fn adds_seconds_after_numeric_durations_only() {
        let out = enforce_units_from_source(
            "ko-KR",
            "Restores <40> Stamina over <15> seconds.",
            "<40> <15> 동안 지구력을 회복합니다.",
        );
        assert_eq!(out, "<40> <15>초 동안 지구력을 회복합니다.");
    }

    #[test]
    fn keeps_existing_time_unit() {
        let out = enforce_units_from_source("ko", "For <dur> seconds.", "<dur>초 동안.");
        assert_eq!(out, "<dur>초 동안.");
    }

    #[test]
    fn strips_points_the_source_never_mentioned() {
        let out = enforce_units_from_source(
            "ko",
            "Target takes <mag> fire damage.",
            "대상이 <mag>포인트의 화염 피해를 입습니다.",
        );
        assert_eq!(out, "대상이 <mag>의 화염 피해를 입습니다.");
    }

    #[test]
    fn invisible_separators_do_not_duplicate_units() {
        let out = enforce_units_from_source(
            "ko",
            "Paralyzes the target for <dur> seconds.",
            "<dur>\u{200B}초 동안 마비시킵니다.",
        );
        assert_eq!(out, "<dur>초 동안 마비시킵니다.");
    }

    #[test]
    fn inserts_rate_word_for_per_second_sources() {
        let out = enforce_units_from_source(
            "ko",
            "Does <mag> points of fire damage per second.",
            "<mag>의 화염 피해를 줍니다.",
        );
        assert_eq!(out, "초당 <mag>의 화염 피해를 줍니다.");
    }

    #[test]
    fn rate_word_before_numeric_magnitude() {
        let out = enforce_units_from_source(
            "ko",
            "For <150> seconds, nearby enemies take <8> points of damage per second.",
            "<150>초 동안 근접한 적에게 <8>의 피해를 줍니다.",
        );
        assert_eq!(out, "<150>초 동안 근접한 적에게 초당 <8>의 피해를 줍니다.");
    }

    #[test]
    fn non_korean_is_untouched() {
        let text = "<mag> <dur> dégâts";
        assert_eq!(enforce_units_from_source("fr", "for <dur> seconds", text), text);
    }

    #[test]
    fn expands_unit_tags_after_unmask() {
        let out = replace_units_after_unmask("ko", "for <dur> <XT_SEC> and <mag> <XT_PT> <XT_PER_SEC>");
        assert_eq!(out, "for <dur>초 and <mag>포인트 초당");
    }
}
