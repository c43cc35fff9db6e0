//! Deterministic Korean grammar repair for model output.

pub mod particle;
pub mod protect_from;
mod steps;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::textutil::{is_blank, is_korean_language, strip_invisible};

static DUPLICATE_EFFECT_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"효과\s+효과").expect("duplicate effect regex"));

type Step = (&'static str, fn(&str) -> String);

const STEPS: [Step; 5] = [
    ("parenthesized_particle", steps::parenthesized_particles),
    ("attached_separated_particle", steps::attached_separated_particles),
    ("stat_and_subject_particle", steps::stat_and_subject_particles),
    ("duration_probability", steps::duration_probability),
    ("artifact_cleanup", steps::artifact_cleanup),
];

/// Runs the particle and artifact repair steps. No-op unless `target_lang` is Korean.
pub fn fix(target_lang: &str, text: &str) -> String {
    if !is_korean_language(target_lang) || is_blank(text) {
        return text.to_string();
    }
    let mut working = strip_invisible(text);
    if working.contains("효과") {
        working = DUPLICATE_EFFECT_WORD_RE.replace_all(&working, "효과").into_owned();
    }
    for (name, step) in STEPS {
        let next = step(&working);
        if next != working {
            debug!("korean fix step {name}: {working:?} -> {next:?}");
            working = next;
        }
    }
    working
}

#[cfg(test)]
mod tests {
    use super::fix;

    fn ko(text: &str) -> String {
        fix("ko", text)
    }

    #[test]
    fn resolves_parenthesized_markers() {
        assert_eq!(ko("체력 을(를) 흡수합니다."), "체력을 흡수합니다.");
        assert_eq!(ko("매지카을(를) 흡수합니다."), "매지카를 흡수합니다.");
        assert_eq!(ko("Aela은(는) 동료입니다."), "Aela는 동료입니다.");
        assert_eq!(ko("검과(와) 방패"), "검과 방패");
        assert_eq!(ko("화이트런(으)로 이동"), "화이트런으로 이동");
        assert_eq!(ko("동료이(가) 합류합니다."), "동료가 합류합니다.");
    }

    #[test]
    fn repairs_attached_and_separated_particles() {
        assert_eq!(ko("블러드 을"), "블러드를");
        assert_eq!(ko("검를— 듭니다."), "검을— 듭니다.");
        assert_eq!(ko("Skyrim를 지킵니다."), "Skyrim을 지킵니다.");
        assert_eq!(ko("저는은 괜찮습니다."), "저는 괜찮습니다.");
    }

    #[test]
    fn keeps_attributive_endings() {
        assert_eq!(ko("달이 떠있는 동안"), "달이 떠있는 동안");
        assert_eq!(ko("가을 하늘"), "가을 하늘");
    }

    #[test]
    fn fixes_stat_datives_and_spaced_subjects() {
        assert_eq!(ko("체력에게 피해를 줍니다."), "체력에 피해를 줍니다.");
        assert_eq!(ko("매지카에게서 흡수합니다."), "매지카에서 흡수합니다.");
        assert_eq!(ko("중갑 가 <mag> 증가합니다."), "중갑이 <mag> 증가합니다.");
    }

    #[test]
    fn reorders_stranded_durations() {
        assert_eq!(
            ko("늑대인간초 동안 <150>초 의 형상을 취합니다."),
            "<150>초 동안 늑대인간의 형상을 취합니다."
        );
        assert_eq!(
            ko("피해를 입으면 <25%> <5>초 동안 확률로 투명해집니다."),
            "피해를 입으면 <25%> 확률로 <5>초 동안 투명해집니다."
        );
    }

    #[test]
    fn cleans_known_artifacts() {
        assert_eq!(ko("효과 효과가 사라집니다."), "효과가 사라집니다.");
        assert_eq!(ko("습격이다! 무기를 물건 전달!"), "습격이다! 무기를 내려!");
        assert_eq!(ko("무기 물건 전달하세요."), "무기를 내리세요.");
        assert_eq!(ko("은신하기 상태가 됩니다."), "은신 상태가 됩니다.");
        assert_eq!(
            ko("<15>포인트 체력포인트를 흡수하고 <7><3>초 동안 포인트초포인트의 출혈 피해를 입힙니다."),
            "<15>포인트 체력을 흡수하고 <3>초 동안 <7>포인트의 출혈 피해를 입힙니다."
        );
    }

    #[test]
    fn other_languages_pass_through() {
        assert_eq!(fix("ja", "체력 을(를)"), "체력 을(를)");
        assert_eq!(fix("ko", "   "), "   ");
    }
}
