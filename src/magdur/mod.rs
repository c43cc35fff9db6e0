//! Repairs `<mag>`/`<dur>` placement in Korean translations of magic-effect descriptions.
//!
//! Known English effect templates are re-rendered from a fixed Korean sentence. Anything
//! else falls back to swapping the two placeholders when their usage looks inverted.

mod numeric;
mod templates;

use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::korean::particle;
use crate::textutil::{contains_hangul, group, is_blank, is_hangul_syllable, is_korean_language, replace_ci};

static MAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[+-]?<\s*mag\s*>").expect("mag regex"));
static DUR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[+-]?<\s*dur\s*>").expect("dur regex"));
static DUPLICATE_SIGN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?P<sign>[+-])\s*(?P<sign2>[+-])\s*<\s*mag\s*>").expect("duplicate sign regex")
});
static DUR_AS_AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[+-]?<\s*dur\s*>\s*(?:%|퍼센트|만큼|점|포인트|수치)").expect("dur amount regex")
});
static MAG_AS_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:[+-]?<\s*mag\s*>\s*%?\s*(?:초간|초|분|시간|일|주|개월|년|동안|간))|(?:(?:초간|초|분|시간|일|주|개월|년|동안|간)\s*[+-]?<\s*mag\s*>\s*%?)",
    )
    .expect("mag time regex")
});
static MAG_PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[+-]?<\s*mag\s*>\s*%").expect("mag percent regex"));
static DUR_PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[+-]?<\s*dur\s*>\s*%").expect("dur percent regex"));

const SWAP_SENTINEL: &str = "__XT_SWAP_TMP__";

const KNOWN_SUBJECTS_KO: [(&str, &str); 21] = [
    ("Health", "체력"),
    ("Magicka", "매지카"),
    ("Stamina", "지구력"),
    ("Carry Weight", "무게 한계"),
    ("Smithing", "제련"),
    ("Enchanting", "마법부여"),
    ("Two-Handed", "양손무기"),
    ("One-Handed", "한손무기"),
    ("Archery", "궁술"),
    ("Light Armor", "경갑"),
    ("Heavy Armor", "중갑"),
    ("Sneak", "은신"),
    ("Pickpocket", "소매치기"),
    ("Lockpicking", "자물쇠 따기"),
    ("Conjuration", "소환마법"),
    ("Destruction", "파괴마법"),
    ("Restoration", "회복마법"),
    ("Illusion", "환영마법"),
    ("Alteration", "변화마법"),
    ("Speech", "화술"),
    ("Alchemy", "연금술"),
];

const KNOWN_NAMES_KO: [(&str, &str); 1] = [("Golden Lightning", "황금 번개")];

/// Result of a template whose source pattern matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Replace the translation with this text.
    Rewritten(String),
    /// The template owns this source but the translation is acceptable as is.
    Keep,
}

pub(crate) type Render = fn(&Captures<'_>, &str) -> Outcome;

pub(crate) struct Template {
    name: &'static str,
    re: Regex,
    render: Render,
}

impl Template {
    fn new(name: &'static str, pattern: &str, render: Render) -> Self {
        Self {
            name,
            re: Regex::new(pattern).expect(name),
            render,
        }
    }
}

/// Tries each template in order; the first whose source pattern matches decides.
fn first_match(table: &[Template], source: &str, dest: &str) -> Option<Outcome> {
    table.iter().find_map(|template| {
        let caps = template.re.captures(source)?;
        let outcome = (template.render)(&caps, dest);
        debug!("magdur template {} matched: {outcome:?}", template.name);
        Some(outcome)
    })
}

/// Fixes `<mag>`/`<dur>` usage in `dest`, the translation of `source`.
///
/// Only applies when `target_lang` is Korean or `dest` already contains Hangul.
pub fn fix(source: &str, dest: &str, target_lang: &str) -> String {
    if !is_korean_language(target_lang) && !contains_hangul(dest) {
        return dest.to_string();
    }
    if is_blank(source) || is_blank(dest) {
        return dest.to_string();
    }

    let trimmed_source = source.trim();
    // Some effects use numeric placeholders such as "for <150> seconds" instead of <dur>.
    if let Some(Outcome::Rewritten(text)) = first_match(&numeric::TEMPLATES, trimmed_source, dest) {
        return text;
    }

    if !MAG_RE.is_match(dest) && !DUR_RE.is_match(dest) {
        return dest.to_string();
    }
    let dest = normalize_duplicate_signs(dest);

    match first_match(&templates::TEMPLATES, trimmed_source, &dest) {
        Some(Outcome::Rewritten(text)) => return text,
        Some(Outcome::Keep) | None => {}
    }

    if let Some((mag, dur)) = single_pair(&dest) {
        if looks_like_bad_usage(&dest) {
            debug!("magdur swapping {mag} and {dur}");
            return swap_once(&dest, &mag, &dur);
        }
    }
    dest
}

/// Collapses `++<mag>` / `--<mag>` (with optional spacing) into a single sign.
fn normalize_duplicate_signs(dest: &str) -> String {
    DUPLICATE_SIGN_RE
        .replace_all(dest, |caps: &Captures<'_>| {
            let sign = group(caps, "sign");
            if sign == group(caps, "sign2") {
                format!("{sign}<mag>")
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Strong signals that the placeholders were swapped or attached to the wrong unit.
pub(crate) fn looks_like_bad_usage(dest: &str) -> bool {
    DUR_AS_AMOUNT_RE.is_match(dest)
        || MAG_AS_TIME_RE.is_match(dest)
        || (!MAG_PERCENT_RE.is_match(dest) && DUR_PERCENT_RE.is_match(dest))
}

fn single_pair(dest: &str) -> Option<(String, String)> {
    let mut mags = MAG_RE.find_iter(dest);
    let mut durs = DUR_RE.find_iter(dest);
    let (mag, dur) = (mags.next()?, durs.next()?);
    if mags.next().is_some() || durs.next().is_some() {
        return None;
    }
    Some((mag.as_str().to_string(), dur.as_str().to_string()))
}

fn swap_once(text: &str, a: &str, b: &str) -> String {
    let working = replace_ci(text, a, SWAP_SENTINEL);
    let working = replace_ci(&working, b, a);
    replace_ci(&working, SWAP_SENTINEL, b)
}

fn cap<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    group(caps, name).trim()
}

fn lookup(table: &[(&str, &'static str)], key: &str) -> String {
    let key = key.trim();
    table
        .iter()
        .find(|(en, _)| en.eq_ignore_ascii_case(key))
        .map_or_else(|| key.to_string(), |(_, ko)| (*ko).to_string())
}

fn known_subject_ko(subject: &str) -> String {
    lookup(&KNOWN_SUBJECTS_KO, subject)
}

fn known_name_ko(name: &str) -> String {
    lookup(&KNOWN_NAMES_KO, name)
}

// Template nouns ending in Latin text or a tag keep the consonant-final particle.
fn subject_particle(noun: &str) -> &'static str {
    match noun.trim_end().chars().next_back() {
        Some(ch) if is_hangul_syllable(ch) => particle::subject(noun.trim_end()),
        _ => "이",
    }
}

fn object_particle(noun: &str) -> &'static str {
    match noun.trim_end().chars().next_back() {
        Some(ch) if is_hangul_syllable(ch) => particle::object(noun.trim_end()),
        _ => "을",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ko(source: &str, dest: &str) -> String {
        fix(source, dest, "ko-KR")
    }

    #[test]
    fn rewrites_regeneration_template_when_usage_is_bad() {
        let out = ko(
            "Magicka regenerates <mag>% slower for <dur> seconds.",
            "매지카<mag>% 동안 <dur> 재생 속도가 초 만큼 느려집니다.",
        );
        assert_eq!(out, "<dur>초 동안 매지카 재생 속도가 <mag>% 느려집니다.");
    }

    #[test]
    fn keeps_regeneration_translation_that_reads_correctly() {
        let dest = "<dur>초 동안 체력 재생 속도가 <mag>% 빨라집니다.";
        assert_eq!(ko("Health regenerates <mag>% faster for <dur> seconds.", dest), dest);
    }

    #[test]
    fn burn_attack_with_literal_duration() {
        let out = ko(
            "An attack which burns the enemy for 6 seconds, dealing <mag> points of damage to Health every second.",
            "적을 6초 동안 불태워, 매초 <mag> 수치에 체력포인트의 피해를 입히는 공격입니다.",
        );
        assert_eq!(out, "대상을 6초 동안 불태워 초당 체력에 <mag>포인트의 피해를 줍니다.");
    }

    #[test]
    fn lacerate_attack() {
        let out = ko(
            "An attack which lacerates the enemy causing it to bleed for 5 seconds, dealing <mag> points of damage to Health and Stamina every second.",
            "적을 찢어 5초 동안 출혈을 일으키며, <mag> 및 체력에게 초당 지구력포인트의 피해를 입히는 공격입니다.",
        );
        assert_eq!(out, "적을 찢어 5초 동안 출혈을 일으키며, 초당 체력과 지구력에 <mag>포인트의 피해를 줍니다.");
    }

    #[test]
    fn lightning_bolt_variants() {
        let leaps = ko(
            "Lightning bolt that does <mag> points of shock damage to Health and half to Magicka, then leaps to a new target.",
            "<mag>에게 체력포인트의 전격 피해를 입히고 매지카에게는 그 절반의 피해를 입힌 뒤, 새로운 대상에게 전이되는 전격 화살입니다.",
        );
        assert_eq!(
            leaps,
            "체력에 <mag>포인트의 전격 피해를 주고, 매지카에는 그 절반의 피해를 준 뒤 새로운 대상에게 전이되는 번개 화살을 발사합니다."
        );
        let plain = ko(
            "A bolt of lightning that does <mag> points of shock damage to Health and half that to Magicka.",
            "<mag>에게 체력포인트의 전격 피해를 주고, 매지카에게는 그 절반의 피해를 주는 번개 화살을 발사합니다.",
        );
        assert_eq!(
            plain,
            "체력에 <mag>포인트의 전격 피해를 주고, 매지카에는 그 절반의 피해를 주는 번개 화살을 발사합니다."
        );
    }

    #[test]
    fn drains_points_from_lowercase_attribute() {
        assert_eq!(
            ko("Drains <mag> points from stamina.", "<mag>에서 지구력포인트를 흡수합니다."),
            "지구력에서 <mag>포인트를 흡수합니다."
        );
    }

    #[test]
    fn poison_on_non_dwarven_targets() {
        let out = ko(
            "Causes <mag> points of poison damage on non dwarven targets for <dur> seconds.",
            "드워프가 아닌 대상에게 <mag>초 동안 <dur>만큼의 독 피해를 입힙니다.",
        );
        assert!(out.contains("<dur>초"));
        assert!(out.contains("<mag>포인트"));
        assert!(!out.contains("<mag>초"));
        assert!(!out.contains("<dur>만큼"));
    }

    #[test]
    fn beams_drop_misplaced_particles() {
        let out = ko(
            "A stream of cold that does <mag> points of damage per second to Health and Stamina.",
            "<mag>와(과) 체력에게 초당 지구력만큼의 냉기 피해를 주는 냉기 줄기를 발사합니다.",
        );
        assert!(out.contains("초당"));
        assert!(!out.contains("<mag>와"));
        assert!(!out.contains("지구력만큼"));

        let out = ko(
            "A ray of fire that does <mag> points of damage per second. Targets on fire take extra damage.",
            "<mag>에게 초당 화염 피해를 주는 불꽃 광선입니다. 불타는 대상은 추가 피해를 받습니다.",
        );
        assert!(!out.contains("<mag>에게"));
        assert!(out.contains("<mag>포인트"));
    }

    #[test]
    fn restore_uses_object_particle() {
        assert_eq!(ko("Restore <mag> points of Health.", "<mag> 체력 회복"), "체력을 <mag>포인트 회복합니다.");
        assert_eq!(ko("Restores <mag> points of Magicka.", "<mag> 매지카 회복"), "매지카를 <mag>포인트 회복합니다.");
    }

    #[test]
    fn fortify_list_joins_known_skills() {
        let out = ko(
            "Fortifies Smithing and Enchanting skills by <mag> points and Health by <mag> points for <dur> seconds.",
            "<mag>초 동안 제련 <dur>",
        );
        assert_eq!(out, "<dur>초 동안 제련 및 마법부여 기술이 <mag>포인트, 체력이 <mag>포인트 증가합니다.");
    }

    #[test]
    fn shock_cloak_uses_known_name() {
        let out = ko(
            "Golden Lightning that does <mag> points of shock damage per second to Health and Magicka, with a chance of disintegrating opponents.",
            "<mag> 황금 번개",
        );
        assert_eq!(out, "체력과 매지카에 초당 <mag>의 전격 피해를 입히며, 일정 확률로 적을 분해하는 황금 번개입니다.");
    }

    #[test]
    fn numeric_form_duration_is_reordered() {
        let out = ko(
            "Take on the form of the Werewolf for <150> seconds.",
            "늑대인간 초 동안 <150>의 형상을 취합니다.",
        );
        assert_eq!(out, "<150>초 동안 늑대인간의 형상을 취합니다.");
    }

    #[test]
    fn numeric_templates_apply_without_mag_or_dur() {
        let out = ko("Damage taken is reduced <25>% during the Action Surge.", "받는 피해 <25>% 감소");
        assert_eq!(out, "액션 서지 동안 받는 피해가 <25>% 감소합니다.");
    }

    #[test]
    fn swaps_placeholders_when_usage_is_inverted() {
        let out = ko(
            "Your strikes hit harder by <mag> points for <dur> seconds.",
            "<mag>초 동안 공격력이 <dur>포인트 증가합니다.",
        );
        assert_eq!(out, "<dur>초 동안 공격력이 <mag>포인트 증가합니다.");
    }

    #[test]
    fn swap_carries_signs() {
        let out = ko("Unknown effect.", "+<mag>초 동안 공격력이 <dur>만큼 증가합니다.");
        assert_eq!(out, "<dur>초 동안 공격력이 +<mag>만큼 증가합니다.");
    }

    #[test]
    fn collapses_duplicate_signs() {
        assert_eq!(normalize_duplicate_signs("공격력 ++<mag> 증가"), "공격력 +<mag> 증가");
        assert_eq!(normalize_duplicate_signs("공격력 - - <MAG> 감소"), "공격력 -<mag> 감소");
        assert_eq!(normalize_duplicate_signs("공격력 +-<mag>"), "공격력 +-<mag>");
    }

    #[test]
    fn leaves_non_korean_and_plain_text_alone() {
        let dest = "Regenerates <dur>% for <mag> seconds.";
        assert_eq!(fix("Health regenerates <mag>% faster for <dur> seconds.", dest, "en"), dest);
        let dest = "체력이 회복됩니다.";
        assert_eq!(ko("Health is restored.", dest), dest);
        assert_eq!(ko("", "<mag>초"), "<mag>초");
    }

    #[test]
    fn template_particles_default_to_consonant_form() {
        assert_eq!(subject_particle("체력"), "이");
        assert_eq!(subject_particle("매지카"), "가");
        assert_eq!(subject_particle("Dragonrend"), "이");
        assert_eq!(object_particle("<attr>"), "을");
    }
}
