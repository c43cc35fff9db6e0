//! Effect templates keyed on the English source, checked in order.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{
    cap, known_name_ko, known_subject_ko, looks_like_bad_usage, object_particle, subject_particle, Outcome,
    Template,
};
use crate::textutil::{contains_ci, group};

static STANDARD_IMMUNITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bdoes\s+not\s+work\s+on\s+undead,\s*dragons,\s*daedra(?:,)?\s*or\s*machines\b")
        .expect("standard immunity regex")
});
static LIST_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:,|\b(?:and|och)\b)\s*").expect("list separator regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

const IMMUNITY_KO: &str = " 언데드, 드래곤, 데이드라, 기계 장치에게는 효과가 없습니다.";

fn rewritten(text: String) -> Outcome {
    Outcome::Rewritten(text)
}

/// Templates that only apply when the translation's placeholder usage already looks wrong.
fn when_bad(dest: &str, render: impl FnOnce() -> String) -> Outcome {
    if looks_like_bad_usage(dest) {
        Outcome::Rewritten(render())
    } else {
        Outcome::Keep
    }
}

pub(super) static TEMPLATES: Lazy<Vec<Template>> = Lazy::new(|| {
    let mut table = Vec::new();
    table.extend(basic_effects());
    table.extend(beams());
    table.extend(projectiles());
    table.extend(area_effects());
    table.extend(drains_and_creatures());
    table.extend(cloaks());
    table.extend(absorb_and_shock());
    table.extend(fortify_and_weaken());
    table.extend(loss_and_recovery_mirrors());
    table.extend(bad_usage());
    table
});

fn basic_effects() -> Vec<Template> {
    vec![
        Template::new(
            "restore_attribute",
            r"(?i)^Restore(?:s)?\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+(?P<attr>Health|Magicka|Stamina)\.?\s*$",
            |caps, _| {
                let attr = known_subject_ko(cap(caps, "attr"));
                rewritten(format!("{attr}{} {}포인트 회복합니다.", object_particle(&attr), cap(caps, "mag")))
            },
        ),
        Template::new(
            "thunder_half_magicka",
            r"(?i)^A\s+Thunder\s+that\s+does\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+shock\s+damage\s+to\s+Health\s+and\s+half\s+that\s+to\s+Magicka\.?$",
            |caps, _| {
                rewritten(format!(
                    "체력에 {}포인트의 전격 피해를 주고, 매지카에는 그 절반의 피해를 주는 벼락입니다.",
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "frost_over_time_plus_stamina",
            r"(?i)^Targets\s+take\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+frost\s+damage\s+for\s+(?P<dur><\s*dur\s*>)\s+seconds,\s+plus\s+Stamina\s+damage\.?$",
            |caps, _| {
                rewritten(format!(
                    "{}초 동안 대상은 {}포인트의 냉기 피해를 입으며, 추가로 지구력 피해를 받습니다.",
                    cap(caps, "dur"),
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "blast_of_cold",
            r"(?i)^A\s+blast\s+of\s+cold\s+that\s+does\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+damage\s+per\s+second\s+to\s+Health\s+and\s+Stamina\.?$",
            |caps, _| {
                rewritten(format!(
                    "체력과 지구력에 초당 {}포인트의 냉기 피해를 주는 한기 폭발을 일으킵니다.",
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "burning_attack",
            r"(?i)^An\s+attack\s+(?:which|that)\s+burns\s+the\s+enemy\s+for\s+(?P<dur>[+-]?<\s*(?:dur|\d+)\s*>|\b[0-9]+(?:\.[0-9]+)?\b)\s+seconds(?:,)?\s+dealing\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+damage\s+to\s+Health\s+(?:(?:every|each)\s+second|per\s+second)\.?\s*$",
            |caps, _| {
                rewritten(format!(
                    "대상을 {}초 동안 불태워 초당 체력에 {}포인트의 피해를 줍니다.",
                    cap(caps, "dur"),
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "lacerating_attack",
            r"(?i)^An\s+attack\s+(?:which|that)\s+lacerates\s+the\s+enemy\s+causing\s+it\s+to\s+bleed\s+for\s+(?P<dur>\b[0-9]+(?:\.[0-9]+)?\b)\s+seconds(?:,)?\s+dealing\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+damage\s+to\s+Health\s+and\s+Stamina\s+(?:(?:every|each)\s+second|per\s+second)\.?\s*$",
            |caps, _| {
                rewritten(format!(
                    "적을 찢어 {}초 동안 출혈을 일으키며, 초당 체력과 지구력에 {}포인트의 피해를 줍니다.",
                    cap(caps, "dur"),
                    cap(caps, "mag")
                ))
            },
        ),
    ]
}

fn beams() -> Vec<Template> {
    vec![
        Template::new(
            "stream_of_cold",
            r"(?i)^A\s+stream\s+of\s+cold\s+that\s+does\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+damage\s+per\s+second\s+to\s+Health\s+and\s+Stamina\.?$",
            |caps, _| {
                rewritten(format!(
                    "체력과 지구력에 초당 {}포인트의 피해를 주는 냉기 줄기를 발사합니다.",
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "ray_of_fire",
            r"(?i)^A\s+ray\s+of\s+fire\s+that\s+does\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+damage\s+per\s+second\.\s*Targets\s+on\s+fire\s+take\s+extra\s+damage\.?$",
            |caps, _| {
                rewritten(format!(
                    "초당 {}포인트의 피해를 주는 화염 광선을 발사합니다. 불타는 대상은 추가 피해를 받습니다.",
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "lightning_beam",
            r"(?i)^Lightning\s+beam\s+that\s+does\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+shock\s+damage\s+to\s+Health\s+and\s+Magicka\s+per\s+second\.?$",
            |caps, _| {
                rewritten(format!(
                    "체력과 매지카에 초당 {}포인트의 전격 피해를 주는 번개 광선을 발사합니다.",
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "burst_of_steam",
            r"(?i)^A\s+burst\s+of\s+steam\s+that\s+does\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+damage\s+per\s+second\.?$",
            |caps, _| rewritten(format!("초당 {}포인트의 피해를 주는 증기 폭발을 일으킵니다.", cap(caps, "mag"))),
        ),
    ]
}

fn projectiles() -> Vec<Template> {
    vec![
        Template::new(
            "damage_over_time",
            r"(?i)^Targets\s+take\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+damage\s+for\s+(?P<dur><\s*dur\s*>)\s+seconds\.?$",
            |caps, _| {
                rewritten(format!(
                    "{}초 동안 대상은 {}포인트의 피해를 입습니다.",
                    cap(caps, "dur"),
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "seismic_wave",
            r"(?i)^A\s+seismic\s+wave\s+that\s+staggers\s+enemies\s+in\s+front\s+of\s+you,\s+dealing\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+damage\.?$",
            |caps, _| {
                rewritten(format!(
                    "앞에 있는 적들을 비틀거리게 하는 지진파를 일으켜 {}포인트의 피해를 줍니다.",
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "thrown_rocks",
            r"(?i)^A\s+pile\s+of\s+thrown\s+rocks\s+that\s+does\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+damage\s+and\s+staggers\s+your\s+foe\.?$",
            |caps, _| {
                rewritten(format!(
                    "던져진 바위 더미가 {}포인트의 피해를 주고 적을 비틀거리게 합니다.",
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "spear_of_stone",
            r"(?i)^A\s+spear\s+of\s+stone\s+that\s+does\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+damage\s+and\s+staggers\s+your\s+foe\.?$",
            |caps, _| rewritten(format!("돌 창이 {}포인트의 피해를 주고 적을 비틀거리게 합니다.", cap(caps, "mag"))),
        ),
    ]
}

fn area_effects() -> Vec<Template> {
    vec![
        Template::new(
            "shocking_explosion",
            r"(?i)^A\s+(?P<mag><\s*mag\s*>)\s+point\s+Shocking\s+explosion\s+centered\s+on\s+the\s+caster\.\s*Does\s+more\s+damage\s+to\s+closer\s+targets\.?$",
            |caps, _| {
                rewritten(format!(
                    "시전자 중심으로 {}포인트의 전격 폭발을 일으킵니다. 가까이 있는 대상일수록 더 큰 피해를 받습니다.",
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "fiery_breath",
            r"(?i)^Releases\s+a\s+fiery\s+breath\s+for\s+(?P<mag><\s*mag\s*>)\s+damages?\.?$",
            |caps, _| rewritten(format!("화염 숨결을 내뿜어 {}의 피해를 줍니다.", cap(caps, "mag"))),
        ),
        Template::new(
            "close_dwarven_targets",
            r"(?i)^damages\s+close\s+Dwarven\s+targets\s+by\s+(?P<mag><\s*mag\s*>)\s+points?\.?$",
            |caps, _| {
                rewritten(format!(
                    "근처의 드워머(드워프) 자동기계에게 {}포인트의 피해를 줍니다.",
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "poison_non_dwarven",
            r"(?i)^Causes\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+poison\s+damage\s+on\s+non\s+dwarven\s+targets\s+for\s+(?P<dur><\s*dur\s*>)\s+seconds\.?$",
            |caps, _| {
                rewritten(format!(
                    "{}초 동안 드워머(드워프) 자동기계를 제외한 대상에게 {}포인트의 독 피해를 줍니다.",
                    cap(caps, "dur"),
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "frozen_between_planes",
            r"(?i)^Targets\s+are\s+frozen\s+between\s+Oblivion\s+and\s+Tamriel\s+for\s+(?P<dur><\s*dur\s*>)\s+seconds(?:,)?\s+and\s+immune\s+to\s+all\s+damage\.?$",
            |caps, _| {
                rewritten(format!(
                    "{}초 동안 대상은 오블리비언과 탐리엘 사이에 얼어붙어 모든 피해에 면역이 됩니다.",
                    cap(caps, "dur")
                ))
            },
        ),
        Template::new(
            "lightning_bolt",
            r"(?i)^(?:Lightning\s+bolt|A\s+bolt\s+of\s+lightning)\s+that\s+does\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+shock\s+damage\s+to\s+Health\s+and\s+half(?:\s+that)?\s+to\s+Magicka(?:,?\s*(?P<leaps>then\s+leaps\s+to\s+a\s+new\s+target))?\.?$",
            |caps, _| {
                let mag = cap(caps, "mag");
                if cap(caps, "leaps").is_empty() {
                    rewritten(format!(
                        "체력에 {mag}포인트의 전격 피해를 주고, 매지카에는 그 절반의 피해를 주는 번개 화살을 발사합니다."
                    ))
                } else {
                    rewritten(format!(
                        "체력에 {mag}포인트의 전격 피해를 주고, 매지카에는 그 절반의 피해를 준 뒤 새로운 대상에게 전이되는 번개 화살을 발사합니다."
                    ))
                }
            },
        ),
    ]
}

fn drains_and_creatures() -> Vec<Template> {
    vec![
        Template::new(
            "drain_per_second",
            r"(?i)^Drains\s+(?P<target>the\s+target.?s\s+)?(?P<attr>Health|Magicka|Stamina)\s+by\s+(?P<mag><\s*mag\s*>)\s+points?\s+per\s+second\s+for\s+(?P<dur><\s*dur\s*>)\s+seconds\.?$",
            |caps, _| {
                let attr = known_subject_ko(cap(caps, "attr"));
                let noun = if cap(caps, "target").is_empty() { attr } else { format!("대상의 {attr}") };
                rewritten(format!(
                    "{}초 동안 {noun}{} 초당 {}포인트씩 소모됩니다.",
                    cap(caps, "dur"),
                    subject_particle(&noun),
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "calm_up_to_level",
            r"(?i)^Creatures\s+and\s+people\s+up\s+to\s+level\s+(?P<lvl><\s*mag\s*>)\s+nearby\s+won['\x{2019}]t\s+fight\s+for\s+(?P<dur><\s*dur\s*>)\s+seconds\.?$",
            |caps, _| {
                rewritten(format!(
                    "주변의 레벨 {} 이하의 생명체와 사람들은 {}초 동안 싸우지 않습니다.",
                    cap(caps, "lvl"),
                    cap(caps, "dur")
                ))
            },
        ),
        Template::new(
            "drain_points_once",
            r"(?i)^Drains\s+(?P<mag><\s*mag\s*>)\s+points?\s+from\s+(?P<attr>Health|Magicka|Stamina)\.?\s*$",
            |caps, _| {
                rewritten(format!(
                    "{}에서 {}포인트를 흡수합니다.",
                    known_subject_ko(cap(caps, "attr")),
                    cap(caps, "mag")
                ))
            },
        ),
    ]
}

fn cloaks() -> Vec<Template> {
    vec![
        Template::new(
            "absorb_cloak",
            r"(?i)^For\s+(?P<dur><\s*dur\s*>)\s+seconds,\s+you\s+absorb\s+your\s+opponent(?:s)?['\x{2019}](?:s)?\s+health\s+within\s+melee\s+range,\s+dealing\s+(?P<mag><[^>]+>)\s+points?\s+of\s+damage\s+per\s+second\.?$",
            |caps, _| {
                rewritten(format!(
                    "{}초 동안 근접 범위 내의 적에게서 체력을 흡수하며, 초당 {}포인트의 피해를 줍니다.",
                    cap(caps, "dur"),
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "frost_cloak",
            r"(?i)^For\s+(?P<dur><\s*dur\s*>)\s+seconds,\s+opponents\s+in\s+melee\s+range\s+take\s+(?P<mag><[^>]+>)\s+points?\s+frost\s+damage\s+and\s+Stamina\s+damage\s+per\s+second\.?$",
            |caps, _| {
                rewritten(format!(
                    "{}초 동안 근접 범위 내의 적은 초당 {}포인트의 냉기 피해와 지구력 피해를 받습니다.",
                    cap(caps, "dur"),
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "fire_cloak",
            r"(?i)^For\s+(?P<dur><\s*dur\s*>)\s+seconds,\s+opponents\s+in\s+melee\s+range\s+take\s+(?P<mag><[^>]+>)\s+points?\s+fire\s+damage\s+per\s+second\.\s*Targets\s+on\s+fire\s+take\s+extra\s+damage\.?$",
            |caps, _| {
                rewritten(format!(
                    "{}초 동안 근접 범위 내의 적은 초당 {}포인트의 화염 피해를 받습니다. 불타는 대상은 추가 피해를 받습니다.",
                    cap(caps, "dur"),
                    cap(caps, "mag")
                ))
            },
        ),
    ]
}

fn absorb_and_shock() -> Vec<Template> {
    vec![
        Template::new(
            "absorb_per_second",
            r"(?i)^Absorb\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+(?P<attr>Health|Magicka|Stamina)\s+per\s+second\s+from\s+the\s+target\.?$",
            |caps, _| {
                let attr = known_subject_ko(cap(caps, "attr"));
                rewritten(format!(
                    "대상에게서 {attr}{} 초당 {}포인트 흡수합니다.",
                    object_particle(&attr),
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "named_shock_per_second",
            r"(?i)^(?P<name>.+?)\s+that\s+does\s+(?P<mag><\s*mag\s*>)\s+points?\s+of\s+shock\s+damage\s+per\s+second\s+to\s+Health\s+and\s+Magicka(?P<disintegrate>,\s*with\s+a\s+chance\s+of\s+disintegrating\s+opponents)?\.?$",
            |caps, _| {
                let name = known_name_ko(cap(caps, "name"));
                let mag = cap(caps, "mag");
                if contains_ci(group(caps, "disintegrate"), "disintegrating opponents") {
                    rewritten(format!(
                        "체력과 매지카에 초당 {mag}의 전격 피해를 입히며, 일정 확률로 적을 분해하는 {name}입니다."
                    ))
                } else {
                    rewritten(format!("체력과 매지카에 초당 {mag}의 전격 피해를 입히는 {name}입니다."))
                }
            },
        ),
    ]
}

fn fortify_and_weaken() -> Vec<Template> {
    vec![
        Template::new(
            "fortify_skills_and_attribute",
            r"(?i)^Forti?f(?:y|ies)\s+(?P<skills>.+?)\s+(?:skills?\s+)?(?:by|is)\s+(?P<mag>[+-]?<\s*(?:mag|\d+)\s*>)(?P<mag_points>\s+points?)?\s*(?:,)?\s*(?:and|as\s+well\s+as)\s+(?P<attr>Health|Magicka|Stamina)\s+(?:by\s+)?(?P<attr_mag>[+-]?<\s*(?:mag|\d+)\s*>)(?:\s+points?)?\s+for\s+(?P<dur>[+-]?<\s*(?:dur|\d+)\s*>)\s+seconds\.?$",
            |caps, _| rewritten(render_fortify(caps)),
        ),
        Template::new(
            "weaken_armor_rating",
            r"(?i)^Weakens\s+the\s+target.?s\s+armor\s+rating\s+by\s+(?:a\s+strength\s+of\s+)?(?P<mag><\s*mag\s*>)\s+for\s+(?P<dur><\s*dur\s*>)\s+seconds\.?$",
            |caps, _| {
                rewritten(format!(
                    "{}초 동안 대상의 방어력이 {}만큼 감소합니다.",
                    cap(caps, "dur"),
                    cap(caps, "mag")
                ))
            },
        ),
    ]
}

fn render_fortify(caps: &Captures<'_>) -> String {
    let skills_raw = cap(caps, "skills");
    let skills: Vec<String> = split_english_list(skills_raw).iter().map(|s| known_subject_ko(s)).collect();
    let skills_ko = if skills.is_empty() {
        known_subject_ko(skills_raw)
    } else {
        skills.join(" 및 ")
    };
    let attr = known_subject_ko(cap(caps, "attr"));
    let mag_unit = if group(caps, "mag_points").is_empty() { "만큼" } else { "포인트" };
    format!(
        "{}초 동안 {skills_ko} 기술이 {}{mag_unit}, {attr}{} {}포인트 증가합니다.",
        cap(caps, "dur"),
        cap(caps, "mag"),
        subject_particle(&attr),
        cap(caps, "attr_mag")
    )
}

/// Splits "A, B and C" into its items.
fn split_english_list(text: &str) -> Vec<String> {
    let normalized = WHITESPACE_RE.replace_all(text.trim(), " ");
    LIST_SEPARATOR_RE
        .split(&normalized)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn loss_and_recovery_ko(attr: &str) -> String {
    if attr.eq_ignore_ascii_case("Health") {
        return "체력 감소 및 회복".to_string();
    }
    format!("{} 소모 및 회복", known_subject_ko(attr))
}

fn immunity_suffix(source: &str) -> &'static str {
    if STANDARD_IMMUNITY_RE.is_match(source) {
        IMMUNITY_KO
    } else {
        ""
    }
}

fn loss_and_recovery_mirrors() -> Vec<Template> {
    vec![
        Template::new(
            "mirror_caster_rate",
            r"(?i)^Mirrors\s+the\s+caster.?s\s+rate\s+of\s+(?P<attr>Health|Magicka|Stamina)\s+loss\s+and\s+recovery\s+with\s+the\s+target.?s\s+for\s+(?P<dur><\s*dur\s*>)\s+seconds\.?$",
            |caps, _| {
                rewritten(format!(
                    "{}초 동안 시전자의 {} 속도를 대상과 동일하게 만듭니다.",
                    cap(caps, "dur"),
                    loss_and_recovery_ko(cap(caps, "attr"))
                ))
            },
        ),
        Template::new(
            "mirror_rate_on_allies",
            r"(?i)^The\s+target.?s\s+rate\s+of\s+(?P<attr>Health|Magicka|Stamina)\s+loss\s+and\s+recovery\s+is\s+mirrored\s+on\s+(?:its\s+)?nearby\s+allies\s+for\s+(?P<dur><\s*dur\s*>)\s+seconds\.?$",
            |caps, _| {
                rewritten(format!(
                    "{}초 동안 대상의 {} 속도가 주변 아군들에게도 동일하게 적용됩니다.",
                    cap(caps, "dur"),
                    loss_and_recovery_ko(cap(caps, "attr"))
                ))
            },
        ),
        Template::new(
            "match_rate_with_caster",
            r"(?i)^Matches\s+the\s+target.?s\s+rate\s+of\s+(?P<attr_tag><[^>]+>)\s+loss\s+and\s+recovery\s+with\s+(?:the\s+)?caster\s+for\s+(?P<dur><\s*dur\s*>)(?:\s*seconds)?\s*,?\s*(?P<tail>.+)?$",
            |caps, _| {
                rewritten(format!(
                    "{}초 동안 대상의 {} 소모 및 회복 속도를 시전자와 동일하게 맞춥니다.{}",
                    cap(caps, "dur"),
                    cap(caps, "attr_tag"),
                    immunity_suffix(&caps[0])
                ))
            },
        ),
        Template::new(
            "match_rate_with_allies",
            r"(?i)^Matches\s+the\s+(?P<target_tag><[^>]+>)\s+rate\s+of\s+(?P<attr_tag><[^>]+>)\s+loss\s+with\s+(?:the\s+)?caster\s+for\s+(?P<dur><\s*dur\s*>)(?:\s*seconds)?\s+with\s+nearby\s+all(?:y|ie)s\s*,?\s*(?P<tail>.+)?$",
            |caps, _| {
                rewritten(format!(
                    "{}초 동안 {} {} 소모 속도를 시전자와 동일하게 맞추며, 주변 아군에게도 적용됩니다.{}",
                    cap(caps, "dur"),
                    cap(caps, "target_tag"),
                    cap(caps, "attr_tag"),
                    immunity_suffix(&caps[0])
                ))
            },
        ),
    ]
}

fn bad_usage() -> Vec<Template> {
    vec![
        Template::new(
            "regeneration_rate",
            r"(?i)^(?P<attr>Health|Magicka|Stamina)\s+regenerates\s+(?P<mag><\s*mag\s*>)%\s+(?P<speed>faster|slower)\s+for\s+(?P<dur><\s*dur\s*>)\s+seconds\.?$",
            |caps, dest| {
                when_bad(dest, || {
                    let speed = if cap(caps, "speed").eq_ignore_ascii_case("faster") {
                        "빨라집니다"
                    } else {
                        "느려집니다"
                    };
                    format!(
                        "{}초 동안 {} 재생 속도가 {}% {speed}.",
                        cap(caps, "dur"),
                        known_subject_ko(cap(caps, "attr")),
                        cap(caps, "mag")
                    )
                })
            },
        ),
        Template::new(
            "carry_weight_reduced",
            r"(?i)^Carry\s+weight\s+is\s+reduced\s+by\s+(?P<mag><\s*mag\s*>)\s+for\s+(?P<dur><\s*dur\s*>)\.?\s*$",
            |caps, dest| {
                when_bad(dest, || {
                    format!("{} 동안 무게 한계가 {}만큼 감소합니다.", cap(caps, "dur"), cap(caps, "mag"))
                })
            },
        ),
        Template::new(
            "damage_during",
            r"(?i)^Deal\s+(?P<mag><\s*mag\s*>)\s+damage(?:s)?\s+during\s+(?P<dur><\s*dur\s*>)\s+seconds\.?$",
            |caps, dest| {
                when_bad(dest, || format!("{}초 동안 {}의 피해를 줍니다.", cap(caps, "dur"), cap(caps, "mag")))
            },
        ),
        Template::new(
            "points_stronger",
            r"(?i)^(?P<skill>[A-Za-z][A-Za-z \-']*?)\s+is\s+(?P<mag><\s*mag\s*>)\s+points?\s+stronger\s+for\s+(?P<dur><\s*dur\s*>)\s+seconds\.?$",
            |caps, dest| {
                when_bad(dest, || {
                    format!(
                        "{}초 동안 {}이(가) {}포인트 더 강해집니다.",
                        cap(caps, "dur"),
                        known_subject_ko(cap(caps, "skill")),
                        cap(caps, "mag")
                    )
                })
            },
        ),
        Template::new(
            "signed_amount_for_duration",
            r"(?i)^(?P<mag>[+-]?<\s*mag\s*>)\s+(?P<subject>[A-Za-z][A-Za-z \-']*?)\s+for\s+(?P<dur><\s*dur\s*>)\s+seconds\.?$",
            |caps, _| {
                rewritten(format!(
                    "{}초 동안 {} {}.",
                    cap(caps, "dur"),
                    known_subject_ko(cap(caps, "subject")),
                    cap(caps, "mag")
                ))
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_english_lists() {
        assert_eq!(split_english_list("Smithing, Alchemy and  Enchanting"), vec!["Smithing", "Alchemy", "Enchanting"]);
        assert_eq!(split_english_list("Sneak"), vec!["Sneak"]);
    }

    #[test]
    fn health_uses_loss_wording() {
        assert_eq!(loss_and_recovery_ko("health"), "체력 감소 및 회복");
        assert_eq!(loss_and_recovery_ko("Stamina"), "지구력 소모 및 회복");
    }

    #[test]
    fn mirror_with_immunity_note() {
        let caps_source = "Matches the target's rate of <Health> loss and recovery with the caster for <dur> seconds, does not work on undead, dragons, daedra or machines.";
        let out = super::super::fix(caps_source, "<dur> 동안 <mag>", "ko");
        assert_eq!(
            out,
            "<dur>초 동안 대상의 <Health> 소모 및 회복 속도를 시전자와 동일하게 맞춥니다. 언데드, 드래곤, 데이드라, 기계 장치에게는 효과가 없습니다."
        );
    }

    #[test]
    fn signed_amount_rewrites_unconditionally() {
        let out = super::super::fix("+<mag> Carry Weight for <dur> seconds.", "<dur>초 동안 +<mag> 무게", "ko");
        assert_eq!(out, "<dur>초 동안 무게 한계 +<mag>.");
    }

    #[test]
    fn every_template_compiles() {
        assert!(TEMPLATES.len() > 30);
    }
}
