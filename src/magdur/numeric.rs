//! Templates for effects that carry literal numeric placeholders (`<150>`) instead of `<mag>`/`<dur>`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{cap, known_subject_ko, Outcome, Template};

const PCT: &str = r"[+-]?\d+(?:\.\d+)?|<[^>]+>";

fn rewritten(text: String) -> Outcome {
    Outcome::Rewritten(text)
}

pub(super) static TEMPLATES: Lazy<Vec<Template>> = Lazy::new(|| {
    vec![
        Template::new(
            "ignore_damage_after_attacked",
            &format!(
                r"(?i)^Ignores\s+(?P<pct>{PCT})%\s+of\s+all\s+physical\s+damage\s+and\s+elemental\s+damage\s+for\s+(?P<dur><[^>]+>)\s+seconds\s+after\s+being\s+attacked\.\s*This\s+effect\s+has\s+a\s+(?P<cd>\d+|<[^>]+>)\s+seconds?\s+cooldown\.?$"
            ),
            |caps, _| {
                rewritten(format!(
                    "공격받은 후 {}초 동안 모든 물리 피해와 원소 피해의 {}%를 무시합니다. 이 효과의 재사용 대기시간은 {}초입니다.",
                    cap(caps, "dur"),
                    cap(caps, "pct"),
                    cap(caps, "cd")
                ))
            },
        ),
        Template::new(
            "stagger_immunity_on_ash_of_war",
            &format!(
                r"(?i)^(?P<pct>{PCT})%\s+chance\s+to\s+(?:be\s+)?immune(?:\s+to)?\s+stagger\s+when\s+Ash\s+of\s+War\s+is\s+cast\.?$"
            ),
            |caps, _| rewritten(format!("전회 시전 시 {}% 확률로 비틀거림에 면역이 됩니다.", cap(caps, "pct"))),
        ),
        Template::new(
            "weapon_art_restores_stamina",
            r"(?i)^Casting\s+Weapon\s+Art\s+will\s+restores?\s+(?P<mag>\d+|<[^>]+>)\s+points?\s+of\s+stamina\s+during\s+the\s+Action\s+Surge\.?$",
            |caps, _| {
                rewritten(format!(
                    "액션 서지 동안 무기 전기 시전 시 지구력을 {}포인트 회복합니다.",
                    cap(caps, "mag")
                ))
            },
        ),
        Template::new(
            "action_surge_damage_taken",
            &format!(r"(?i)^Damage\s+taken\s+is\s+reduced\s+(?P<pct>{PCT})%\s+during\s+the\s+Action\s+Surge\.?$"),
            |caps, _| rewritten(format!("액션 서지 동안 받는 피해가 {}% 감소합니다.", cap(caps, "pct"))),
        ),
        Template::new(
            "action_surge_cooldown_damage",
            &format!(r"(?i)^Do\s+more\s+(?P<pct>{PCT})%\s+damage\s+during\s+the\s+cooldown\s+of\s+Action\s+Surge\.?$"),
            |caps, _| rewritten(format!("액션 서지 재사용 대기시간 동안 피해가 {}% 증가합니다.", cap(caps, "pct"))),
        ),
        Template::new(
            "berserk_health_loss",
            &format!(
                r"(?i)^Deal\s+(?P<dmg>{PCT})%\s+more\s+physical\s+damage\s+and\s+lose\s+(?P<loss>\d+|<[^>]+>)\s+health\s+per\s+second\s+until\s+your\s+health\s+is\s+below\s+(?P<threshold>{PCT})%\.\s*You\s+will\s+not\s+be\s+killed\s+by\s+this\s+effect\.?$"
            ),
            |caps, _| {
                rewritten(format!(
                    "물리 피해가 {}% 증가하지만, 체력이 {}% 미만이 될 때까지 초당 체력이 {} 감소합니다. 이 효과로 인해 사망하지는 않습니다.",
                    cap(caps, "dmg"),
                    cap(caps, "threshold"),
                    cap(caps, "loss")
                ))
            },
        ),
        Template::new(
            "per_level_scaling",
            &format!(
                r"(?i)^Your\s+spell(?:s)?\s+(?:have|are)\s+(?:more\s+)?(?P<spell>{PCT})%\s+effective,\s*magicka\s+regenerates\s+(?P<regen>{PCT})%\s+faster,\s+and\s+your\s+weapon\s+damage\s+(?:are|is)\s+(?P<weapon>{PCT})%\s+more\s+powerful\s+per\s+level\s+of\s+(?P<skill>[A-Za-z][A-Za-z \-']*)\.?$"
            ),
            |caps, _| {
                rewritten(format!(
                    "주문 효과가 {}% 증가하고, 매지카 재생 속도가 {}% 빨라지며, {} 레벨당 무기 피해가 {}% 증가합니다.",
                    cap(caps, "spell"),
                    cap(caps, "regen"),
                    known_subject_ko(cap(caps, "skill")),
                    cap(caps, "weapon")
                ))
            },
        ),
        Template::new(
            "attack_buff_with_cooldown",
            r"(?i)^Increases\s+armor\s+rating\s+by\s+(?P<armor>[+-]?<\s*\d+\s*>)\s+points?\s+and\s+magic\s+resistance\s+by\s+(?P<mr>[+-]?<\s*\d+\s*>)%\s+while\s+attacking\s+for\s+(?P<dur>[+-]?<\s*\d+\s*>)\s+seconds,\s+once\s+every\s+(?P<cd>[+-]?<\s*\d+\s*>)\s+seconds\.?$",
            |caps, _| {
                rewritten(format!(
                    "공격 시 {}초 동안 방어력이 {}포인트, 마법 저항이 {}% 증가합니다. 이 효과는 {}초마다 한 번씩 발동합니다.",
                    cap(caps, "dur"),
                    cap(caps, "armor"),
                    cap(caps, "mr"),
                    cap(caps, "cd")
                ))
            },
        ),
        Template::new(
            "attack_buff",
            r"(?i)^Increases\s+armor\s+rating\s+by\s+(?P<armor>[+-]?<\s*\d+\s*>)\s+points?\s+and\s+magic\s+resistance\s+by\s+(?P<mr>[+-]?<\s*\d+\s*>)%\s+while\s+attacking\s+for\s+(?P<dur>[+-]?<\s*\d+\s*>)\s+seconds\.?$",
            |caps, _| {
                rewritten(format!(
                    "공격 시 {}초 동안 방어력이 {}포인트, 마법 저항이 {}% 증가합니다.",
                    cap(caps, "dur"),
                    cap(caps, "armor"),
                    cap(caps, "mr")
                ))
            },
        ),
        Template::new(
            "timed_armor_buff",
            &format!(
                r"(?i)^Increases\s+armor\s+rating\s+by\s+(?P<armor>[+-]?\d+|<[^>]+>)\s+points?\s+and\s+magic\s+resistance\s+by\s+(?P<mr>{PCT})%\s+for\s+(?P<dur>[+-]?\d+|<[^>]+>)\s+seconds\.?$"
            ),
            |caps, _| {
                rewritten(format!(
                    "{}초 동안 방어력이 {}포인트, 마법 저항이 {}% 증가합니다.",
                    cap(caps, "dur"),
                    cap(caps, "armor"),
                    cap(caps, "mr")
                ))
            },
        ),
        Template::new(
            "heal_then_drain_magicka",
            r"(?i)^Heals\s+(?P<heal_mag><[^>]+>)\s+points?\s+per\s+second\s+for\s+(?P<heal_dur><\s*\d+\s*>)\s+seconds\.\s*Drains\s+magicka\s+by\s+(?P<drain_mag><[^>]+>)\s+points?\s+per\s+second\s+for\s+(?P<drain_dur><\s*\d+\s*>)\s+seconds\.?$",
            |caps, _| {
                rewritten(format!(
                    "{}초 동안 체력을 초당 {}포인트 회복합니다. {}초 동안 매지카가 초당 {}포인트씩 소모됩니다.",
                    cap(caps, "heal_dur"),
                    cap(caps, "heal_mag"),
                    cap(caps, "drain_dur"),
                    cap(caps, "drain_mag")
                ))
            },
        ),
        Template::new(
            "calm_then_deplete",
            r"(?i)^Creatures\s+and\s+people\s+up\s+to\s+level\s+(?P<lvl><\s*\d+\s*>)\s+nearby\s+won['\x{2019}]t\s+fight\s+for\s+(?P<fight_dur><\s*\d+\s*>)\s+seconds\.\s*Your\s+Magicka\s+and\s+Stamina\s+are\s+depleted\s+by\s+(?P<drain_mag><[^>]+>)\s+points?\s+per\s+second\s+for\s+(?P<drain_dur><\s*\d+\s*>)\s+seconds\.?$",
            |caps, _| {
                rewritten(format!(
                    "주변의 레벨 {} 이하의 생명체와 사람들은 {}초 동안 싸우지 않습니다. {}초 동안 매지카와 지구력이 초당 {}포인트씩 소모됩니다.",
                    cap(caps, "lvl"),
                    cap(caps, "fight_dur"),
                    cap(caps, "drain_dur"),
                    cap(caps, "drain_mag")
                ))
            },
        ),
        Template::new(
            "absorb_health_and_bleed",
            r"(?i)^Absorbs\s+(?P<health><\s*\d+\s*>)\s+points?\s+of\s+health\s+and\s+does\s+(?P<bleed><\s*\d+\s*>)\s+points?\s+of\s+bleeding\s+damage\s+for\s+(?P<dur><\s*\d+\s*>)\s+seconds\.?$",
            |caps, _| {
                rewritten(format!(
                    "{}초 동안 체력을 {}포인트 흡수하고, {}포인트의 출혈 피해를 줍니다.",
                    cap(caps, "dur"),
                    cap(caps, "health"),
                    cap(caps, "bleed")
                ))
            },
        ),
        Template::new(
            "take_on_form",
            r"(?i)^Take\s+on\s+the\s+form\s+of\s+the\s+(?P<form>.+?)\s+for\s+(?P<dur><[^>]+>)\s+seconds\.?$",
            reorder_form_duration,
        ),
    ]
});

const TIME_UNIT_ALTERNATION: &str = "초간|초|분|시간|일|주|개월|년|동안|간";

/// Moves a duration token that the translation left after "초 동안" back in front of it.
fn reorder_form_duration(caps: &Captures<'_>, dest: &str) -> Outcome {
    let dur = cap(caps, "dur");
    if dur.is_empty() {
        return Outcome::Keep;
    }
    let escaped = regex::escape(dur);
    let already_timed = Regex::new(&format!(r"{escaped}\s*(?:{TIME_UNIT_ALTERNATION})"));
    if already_timed.map_or(true, |re| re.is_match(dest)) {
        return Outcome::Keep;
    }
    let misplaced = match Regex::new(&format!(
        r"(?P<form>[\p{{L}}\p{{N}}][\p{{L}}\p{{N}} \-'\x{{2019}}]{{0,40}})\s*초\s*동안\s*{escaped}\s*의"
    )) {
        Ok(re) => re,
        Err(_) => return Outcome::Keep,
    };
    let replaced = misplaced.replace_all(dest, |m: &Captures<'_>| format!("{dur}초 동안 {}의", cap(m, "form")));
    if replaced == dest {
        Outcome::Keep
    } else {
        Outcome::Rewritten(replaced.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fix;

    #[test]
    fn ignore_damage_with_cooldown() {
        let out = fix(
            "Ignores 30% of all physical damage and elemental damage for <5> seconds after being attacked. This effect has a 60 seconds cooldown.",
            "피해 무시",
            "ko",
        );
        assert_eq!(
            out,
            "공격받은 후 <5>초 동안 모든 물리 피해와 원소 피해의 30%를 무시합니다. 이 효과의 재사용 대기시간은 60초입니다."
        );
    }

    #[test]
    fn attack_buff_prefers_cooldown_variant() {
        let out = fix(
            "Increases armor rating by <50> points and magic resistance by <10>% while attacking for <5> seconds, once every <30> seconds.",
            "방어력 증가",
            "ko",
        );
        assert_eq!(
            out,
            "공격 시 <5>초 동안 방어력이 <50>포인트, 마법 저항이 <10>% 증가합니다. 이 효과는 <30>초마다 한 번씩 발동합니다."
        );
    }

    #[test]
    fn form_already_timed_is_kept() {
        let dest = "<150>초 동안 늑대인간의 형상을 취합니다.";
        assert_eq!(fix("Take on the form of the Werewolf for <150> seconds.", dest, "ko"), dest);
    }
}
