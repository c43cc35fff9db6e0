//! Deterministic post-edits for translated strings. No model calls, safe to re-run.

use serde::Deserialize;

use crate::textutil::{is_blank, strip_invisible};
use crate::{korean, leak, magdur, percent, unit_binder};

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct PostEditOptions {
    pub enable_template_fixer: bool,
    pub unit_binder_max_chars: usize,
}

impl Default for PostEditOptions {
    fn default() -> Self {
        Self {
            enable_template_fixer: true,
            unit_binder_max_chars: unit_binder::DEFAULT_MAX_CHARS,
        }
    }
}

/// Runs the post-edit chain with default limits.
pub fn apply(target_lang: &str, source: &str, translated: &str, enable_template_fixer: bool) -> String {
    let options = PostEditOptions {
        enable_template_fixer,
        ..PostEditOptions::default()
    };
    apply_with_options(target_lang, source, translated, &options)
}

/// Echoed instructions are cut first. Then placeholder templates, units, grammar and percent signs.
pub fn apply_with_options(target_lang: &str, source: &str, translated: &str, options: &PostEditOptions) -> String {
    if is_blank(translated) {
        return translated.to_string();
    }
    let mut working = strip_invisible(&leak::strip_leaked_instructions(source, translated));
    if options.enable_template_fixer {
        working = magdur::fix(source, &working, target_lang);
    }
    working = unit_binder::enforce_units_with_limit(target_lang, source, &working, options.unit_binder_max_chars);
    working = korean::protect_from::fix(target_lang, source, &working);
    working = korean::fix(target_lang, &working);
    percent::fix_duplicate_percents(&working)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reorders_probability_and_drops_extra_percent() {
        let out = apply(
            "korean",
            "A <25%> chance to turn invisible for <5> seconds when taking damage.",
            "피해를 입을 시 <25%>% <5>초 동안 확률로 투명화 상태가 됩니다.",
            false,
        );
        assert_eq!(out, "피해를 입을 시 <25%> 확률로 <5>초 동안 투명화 상태가 됩니다.");
    }

    #[test]
    fn template_fixer_runs_before_grammar() {
        let out = apply(
            "ko",
            "Drains <mag> points from stamina.",
            "<mag>에서 지구력포인트를 흡수합니다.",
            true,
        );
        assert_eq!(out, "지구력에서 <mag>포인트를 흡수합니다.");
    }

    #[test]
    fn disabled_template_fixer_leaves_wording() {
        let dest = "지구력에서 <mag>포인트를 흡수합니다.";
        assert_eq!(apply("ko", "Drains <mag> points from stamina.", dest, false), dest);
    }

    #[test]
    fn strips_invisible_characters_first() {
        let out = apply("ko", "Paralyzes the target for <dur> seconds.", "<dur>\u{200B}초 동안 마비시킵니다.", true);
        assert_eq!(out, "<dur>초 동안 마비시킵니다.");
    }

    #[test]
    fn echoed_placeholder_instruction_is_cut() {
        let out = apply(
            "ko",
            "Deals <mag> fire damage.",
            "<mag>의 화염 피해를 줍니다. Do NOT modify placeholder tokens.",
            true,
        );
        assert_eq!(out, "<mag>의 화염 피해를 줍니다.");
    }

    #[test]
    fn blank_and_foreign_text_pass_through() {
        assert_eq!(apply("ko", "x", "   ", true), "   ");
        assert_eq!(apply("en", "Deal 50% damage.", "Deal 50%% damage.", true), "Deal 50% damage.");
    }
}
