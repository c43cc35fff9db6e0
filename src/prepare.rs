//! Source-side preparation: mask, expand Fortify lists, glossary tokens, expand paired slash lists.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::Result;
use crate::expand::{expand_fortify_list, expand_paired_slash_list};
use crate::glossary::GlossaryApplier;
use crate::mask::{mask, MaskOptions};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PreparedSource {
    pub text: String,
    pub token_to_original: HashMap<String, String>,
    pub token_to_replacement: HashMap<String, String>,
    pub prompt_only_pairs: Vec<(String, String)>,
}

pub fn prepare_source(text: &str, options: MaskOptions, glossary: &GlossaryApplier) -> Result<PreparedSource> {
    let masked = mask(text, options)?;
    let expanded = expand_fortify_list(&masked.text);
    let glossed = glossary.apply(&expanded);
    Ok(PreparedSource {
        text: expand_paired_slash_list(&glossed.text),
        token_to_original: masked.token_to_original,
        token_to_replacement: glossed.token_to_replacement,
        prompt_only_pairs: glossed.prompt_only_pairs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::{ForceMode, GlossaryEntry, MatchMode};

    #[test]
    fn masks_then_expands_lists() {
        let glossary = GlossaryApplier::new(&[GlossaryEntry::new(2, "Smithing", "제련")
            .with_match_mode(MatchMode::WordBoundary)
            .with_force_mode(ForceMode::ForceToken)]);
        let out = prepare_source(
            "Fortify Armor, Blocking and Smithing are 20% better.",
            MaskOptions::default(),
            &glossary,
        )
        .expect("prepare");
        assert_eq!(
            out.text,
            "Fortify Armor, Fortify Blocking and Fortify __XT_TERM_G2_0000__ are __XT_PH_NUM_0000__ better."
        );
        assert_eq!(out.token_to_original.get("__XT_PH_NUM_0000__").map(String::as_str), Some("20%"));
        assert_eq!(out.token_to_replacement.get("__XT_TERM_G2_0000__").map(String::as_str), Some("제련"));
    }

    #[test]
    fn numeric_slash_lists_are_paired_after_masking() {
        let out = prepare_source(
            "Reduces damage by 10%/20% per level of Block/Heavy Armor.",
            MaskOptions::default(),
            &GlossaryApplier::new(&[]),
        )
        .expect("prepare");
        assert_eq!(
            out.text,
            "Reduces damage by per level: Block: __XT_PH_NUM_0000__; Heavy Armor: __XT_PH_NUM_0001__."
        );
    }
}
