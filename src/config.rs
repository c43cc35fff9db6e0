use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::glossary::DEFAULT_REGEX_SIZE_LIMIT;
use crate::lqa::LqaThresholds;
use crate::mask::MaskOptions;
use crate::postedit::PostEditOptions;
use crate::unit_binder;

pub const DEFAULT_CONFIG_FILENAME: &str = "xtranslator.toml";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub mask: MaskSection,
    #[serde(default)]
    pub chunk: ChunkSection,
    #[serde(default)]
    pub lqa: LqaSection,
    #[serde(default)]
    pub postedit: PostEditSection,
    #[serde(default)]
    pub regex: RegexSection,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct MaskSection {
    /// Leave `<mag>`/`<dur>`/`<bur>` in place instead of masking them.
    #[serde(default)]
    pub keep_skyrim_tags_raw: Option<bool>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ChunkSection {
    #[serde(default)]
    pub max_chars: Option<usize>,
    #[serde(default)]
    pub max_tokens_per_chunk: Option<usize>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct LqaSection {
    #[serde(default)]
    pub progress_every: Option<usize>,
    #[serde(default)]
    pub tone_min_classified: Option<usize>,
    #[serde(default)]
    pub tone_min_leading: Option<usize>,
    #[serde(default)]
    pub tone_majority_ratio: Option<f64>,
    #[serde(default)]
    pub mesg_min_chars: Option<usize>,
    #[serde(default)]
    pub mesg_min_ratio: Option<f64>,
    #[serde(default)]
    pub qust_min_chars: Option<usize>,
    #[serde(default)]
    pub qust_min_ratio: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PostEditSection {
    #[serde(default)]
    pub enable_template_fixer: Option<bool>,
    #[serde(default)]
    pub unit_binder_max_chars: Option<usize>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct RegexSection {
    /// Compile budget in bytes for user-supplied glossary patterns.
    #[serde(default)]
    pub size_limit: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkOptions {
    pub max_chars: usize,
    pub max_tokens_per_chunk: Option<usize>,
}

impl AppConfig {
    pub fn mask_options(&self) -> MaskOptions {
        MaskOptions {
            keep_skyrim_tags_raw: self.mask.keep_skyrim_tags_raw.unwrap_or(false),
        }
    }

    pub fn chunk_options(&self) -> ChunkOptions {
        ChunkOptions {
            max_chars: self.chunk.max_chars.unwrap_or(2000),
            max_tokens_per_chunk: self.chunk.max_tokens_per_chunk,
        }
    }

    pub fn lqa_thresholds(&self) -> LqaThresholds {
        let d = LqaThresholds::default();
        let s = &self.lqa;
        LqaThresholds {
            progress_every: s.progress_every.unwrap_or(d.progress_every),
            tone_min_classified: s.tone_min_classified.unwrap_or(d.tone_min_classified),
            tone_min_leading: s.tone_min_leading.unwrap_or(d.tone_min_leading),
            tone_majority_ratio: s.tone_majority_ratio.unwrap_or(d.tone_majority_ratio),
            mesg_min_chars: s.mesg_min_chars.unwrap_or(d.mesg_min_chars),
            mesg_min_ratio: s.mesg_min_ratio.unwrap_or(d.mesg_min_ratio),
            qust_min_chars: s.qust_min_chars.unwrap_or(d.qust_min_chars),
            qust_min_ratio: s.qust_min_ratio.unwrap_or(d.qust_min_ratio),
        }
    }

    pub fn postedit_options(&self) -> PostEditOptions {
        PostEditOptions {
            enable_template_fixer: self.postedit.enable_template_fixer.unwrap_or(true),
            unit_binder_max_chars: self
                .postedit
                .unit_binder_max_chars
                .unwrap_or(unit_binder::DEFAULT_MAX_CHARS),
        }
    }

    pub fn regex_size_limit(&self) -> usize {
        self.regex.size_limit.unwrap_or(DEFAULT_REGEX_SIZE_LIMIT)
    }
}

pub fn find_file_upwards(start_dir: &Path, filename: &str, max_levels: usize) -> Option<PathBuf> {
    let mut dir = start_dir;
    for _ in 0..=max_levels {
        let candidate = dir.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
    None
}

/// Looks for `filename` above the current directory, then above `data_dir`, then above the binary.
pub fn find_default_config(data_dir: Option<&Path>, filename: &str) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok();
    if let Some(p) = cwd.as_deref().and_then(|d| find_file_upwards(d, filename, 8)) {
        return Some(p);
    }
    if let Some(dir) = data_dir.filter(|d| Some(*d) != cwd.as_deref()) {
        if let Some(p) = find_file_upwards(dir, filename, 8) {
            return Some(p);
        }
    }
    let exe = std::env::current_exe().ok()?;
    find_file_upwards(exe.parent()?, filename, 10)
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: AppConfig = toml::from_str(&text).context("parse config toml")?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_resolves_to_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("parse");
        assert!(!cfg.mask_options().keep_skyrim_tags_raw);
        assert_eq!(
            cfg.chunk_options(),
            ChunkOptions {
                max_chars: 2000,
                max_tokens_per_chunk: None
            }
        );
        assert_eq!(cfg.lqa_thresholds(), LqaThresholds::default());
        assert_eq!(cfg.postedit_options(), PostEditOptions::default());
        assert_eq!(cfg.regex_size_limit(), DEFAULT_REGEX_SIZE_LIMIT);
    }

    #[test]
    fn sections_override_individual_values() {
        let cfg: AppConfig = toml::from_str(
            r#"
[mask]
keep_skyrim_tags_raw = true

[chunk]
max_chars = 500
max_tokens_per_chunk = 8

[lqa]
mesg_min_chars = 100
tone_majority_ratio = 0.6

[postedit]
enable_template_fixer = false

[regex]
size_limit = 65536
"#,
        )
        .expect("parse");
        assert!(cfg.mask_options().keep_skyrim_tags_raw);
        assert_eq!(cfg.chunk_options().max_tokens_per_chunk, Some(8));
        let lqa = cfg.lqa_thresholds();
        assert_eq!(lqa.mesg_min_chars, 100);
        assert_eq!(lqa.mesg_min_ratio, 2.5);
        assert_eq!(lqa.tone_majority_ratio, 0.6);
        assert!(!cfg.postedit_options().enable_template_fixer);
        assert_eq!(cfg.postedit_options().unit_binder_max_chars, unit_binder::DEFAULT_MAX_CHARS);
        assert_eq!(cfg.regex_size_limit(), 65536);
    }

    #[test]
    fn load_config_reports_missing_file() {
        let err = load_config(Path::new("/nonexistent/xtranslator.toml")).expect_err("missing");
        assert!(err.to_string().contains("read config"));
    }

    #[test]
    fn upward_search_finds_file_in_parent() {
        let root = std::env::temp_dir().join(format!("xt-config-{}", std::process::id()));
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).expect("mkdir");
        std::fs::write(root.join(DEFAULT_CONFIG_FILENAME), "").expect("write");
        let found = find_file_upwards(&nested, DEFAULT_CONFIG_FILENAME, 4);
        assert_eq!(found, Some(root.join(DEFAULT_CONFIG_FILENAME)));
        assert_eq!(find_file_upwards(&nested, DEFAULT_CONFIG_FILENAME, 1), None);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn default_config_is_found_next_to_the_data() {
        let root = std::env::temp_dir().join(format!("xt-data-{}", std::process::id()));
        let data = root.join("strings");
        std::fs::create_dir_all(&data).expect("mkdir");
        std::fs::write(root.join("xt-data-only.toml"), "").expect("write");
        assert_eq!(
            find_default_config(Some(&data), "xt-data-only.toml"),
            Some(root.join("xt-data-only.toml"))
        );
        assert_eq!(find_default_config(None, "xt-data-only-missing.toml"), None);
        let _ = std::fs::remove_dir_all(&root);
    }
}
