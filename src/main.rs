use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::Serialize;

use xtranslator_core::chunker::split_token_aware;
use xtranslator_core::config::{find_default_config, load_config, AppConfig, DEFAULT_CONFIG_FILENAME};
use xtranslator_core::diagnostics;
use xtranslator_core::glossary::{merge_glossaries, GlossaryApplier, GlossaryEntry};
use xtranslator_core::lqa::{LqaEntry, LqaScanner};
use xtranslator_core::mask::{mask, unmask};
use xtranslator_core::postedit;
use xtranslator_core::prepare::prepare_source;
use xtranslator_core::progress::ConsoleProgress;

#[derive(Parser, Debug)]
#[command(name = "xtranslator")]
#[command(about = "Localization safety tools: masking, glossary tokens, chunking, post-edit, QA scan", long_about = None)]
struct Args {
    /// Config file path (default: search for xtranslator.toml upwards, or XTRANSLATOR_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable console progress lines
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace markup with placeholder tokens; prints {text, token_to_original}
    Mask {
        #[arg(long, value_name = "TXT")]
        input: PathBuf,
    },
    /// Restore placeholder tokens from a mask map
    Unmask {
        #[arg(long, value_name = "TXT")]
        input: PathBuf,
        /// JSON object of token -> original
        #[arg(long, value_name = "JSON")]
        map: PathBuf,
    },
    /// Merge project over global glossary, then substitute term tokens
    Glossary {
        #[arg(long, value_name = "TXT")]
        input: PathBuf,
        #[arg(long, value_name = "JSON")]
        project: Option<PathBuf>,
        #[arg(long, value_name = "JSON")]
        global: Option<PathBuf>,
    },
    /// Mask, expand list shorthand and substitute glossary terms in one pass
    Prepare {
        #[arg(long, value_name = "TXT")]
        input: PathBuf,
        #[arg(long, value_name = "JSON")]
        project: Option<PathBuf>,
        #[arg(long, value_name = "JSON")]
        global: Option<PathBuf>,
    },
    /// Split text into chunks without cutting tokens; prints a JSON array
    Chunk {
        #[arg(long, value_name = "TXT")]
        input: PathBuf,
        /// Max characters per chunk (default: [chunk] max_chars)
        #[arg(long)]
        max_chars: Option<usize>,
        /// Max tokens per chunk (default: [chunk] max_tokens_per_chunk)
        #[arg(long)]
        max_tokens: Option<usize>,
    },
    /// Run the post-edit chain over one translated string
    Fix {
        /// Target language code (e.g. ko, ko-KR)
        #[arg(long)]
        lang: String,
        #[arg(long, value_name = "TXT")]
        source: PathBuf,
        #[arg(long, value_name = "TXT")]
        translated: PathBuf,
        /// Skip the mag/dur sentence templates
        #[arg(long)]
        no_template_fixer: bool,
    },
    /// Scan translated entries and print ranked issues
    Lqa {
        /// JSON array of entries
        #[arg(long, value_name = "JSON")]
        entries: PathBuf,
        #[arg(long)]
        lang: String,
        /// JSON array of glossary entries (force-token terms are checked)
        #[arg(long, value_name = "JSON")]
        glossary: Option<PathBuf>,
        /// JSON object of entry id -> translation-memory fallback note
        #[arg(long, value_name = "JSON")]
        tm_notes: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let classified = diagnostics::classify(&err);
            if classified.details_in_logs {
                error!("{err:#}");
            } else {
                debug!("{err:#}");
            }
            eprintln!("[{}] {}", classified.code, classified.message);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let data_dir = args.command.input().parent().map(Path::to_path_buf);
    let cfg = resolve_config(args.config.as_deref(), data_dir.as_deref())?;
    let progress = ConsoleProgress::new(!args.quiet);

    match args.command {
        Command::Mask { input } => {
            let text = read_text(&input)?;
            let masked = mask(&text, cfg.mask_options())?;
            print_json(&masked)
        }
        Command::Unmask { input, map } => {
            let text = read_text(&input)?;
            let map: HashMap<String, String> = read_json(&map)?;
            let restored = unmask(&text, &map)?;
            println!("{restored}");
            Ok(())
        }
        Command::Glossary {
            input,
            project,
            global,
        } => {
            let text = read_text(&input)?;
            let project: Vec<GlossaryEntry> = read_optional_json(project.as_deref())?;
            let global: Vec<GlossaryEntry> = read_optional_json(global.as_deref())?;
            let merged = merge_glossaries(&project, &global);
            let applier = GlossaryApplier::with_regex_size_limit(&merged, cfg.regex_size_limit());
            progress.info(format!("glossary: {} of {} entries active", applier.len(), merged.len()));
            print_json(&applier.apply(&text))
        }
        Command::Prepare {
            input,
            project,
            global,
        } => {
            let text = read_text(&input)?;
            let project: Vec<GlossaryEntry> = read_optional_json(project.as_deref())?;
            let global: Vec<GlossaryEntry> = read_optional_json(global.as_deref())?;
            let merged = merge_glossaries(&project, &global);
            let applier = GlossaryApplier::with_regex_size_limit(&merged, cfg.regex_size_limit());
            print_json(&prepare_source(&text, cfg.mask_options(), &applier)?)
        }
        Command::Chunk {
            input,
            max_chars,
            max_tokens,
        } => {
            let text = read_text(&input)?;
            let defaults = cfg.chunk_options();
            let chunks = split_token_aware(
                &text,
                max_chars.unwrap_or(defaults.max_chars),
                max_tokens.or(defaults.max_tokens_per_chunk),
            )?;
            progress.info(format!("chunk: {} chunk(s)", chunks.len()));
            print_json(&chunks)
        }
        Command::Fix {
            lang,
            source,
            translated,
            no_template_fixer,
        } => {
            let source = read_text(&source)?;
            let translated = read_text(&translated)?;
            let mut options = cfg.postedit_options();
            if no_template_fixer {
                options.enable_template_fixer = false;
            }
            println!("{}", postedit::apply_with_options(&lang, &source, &translated, &options));
            Ok(())
        }
        Command::Lqa {
            entries,
            lang,
            glossary,
            tm_notes,
        } => {
            let entries: Vec<LqaEntry> = read_json(&entries)?;
            let glossary: Vec<GlossaryEntry> = read_optional_json(glossary.as_deref())?;
            let tm_notes: Option<HashMap<i64, String>> = match tm_notes {
                Some(path) => Some(read_json(&path)?),
                None => None,
            };
            let scanner = LqaScanner::new(cfg.lqa_thresholds());
            let mut report = |pct: u32| progress.percent("lqa", pct);
            let issues = scanner.scan(&entries, &lang, &glossary, tm_notes.as_ref(), Some(&mut report));
            progress.info(format!("lqa: {} entries, {} issue(s)", entries.len(), issues.len()));
            print_json(&issues)
        }
    }
}

impl Command {
    /// The file a config is searched next to.
    fn input(&self) -> &Path {
        match self {
            Command::Mask { input }
            | Command::Unmask { input, .. }
            | Command::Glossary { input, .. }
            | Command::Prepare { input, .. }
            | Command::Chunk { input, .. } => input,
            Command::Fix { translated, .. } => translated,
            Command::Lqa { entries, .. } => entries,
        }
    }
}

fn resolve_config(explicit: Option<&Path>, data_dir: Option<&Path>) -> anyhow::Result<AppConfig> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => match std::env::var_os("XTRANSLATOR_CONFIG") {
            Some(p) => Some(PathBuf::from(p)),
            None => find_default_config(data_dir.filter(|d| !d.as_os_str().is_empty()), DEFAULT_CONFIG_FILENAME),
        },
    };
    match path {
        Some(p) => {
            debug!("config: {}", p.display());
            load_config(&p)
        }
        None => Ok(AppConfig::default()),
    }
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read input: {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("parse json: {}", path.display()))
}

fn read_optional_json<T: DeserializeOwned + Default>(path: Option<&Path>) -> anyhow::Result<T> {
    match path {
        Some(p) => read_json(p),
        None => Ok(T::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{out}");
    Ok(())
}
