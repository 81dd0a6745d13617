use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use regex::Regex;
use walkdir::WalkDir;

use crate::cli::StripEmojiArgs;

const EMOJI_CLASS: &str = concat!(
    "[",
    r"\x{1F600}-\x{1F64F}", // emoticons
    r"\x{1F300}-\x{1F5FF}", // symbols & pictographs
    r"\x{1F680}-\x{1F6FF}", // transport & map
    r"\x{1F700}-\x{1F77F}",
    r"\x{1F780}-\x{1F7FF}",
    r"\x{1F800}-\x{1F8FF}",
    r"\x{1F900}-\x{1F9FF}",
    r"\x{1FA00}-\x{1FA6F}",
    r"\x{1FA70}-\x{1FAFF}",
    r"\x{1F100}-\x{1F1FF}", // enclosed alphanumerics, flags
    r"\x{2600}-\x{26FF}",
    r"\x{2702}-\x{27B0}", // dingbats
    r"\x{FE0F}\x{200D}",
    "]+"
);

pub struct EmojiStripper {
    pattern: Regex,
}

impl EmojiStripper {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(EMOJI_CLASS)?,
        })
    }

    /// Removes emoji code points, then trims surrounding whitespace. Names
    /// without emoji come back unchanged.
    pub fn strip(&self, name: &str) -> String {
        if !self.pattern.is_match(name) {
            return name.to_owned();
        }
        self.pattern.replace_all(name, "").trim().to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
    pub applied: bool,
}

pub fn run(args: StripEmojiArgs) -> anyhow::Result<()> {
    let root = PathBuf::from(&args.root);
    let renames = strip_tree(&root, args.dry_run)?;
    tracing::info!(
        root = %root.display(),
        renamed = renames.iter().filter(|r| r.applied).count(),
        planned = renames.len(),
        dry_run = args.dry_run,
        "emoji strip finished"
    );
    Ok(())
}

/// Renames every folder below `root` whose name contains emoji.
///
/// Children are renamed before their parents so collected paths stay valid.
pub fn strip_tree(root: &Path, dry_run: bool) -> anyhow::Result<Vec<Rename>> {
    let stripper = EmojiStripper::new().context("compile emoji pattern")?;
    std::fs::read_dir(root).with_context(|| format!("read root dir: {}", root.display()))?;

    let mut dirs = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable path");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }

    let mut renames = Vec::new();
    let mut planned = HashSet::new();
    for dir in dirs {
        let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let clean = stripper.strip(name);
        if clean == name {
            continue;
        }
        let target = dir.with_file_name(&clean);
        if clean.is_empty() || target.exists() || planned.contains(&target) {
            tracing::warn!(
                folder = %dir.display(),
                clean = %clean,
                "cleaned name is empty or taken; leaving folder as is"
            );
            continue;
        }

        tracing::info!(
            from = %dir.display(),
            to = %target.display(),
            dry_run,
            "renaming folder"
        );
        if !dry_run {
            std::fs::rename(&dir, &target)
                .with_context(|| format!("rename {} -> {}", dir.display(), target.display()))?;
        }
        planned.insert(target.clone());
        renames.push(Rename {
            from: dir,
            to: target,
            applied: !dry_run,
        });
    }
    Ok(renames)
}
