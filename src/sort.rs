use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::SortArgs;
use crate::convert::OUTPUT_FILE_NAME;
use crate::descriptor::{JSON_DESCRIPTOR, YAML_DESCRIPTOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBucket {
    Json,
    Yaml,
    None,
}

impl SortBucket {
    pub const ALL: [Self; 3] = [Self::Json, Self::Yaml, Self::None];

    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Json => "json_directory",
            Self::Yaml => "yaml_directory",
            Self::None => "none_directory",
        }
    }

    /// `info.json` wins when a folder has both descriptors.
    pub fn classify(folder: &Path) -> Self {
        if folder.join(JSON_DESCRIPTOR).is_file() {
            Self::Json
        } else if folder.join(YAML_DESCRIPTOR).is_file() {
            Self::Yaml
        } else {
            Self::None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    pub folder: PathBuf,
    pub bucket: SortBucket,
    pub destination: PathBuf,
    pub removed_stale_output: bool,
    /// False when the destination already existed or on a dry run.
    pub moved: bool,
}

pub fn run(args: SortArgs) -> anyhow::Result<()> {
    let root = PathBuf::from(&args.root);
    let outcomes = sort_tree(&root, args.dry_run)?;
    let moved = outcomes.iter().filter(|o| o.moved).count();
    tracing::info!(
        root = %root.display(),
        folders = outcomes.len(),
        moved,
        dry_run = args.dry_run,
        "sort finished"
    );
    Ok(())
}

/// Moves each immediate subfolder of `root` into a bucket directory named
/// after the descriptor it contains.
pub fn sort_tree(root: &Path, dry_run: bool) -> anyhow::Result<Vec<SortOutcome>> {
    let mut folders = Vec::new();
    for entry in
        std::fs::read_dir(root).with_context(|| format!("read root dir: {}", root.display()))?
    {
        let entry = entry.with_context(|| format!("read entry in: {}", root.display()))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let is_bucket = SortBucket::ALL
            .iter()
            .any(|bucket| entry.file_name() == bucket.dir_name());
        if is_bucket {
            continue;
        }
        folders.push(path);
    }
    folders.sort();

    if !dry_run {
        for bucket in SortBucket::ALL {
            let dir = root.join(bucket.dir_name());
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("create bucket dir: {}", dir.display()))?;
        }
    }

    let mut outcomes = Vec::with_capacity(folders.len());
    for folder in folders {
        outcomes.push(sort_folder(root, folder, dry_run)?);
    }
    Ok(outcomes)
}

fn sort_folder(root: &Path, folder: PathBuf, dry_run: bool) -> anyhow::Result<SortOutcome> {
    let stale = folder.join(OUTPUT_FILE_NAME);
    let removed_stale_output = stale.is_file();
    if removed_stale_output {
        tracing::info!(file = %stale.display(), dry_run, "removing stale content record");
        if !dry_run {
            std::fs::remove_file(&stale)
                .with_context(|| format!("remove stale output: {}", stale.display()))?;
        }
    }

    let bucket = SortBucket::classify(&folder);
    let name = folder
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("folder has no name: {}", folder.display()))?;
    let destination = root.join(bucket.dir_name()).join(name);

    let mut moved = false;
    if destination.exists() {
        tracing::warn!(
            folder = %folder.display(),
            destination = %destination.display(),
            "destination already exists; leaving folder in place"
        );
    } else {
        tracing::info!(
            folder = %folder.display(),
            bucket = bucket.dir_name(),
            dry_run,
            "moving folder"
        );
        if !dry_run {
            std::fs::rename(&folder, &destination).with_context(|| {
                format!("move {} -> {}", folder.display(), destination.display())
            })?;
            moved = true;
        }
    }

    Ok(SortOutcome {
        folder,
        bucket,
        destination,
        removed_stale_output,
        moved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folders_land_in_descriptor_buckets() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let root = temp.path();
        for (name, file) in [
            ("json-book", Some(JSON_DESCRIPTOR)),
            ("yaml-book", Some(YAML_DESCRIPTOR)),
            ("loose", None),
        ] {
            std::fs::create_dir(root.join(name))?;
            if let Some(file) = file {
                std::fs::write(root.join(name).join(file), "{}")?;
            }
        }
        std::fs::write(root.join("yaml-book").join(OUTPUT_FILE_NAME), "{}")?;
        std::fs::write(root.join("stray.txt"), "")?;

        let outcomes = sort_tree(root, false)?;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| o.moved));
        assert!(root.join("json_directory/json-book/info.json").is_file());
        assert!(root.join("yaml_directory/yaml-book/info.yaml").is_file());
        assert!(root.join("none_directory/loose").is_dir());
        assert!(!root.join("yaml_directory/yaml-book").join(OUTPUT_FILE_NAME).exists());
        assert!(root.join("stray.txt").is_file());

        let yaml = outcomes
            .iter()
            .find(|o| o.bucket == SortBucket::Yaml)
            .ok_or_else(|| anyhow::anyhow!("yaml outcome missing"))?;
        assert!(yaml.removed_stale_output);
        Ok(())
    }

    #[test]
    fn json_wins_when_both_descriptors_exist() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::write(temp.path().join(JSON_DESCRIPTOR), "{}")?;
        std::fs::write(temp.path().join(YAML_DESCRIPTOR), "")?;
        assert_eq!(SortBucket::classify(temp.path()), SortBucket::Json);
        Ok(())
    }

    #[test]
    fn dry_run_touches_nothing() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let root = temp.path();
        std::fs::create_dir(root.join("book"))?;
        std::fs::write(root.join("book").join(OUTPUT_FILE_NAME), "{}")?;

        let outcomes = sort_tree(root, true)?;

        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].moved);
        assert!(outcomes[0].removed_stale_output);
        assert!(root.join("book").join(OUTPUT_FILE_NAME).is_file());
        assert!(!root.join("none_directory").exists());
        Ok(())
    }

    #[test]
    fn existing_destination_is_not_overwritten() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let root = temp.path();
        std::fs::create_dir_all(root.join("none_directory").join("book"))?;
        std::fs::create_dir(root.join("book"))?;

        let outcomes = sort_tree(root, false)?;

        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].moved);
        assert!(root.join("book").is_dir());
        Ok(())
    }
}
