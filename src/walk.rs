use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use walkdir::WalkDir;

use crate::cli::{ConvertArgs, DialectArg};
use crate::convert::{ConvertError, Placeholders, convert_folder};
use crate::descriptor::Dialect;
use crate::formats::{ReportRecord, ReportStatus};

/// Batch conversion settings, independent of the command line.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Dialects looked for, in order of preference.
    pub dialects: Vec<Dialect>,
    pub output_name: String,
    pub placeholders: Placeholders,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            dialects: vec![Dialect::Json, Dialect::Yaml],
            output_name: crate::convert::OUTPUT_FILE_NAME.to_owned(),
            placeholders: Placeholders::default(),
        }
    }
}

#[derive(Debug)]
pub enum FolderOutcome {
    Converted { output: PathBuf, pages: usize },
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug)]
pub struct FolderReport {
    pub folder: PathBuf,
    pub dialect: Dialect,
    pub outcome: FolderOutcome,
}

impl FolderReport {
    pub fn to_record(&self) -> ReportRecord {
        let folder = self.folder.to_string_lossy().to_string();
        match &self.outcome {
            FolderOutcome::Converted { output, pages } => ReportRecord {
                folder,
                status: ReportStatus::Converted,
                output: Some(output.to_string_lossy().to_string()),
                pages: Some(*pages),
                message: None,
            },
            FolderOutcome::Skipped { reason } => ReportRecord {
                folder,
                status: ReportStatus::Skipped,
                output: None,
                pages: None,
                message: Some(reason.clone()),
            },
            FolderOutcome::Failed { error } => ReportRecord {
                folder,
                status: ReportStatus::Failed,
                output: None,
                pages: None,
                message: Some(error.clone()),
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub folders: Vec<FolderReport>,
}

impl BatchSummary {
    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, FolderOutcome::Converted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FolderOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FolderOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&FolderOutcome) -> bool) -> usize {
        self.folders.iter().filter(|f| pred(&f.outcome)).count()
    }
}

pub fn run(args: ConvertArgs) -> anyhow::Result<()> {
    let root = PathBuf::from(&args.root);
    let options = ConvertOptions {
        dialects: match args.dialect {
            DialectArg::Auto => vec![Dialect::Json, Dialect::Yaml],
            DialectArg::Yaml => vec![Dialect::Yaml],
            DialectArg::Json => vec![Dialect::Json],
        },
        output_name: args.output_name,
        placeholders: args.placeholders.into(),
    };

    let summary = convert_tree(&root, &options)?;

    if let Some(report) = &args.report {
        write_report(Path::new(report), &summary)
            .with_context(|| format!("write report: {report}"))?;
    }

    tracing::info!(
        root = %root.display(),
        converted = summary.converted(),
        skipped = summary.skipped(),
        failed = summary.failed(),
        "conversion finished"
    );
    Ok(())
}

/// Returns the first descriptor present in `dir`, honoring dialect preference.
pub fn find_descriptor(dir: &Path, dialects: &[Dialect]) -> Option<(Dialect, PathBuf)> {
    dialects.iter().find_map(|dialect| {
        let path = dir.join(dialect.file_name());
        path.is_file().then_some((*dialect, path))
    })
}

/// Converts every book folder under `root`.
///
/// Only an unreadable root is an error; each book's result is recorded in the
/// summary and the walk continues.
pub fn convert_tree(root: &Path, options: &ConvertOptions) -> anyhow::Result<BatchSummary> {
    std::fs::read_dir(root).with_context(|| format!("read root dir: {}", root.display()))?;

    let mut summary = BatchSummary::default();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let Some((dialect, descriptor_path)) = find_descriptor(entry.path(), &options.dialects)
        else {
            continue;
        };

        let folder = entry.path().to_path_buf();
        let output = folder.join(&options.output_name);
        let outcome = match convert_folder(
            &descriptor_path,
            &folder,
            &output,
            dialect,
            &options.placeholders,
        ) {
            Ok(record) => {
                tracing::info!(
                    folder = %folder.display(),
                    pages = record.image_files.len(),
                    "converted"
                );
                FolderOutcome::Converted {
                    output,
                    pages: record.image_files.len(),
                }
            }
            Err(err) => outcome_for_error(&folder, err),
        };

        summary.folders.push(FolderReport {
            folder,
            dialect,
            outcome,
        });
    }

    Ok(summary)
}

fn outcome_for_error(folder: &Path, err: ConvertError) -> FolderOutcome {
    let skipped = err.is_descriptor_error();
    let message = format!("{:#}", anyhow::Error::new(err));
    if skipped {
        tracing::warn!(folder = %folder.display(), reason = %message, "skipped");
        FolderOutcome::Skipped { reason: message }
    } else {
        tracing::error!(folder = %folder.display(), error = %message, "failed");
        FolderOutcome::Failed { error: message }
    }
}

pub fn write_report(path: &Path, summary: &BatchSummary) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create report dir: {}", parent.display()))?;
    }

    let mut out = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
        .with_context(|| format!("open report: {}", path.display()))?;
    for folder in &summary.folders {
        serde_json::to_writer(&mut out, &folder.to_record()).context("serialize report record")?;
        out.write_all(b"\n").context("write report newline")?;
    }
    out.flush().context("flush report")?;
    Ok(())
}
