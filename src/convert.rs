use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Serialize as _;

use crate::cli::{ConvertOneArgs, DialectArg, PageUrlStyleArg, PlaceholderArgs};
use crate::descriptor::{Descriptor, DescriptorError, Dialect};
use crate::formats::{
    Attribute, AttributeType, Attributes, ContentRecord, GroupRecord, PageRecord,
    STATUS_DOWNLOADED,
};
use crate::pages::{PageUrlStyle, enumerate_pages};

pub const OUTPUT_FILE_NAME: &str = "contentV2.json";
pub const DEFAULT_PLACEHOLDER_URL: &str = "https://google.com";

/// Stand-in urls for data the descriptors never carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    pub page_url: PageUrlStyle,
    /// Record `url` when the descriptor has no `Source`.
    pub source_fallback: String,
    /// Record `coverImageUrl` when the book has no pages.
    pub cover_fallback: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            page_url: PageUrlStyle::Order,
            source_fallback: DEFAULT_PLACEHOLDER_URL.to_owned(),
            cover_fallback: DEFAULT_PLACEHOLDER_URL.to_owned(),
        }
    }
}

impl From<PlaceholderArgs> for Placeholders {
    fn from(args: PlaceholderArgs) -> Self {
        Self {
            page_url: match args.page_url_style {
                PageUrlStyleArg::Order => PageUrlStyle::Order,
                PageUrlStyleArg::FileName => PageUrlStyle::FileName,
            },
            source_fallback: args.source_fallback,
            cover_fallback: args.cover_fallback,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("read descriptor {}", .path.display())]
    ReadDescriptor {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse descriptor {}", .path.display())]
    ParseDescriptor {
        path: PathBuf,
        #[source]
        source: DescriptorError,
    },
    #[error("serialize content record")]
    Serialize(#[source] serde_json::Error),
    #[error("write content record {}", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    /// Descriptor problems skip the book; anything later is a failure.
    pub fn is_descriptor_error(&self) -> bool {
        matches!(self, Self::ReadDescriptor { .. } | Self::ParseDescriptor { .. })
    }
}

pub fn run_one(args: ConvertOneArgs) -> anyhow::Result<()> {
    let descriptor_path = PathBuf::from(&args.descriptor);
    let dialect = match args.dialect {
        DialectArg::Yaml => Dialect::Yaml,
        DialectArg::Json => Dialect::Json,
        DialectArg::Auto => Dialect::from_path(&descriptor_path).ok_or_else(|| {
            anyhow::anyhow!(
                "cannot infer descriptor dialect from file name: {}",
                descriptor_path.display()
            )
        })?,
    };

    let folder = match &args.folder {
        Some(folder) => PathBuf::from(folder),
        None => match descriptor_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        },
    };
    let out_path = args
        .out
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| folder.join(OUTPUT_FILE_NAME));

    let record = convert_folder(
        &descriptor_path,
        &folder,
        &out_path,
        dialect,
        &args.placeholders.into(),
    )
    .map_err(anyhow::Error::new)
    .with_context(|| format!("convert book folder: {}", folder.display()))?;

    tracing::info!(
        out = %out_path.display(),
        pages = record.image_files.len(),
        "wrote content record"
    );
    Ok(())
}

/// Converts one book folder and writes its record to `output`.
pub fn convert_folder(
    descriptor_path: &Path,
    folder: &Path,
    output: &Path,
    dialect: Dialect,
    placeholders: &Placeholders,
) -> Result<ContentRecord, ConvertError> {
    let span = tracing::info_span!("book", folder = %folder.display());
    let _enter = span.enter();

    let descriptor = load_descriptor(descriptor_path, dialect)?;
    let pages = enumerate_pages(folder, placeholders.page_url);
    tracing::debug!(pages = pages.len(), "enumerated page images");

    let now_ms = chrono::Utc::now().timestamp_millis();
    let record = build_record(&descriptor, pages, dialect, placeholders, now_ms);
    write_record(&record, output)?;
    Ok(record)
}

pub fn load_descriptor(path: &Path, dialect: Dialect) -> Result<Descriptor, ConvertError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConvertError::ReadDescriptor {
        path: path.to_path_buf(),
        source,
    })?;
    dialect
        .parse(&text)
        .map_err(|source| ConvertError::ParseDescriptor {
            path: path.to_path_buf(),
            source,
        })
}

/// Assembles the record. `now_ms` is used for all three timestamps.
pub fn build_record(
    descriptor: &Descriptor,
    pages: Vec<PageRecord>,
    dialect: Dialect,
    placeholders: &Placeholders,
    now_ms: i64,
) -> ContentRecord {
    let cover_image_url = pages
        .first()
        .map(|page| page.url.clone())
        .unwrap_or_else(|| placeholders.cover_fallback.clone());
    let qty_pages = descriptor.pages.unwrap_or(pages.len() as u64);

    let url = match &descriptor.source {
        Some(source) => {
            if let Err(err) = url::Url::parse(source) {
                tracing::warn!(
                    source = %source,
                    %err,
                    "Source is not an absolute url; copying as-is"
                );
            }
            source.clone()
        }
        None => placeholders.source_fallback.clone(),
    };

    ContentRecord {
        attributes: build_attributes(descriptor),
        book_preferences: serde_json::Map::new(),
        chapters: Vec::new(),
        completed: false,
        cover_image_url,
        download_completion_date: now_ms,
        download_date: now_ms,
        download_mode: 0,
        error_records: Vec::new(),
        favourite: false,
        groups: descriptor
            .groups
            .iter()
            .map(|name| GroupRecord { name: name.clone() })
            .collect(),
        image_files: pages,
        is_frozen: false,
        last_read_date: 0,
        last_read_page_index: 0,
        manually_merged: false,
        qty_pages,
        rating: 0,
        reads: 0,
        site: dialect.site(),
        status: STATUS_DOWNLOADED.to_owned(),
        title: descriptor.title.clone().unwrap_or_default(),
        upload_date: now_ms,
        url,
    }
}

fn build_attributes(descriptor: &Descriptor) -> Attributes {
    Attributes {
        artist: joined_attribute(&descriptor.artists, AttributeType::Artist, "artist"),
        language: vec![Attribute {
            name: "english".to_owned(),
            kind: AttributeType::Language,
            url: "/language/english/".to_owned(),
        }],
        category: vec![Attribute {
            name: "doujinshi".to_owned(),
            kind: AttributeType::Category,
            url: "/category/doujinshi/".to_owned(),
        }],
        tag: descriptor
            .tags
            .iter()
            .map(|tag| slugged_attribute(tag, AttributeType::Tag, "tag"))
            .collect(),
        serie: joined_attribute(&descriptor.parodies, AttributeType::Serie, "parody"),
        character: Vec::new(),
    }
}

/// Multi-valued fields become a single entry named by the `", "`-joined values.
fn joined_attribute(values: &[String], kind: AttributeType, prefix: &str) -> Vec<Attribute> {
    let name = values.join(", ");
    if name.is_empty() {
        return Vec::new();
    }
    vec![slugged_attribute(&name, kind, prefix)]
}

fn slugged_attribute(name: &str, kind: AttributeType, prefix: &str) -> Attribute {
    Attribute {
        name: name.to_owned(),
        kind,
        url: format!("/{prefix}/{}/", slug(name)),
    }
}

pub fn slug(name: &str) -> String {
    name.replace(' ', "-").to_lowercase()
}

/// Serializes with 4-space indentation.
pub fn to_json_bytes(record: &ContentRecord) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record.serialize(&mut ser)?;
    Ok(buf)
}

/// Writes the record through a sibling temp file renamed over `output`, so
/// readers never observe a half-written document.
pub fn write_record(record: &ContentRecord, output: &Path) -> Result<(), ConvertError> {
    let bytes = to_json_bytes(record).map_err(ConvertError::Serialize)?;
    let write_err = |source: std::io::Error| ConvertError::WriteOutput {
        path: output.to_path_buf(),
        source,
    };

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".contentV2-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.write_all(&bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(write_err)?;
    }
    tmp.persist(output).map_err(|err| write_err(err.error))?;
    Ok(())
}
