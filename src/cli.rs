use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Convert(ConvertArgs),
    ConvertOne(ConvertOneArgs),
    Sort(SortArgs),
    StripEmoji(StripEmojiArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    /// Prefer `info.json`, fall back to `info.yaml`.
    Auto,
    Yaml,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PageUrlStyleArg {
    /// `https://dummyimage.com/<order>`
    Order,
    /// `https://dummyimage.com/<name>.<ext>`
    FileName,
}

#[derive(Debug, Clone, Args)]
pub struct PlaceholderArgs {
    /// How placeholder page urls are derived.
    #[arg(long, value_enum, default_value_t = PageUrlStyleArg::Order)]
    pub page_url_style: PageUrlStyleArg,

    /// Record `url` when the descriptor has no `Source`.
    #[arg(long, default_value = crate::convert::DEFAULT_PLACEHOLDER_URL)]
    pub source_fallback: String,

    /// Record `coverImageUrl` when the folder has no page images.
    #[arg(long, default_value = crate::convert::DEFAULT_PLACEHOLDER_URL)]
    pub cover_fallback: String,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Root directory searched recursively for book folders.
    #[arg(long)]
    pub root: String,

    /// Descriptor dialect(s) to look for.
    #[arg(long, value_enum, default_value_t = DialectArg::Auto)]
    pub dialect: DialectArg,

    /// File name of the record written into each book folder.
    #[arg(long, default_value = crate::convert::OUTPUT_FILE_NAME)]
    pub output_name: String,

    /// Optional JSONL file receiving one outcome line per book folder.
    #[arg(long)]
    pub report: Option<String>,

    #[command(flatten)]
    pub placeholders: PlaceholderArgs,
}

#[derive(Debug, Args)]
pub struct ConvertOneArgs {
    /// Path to `info.yaml` or `info.json`.
    #[arg(long)]
    pub descriptor: String,

    /// Book folder holding the page images (default: the descriptor's folder).
    #[arg(long)]
    pub folder: Option<String>,

    /// Output path (default: `<folder>/contentV2.json`).
    #[arg(long)]
    pub out: Option<String>,

    /// Descriptor dialect (`auto` infers it from the file extension).
    #[arg(long, value_enum, default_value_t = DialectArg::Auto)]
    pub dialect: DialectArg,

    #[command(flatten)]
    pub placeholders: PlaceholderArgs,
}

#[derive(Debug, Args)]
pub struct SortArgs {
    /// Directory whose immediate subfolders are sorted.
    #[arg(long)]
    pub root: String,

    /// Log the planned moves without touching the filesystem.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct StripEmojiArgs {
    /// Directory whose subfolders are renamed.
    #[arg(long)]
    pub root: String,

    /// Log the planned renames without touching the filesystem.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
