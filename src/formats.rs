use serde::{Deserialize, Serialize};

pub const STATUS_DOWNLOADED: &str = "DOWNLOADED";

/// One page image of a book, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub chapter_order: i64,
    pub favourite: bool,
    pub is_cover: bool,
    pub is_read: bool,
    pub is_transformed: bool,
    pub mime_type: String,
    pub name: String,
    pub order: u32,
    pub p_hash: i64,
    pub page_url: String,
    pub status: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeType {
    Artist,
    Language,
    Category,
    Tag,
    Serie,
    Character,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttributeType,
    pub url: String,
}

/// The six attribute groups, serialized in this fixed order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(rename = "ARTIST")]
    pub artist: Vec<Attribute>,
    #[serde(rename = "LANGUAGE")]
    pub language: Vec<Attribute>,
    #[serde(rename = "CATEGORY")]
    pub category: Vec<Attribute>,
    #[serde(rename = "TAG")]
    pub tag: Vec<Attribute>,
    #[serde(rename = "SERIE")]
    pub serie: Vec<Attribute>,
    #[serde(rename = "CHARACTER")]
    pub character: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub name: String,
}

/// Literal written to `site`, one per descriptor dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Site {
    Anchira,
    Nexus,
}

/// The contentV2 document. Field order is the on-disk key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub attributes: Attributes,
    pub book_preferences: serde_json::Map<String, serde_json::Value>,
    pub chapters: Vec<serde_json::Value>,
    pub completed: bool,
    pub cover_image_url: String,
    pub download_completion_date: i64,
    pub download_date: i64,
    pub download_mode: i32,
    pub error_records: Vec<serde_json::Value>,
    pub favourite: bool,
    pub groups: Vec<GroupRecord>,
    pub image_files: Vec<PageRecord>,
    pub is_frozen: bool,
    pub last_read_date: i64,
    pub last_read_page_index: i64,
    pub manually_merged: bool,
    pub qty_pages: u64,
    pub rating: i32,
    pub reads: i64,
    pub site: Site,
    pub status: String,
    pub title: String,
    pub upload_date: i64,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Converted,
    Skipped,
    Failed,
}

/// One line of the batch report written by `convert --report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRecord {
    pub folder: String,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
