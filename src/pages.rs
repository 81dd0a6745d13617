use std::path::Path;

use anyhow::Context as _;

use crate::formats::{PageRecord, STATUS_DOWNLOADED};

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

const PLACEHOLDER_IMAGE_HOST: &str = "https://dummyimage.com";

/// How the placeholder `url` of a page is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageUrlStyle {
    /// `https://dummyimage.com/<order>`
    #[default]
    Order,
    /// `https://dummyimage.com/<name>.<ext>`
    FileName,
}

impl PageUrlStyle {
    pub fn page_url(self, order: u32, name: &str, extension: &str) -> String {
        match self {
            Self::Order => format!("{PLACEHOLDER_IMAGE_HOST}/{order}"),
            Self::FileName => format!("{PLACEHOLDER_IMAGE_HOST}/{name}.{extension}"),
        }
    }
}

/// Lists the page images directly inside `folder`.
///
/// A folder that cannot be listed yields no pages; the caller still writes a
/// record for the book.
pub fn enumerate_pages(folder: &Path, style: PageUrlStyle) -> Vec<PageRecord> {
    match list_file_names(folder) {
        Ok(names) => page_records(names, style),
        Err(err) => {
            tracing::warn!(
                folder = %folder.display(),
                error = %format!("{err:#}"),
                "cannot list book folder; writing record without pages"
            );
            Vec::new()
        }
    }
}

fn list_file_names(folder: &Path) -> anyhow::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(folder)
        .with_context(|| format!("read book folder: {}", folder.display()))?
    {
        let entry = entry.with_context(|| format!("read entry in: {}", folder.display()))?;
        if entry.path().is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => tracing::debug!(?name, "skipping non UTF-8 file name"),
        }
    }
    Ok(names)
}

/// Turns raw file names into ordered page records.
///
/// Names are filtered by extension, then sorted byte-wise, so `order` is
/// always the contiguous range `1..=n` and only the first page is the cover.
pub fn page_records<I>(file_names: I, style: PageUrlStyle) -> Vec<PageRecord>
where
    I: IntoIterator<Item = String>,
{
    let mut images: Vec<(String, String, String)> = file_names
        .into_iter()
        .filter_map(|file_name| {
            let (stem, extension) = split_image_name(&file_name)?;
            Some((file_name.clone(), stem, extension))
        })
        .collect();
    images.sort_by(|a, b| a.0.cmp(&b.0));

    images
        .into_iter()
        .zip(1_u32..)
        .map(|((_, name, extension), order)| PageRecord {
            chapter_order: -1,
            favourite: false,
            is_cover: order == 1,
            is_read: false,
            is_transformed: false,
            mime_type: format!("image/{extension}"),
            url: style.page_url(order, &name, &extension),
            name,
            order,
            p_hash: 0,
            page_url: String::new(),
            status: STATUS_DOWNLOADED.to_owned(),
        })
        .collect()
}

/// Returns `(stem, lowercased extension)` for recognized page images.
fn split_image_name(file_name: &str) -> Option<(String, String)> {
    let path = Path::new(file_name);
    let extension = path.extension()?.to_str()?.to_lowercase();
    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?.to_owned();
    Some((stem, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn pages_are_sorted_and_numbered_from_one() {
        let pages = page_records(
            names(&["003.png", "info.yaml", "001.jpg", "002.webp"]),
            PageUrlStyle::Order,
        );

        let orders: Vec<u32> = pages.iter().map(|p| p.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        let page_names: Vec<&str> = pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(page_names, vec!["001", "002", "003"]);
        assert_eq!(
            pages.iter().filter(|p| p.is_cover).count(),
            1,
            "exactly one cover"
        );
        assert!(pages[0].is_cover);
    }

    #[test]
    fn non_images_do_not_leave_gaps_in_order() {
        let pages = page_records(
            names(&["a.jpg", "b.txt", "c.jpg", "contentV2.json", "d.gif"]),
            PageUrlStyle::Order,
        );
        let orders: Vec<u32> = pages.iter().map(|p| p.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(pages[2].name, "d");
    }

    #[test]
    fn name_without_extension_is_excluded() {
        let pages = page_records(names(&["cover", "jpg", "01.png"]), PageUrlStyle::Order);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].name, "01");
    }

    #[test]
    fn extension_is_lowercased_for_mime_type() {
        let pages = page_records(names(&["Scan.JPEG"]), PageUrlStyle::FileName);
        assert_eq!(pages[0].mime_type, "image/jpeg");
        assert_eq!(pages[0].name, "Scan");
        assert_eq!(pages[0].url, "https://dummyimage.com/Scan.jpeg");
    }

    #[test]
    fn sorting_is_case_sensitive_byte_order() {
        let pages = page_records(names(&["b.png", "B.png", "a.png"]), PageUrlStyle::Order);
        let page_names: Vec<&str> = pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(page_names, vec!["B", "a", "b"]);
    }

    #[test]
    fn page_defaults_match_record_contract() {
        let pages = page_records(names(&["01.png", "02.png"]), PageUrlStyle::Order);
        let page = &pages[1];
        assert_eq!(page.chapter_order, -1);
        assert!(!page.favourite);
        assert!(!page.is_cover);
        assert!(!page.is_read);
        assert!(!page.is_transformed);
        assert_eq!(page.p_hash, 0);
        assert_eq!(page.page_url, "");
        assert_eq!(page.status, "DOWNLOADED");
        assert_eq!(page.url, "https://dummyimage.com/2");
    }

    #[test]
    fn empty_listing_yields_no_pages() {
        assert!(page_records(Vec::new(), PageUrlStyle::Order).is_empty());
    }

    #[test]
    fn missing_folder_yields_no_pages() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let pages = enumerate_pages(&temp.path().join("missing"), PageUrlStyle::Order);
        assert!(pages.is_empty());
        Ok(())
    }

    #[test]
    fn subdirectories_are_not_pages() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::create_dir(temp.path().join("extras.png"))?;
        std::fs::write(temp.path().join("01.png"), b"")?;
        std::fs::write(temp.path().join("cover"), b"")?;

        let pages = enumerate_pages(temp.path(), PageUrlStyle::Order);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].name, "01");
        Ok(())
    }
}
