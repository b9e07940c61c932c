use chrono::{DateTime, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Broad category of an uploaded file, chosen by the uploader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentKind {
    Image,
    Video,
    #[default]
    File,
    Other,
}

impl ContentKind {
    /// Parse the backend's type string. Anything unrecognized is `Other`
    /// so a list never fails to render over one odd entry.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "image" => ContentKind::Image,
            "video" => ContentKind::Video,
            "file" => ContentKind::File,
            _ => ContentKind::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Image => "image",
            ContentKind::Video => "video",
            ContentKind::File => "file",
            ContentKind::Other => "other",
        }
    }

    /// Cycle to the next kind (used by the upload form selector).
    pub fn next(&self) -> Self {
        match self {
            ContentKind::Image => ContentKind::Video,
            ContentKind::Video => ContentKind::File,
            ContentKind::File => ContentKind::Image,
            ContentKind::Other => ContentKind::Image,
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ContentKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ContentKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() {
            return Err(de::Error::custom("empty content type"));
        }
        Ok(ContentKind::parse(&s))
    }
}

/// A user-uploaded file record with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: ContentKind,
    pub path: String,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub owner_id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ContentItem {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    pub fn display_description(&self) -> &str {
        if self.description.is_empty() {
            "No description"
        } else {
            &self.description
        }
    }

    /// Upload date formatted for the list view.
    ///
    /// The backend emits naive ISO timestamps without an offset; RFC 3339 is
    /// tried first in case that ever changes.
    pub fn formatted_date(&self) -> String {
        match &self.created_at {
            Some(date) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
                    dt.format("%b %d, %Y").to_string()
                } else if let Ok(dt) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f") {
                    dt.format("%b %d, %Y").to_string()
                } else {
                    date.chars().take(10).collect()
                }
            }
            None => "-".to_string(),
        }
    }

    /// File name to save a download under: the original upload name when the
    /// backend kept it, otherwise the last segment of the served path.
    pub fn download_name(&self) -> &str {
        self.original_filename
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.path.rsplit('/').next().unwrap_or(&self.path))
    }
}

/// Per-kind counters shown in the panel stats row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentStats {
    pub total: usize,
    pub images: usize,
    pub videos: usize,
    pub documents: usize,
}

impl ContentStats {
    pub fn from_items(items: &[ContentItem]) -> Self {
        let mut stats = Self {
            total: items.len(),
            ..Self::default()
        };
        for item in items {
            match item.kind {
                ContentKind::Image => stats.images += 1,
                ContentKind::Video => stats.videos += 1,
                ContentKind::File => stats.documents += 1,
                ContentKind::Other => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(kind: ContentKind) -> ContentItem {
        ContentItem {
            id: 1,
            title: "t".to_string(),
            description: String::new(),
            kind,
            path: "/uploads/x".to_string(),
            original_filename: None,
            owner_id: 1,
            created_at: None,
        }
    }

    #[test]
    fn test_parse_content_item() {
        // Shape as served by the content listing endpoints
        let json = r#"{
            "id": 3,
            "title": "Team photo",
            "description": "From the launch party",
            "type": "image",
            "path": "/uploads/9a6b2c1e-1f7d-4a51-9e6e-0f2d9a7b3c44.png",
            "original_filename": "photo.png",
            "owner_id": 2,
            "created_at": "2026-08-01T14:03:22.517431"
        }"#;
        let item: ContentItem = serde_json::from_str(json).expect("Failed to parse content JSON");
        assert_eq!(item.id, 3);
        assert_eq!(item.kind, ContentKind::Image);
        assert_eq!(item.owner_id, 2);
        assert_eq!(item.download_name(), "photo.png");
        assert_eq!(item.formatted_date(), "Aug 01, 2026");
    }

    #[test]
    fn test_unknown_kind_is_other() {
        let json = r#"{"id": 1, "title": "x", "type": "podcast", "path": "/uploads/a.mp3"}"#;
        let item: ContentItem = serde_json::from_str(json).expect("Failed to parse");
        assert_eq!(item.kind, ContentKind::Other);
    }

    #[test]
    fn test_content_kind_roundtrip_labels() {
        assert_eq!(ContentKind::parse("IMAGE"), ContentKind::Image);
        assert_eq!(ContentKind::parse("video"), ContentKind::Video);
        assert_eq!(ContentKind::parse("file"), ContentKind::File);
        assert_eq!(ContentKind::parse(""), ContentKind::Other);
        assert_eq!(ContentKind::Image.label(), "image");
    }

    #[test]
    fn test_download_name_falls_back_to_path() {
        let mut i = item(ContentKind::File);
        i.path = "/uploads/9a6b2c1e.pdf".to_string();
        assert_eq!(i.download_name(), "9a6b2c1e.pdf");

        i.original_filename = Some("report.pdf".to_string());
        assert_eq!(i.download_name(), "report.pdf");
    }

    #[test]
    fn test_display_title_fallback() {
        let mut i = item(ContentKind::File);
        i.title = String::new();
        assert_eq!(i.display_title(), "Untitled");
        i.title = "Notes".to_string();
        assert_eq!(i.display_title(), "Notes");
    }

    #[test]
    fn test_stats_counts_by_kind() {
        let items = vec![
            item(ContentKind::Image),
            item(ContentKind::Image),
            item(ContentKind::Video),
            item(ContentKind::File),
            item(ContentKind::Other),
        ];
        let stats = ContentStats::from_items(&items);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.images, 2);
        assert_eq!(stats.videos, 1);
        assert_eq!(stats.documents, 1);
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(ContentStats::from_items(&[]), ContentStats::default());
    }
}
