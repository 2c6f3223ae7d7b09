//! Content item shapes and boundary mapping.
//!
//! The engine operates on a strict in-memory shape. Payloads coming
//! from the surrounding store are loosely typed JSON; `from_value`
//! maps them into `ContentItem` at the boundary so the rest of the
//! engine never touches dynamic data. A missing or malformed embedding
//! excludes the item from vector operations instead of failing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind tag for a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Link,
}

impl ContentKind {
    /// Parse a kind tag, defaulting to `Text` for unknown values.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "image" => Self::Image,
            "link" => Self::Link,
            _ => Self::Text,
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Text => "Text",
            Self::Image => "Image",
            Self::Link => "Link",
        };
        write!(f, "{}", name)
    }
}

/// A single content item within a batch.
///
/// `id` is only required to be unique within one batch. `embedding` is
/// optional: items without one still participate in lexical matching
/// but never in similarity or clustering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default = "default_kind")]
    pub kind: ContentKind,
    #[serde(default = "default_created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

fn default_kind() -> ContentKind {
    ContentKind::Text
}

fn default_created_at() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl ContentItem {
    /// Create an item with just an id and title; other fields take
    /// their defaults. Mostly useful in tests and small callers.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            snippet: String::new(),
            kind: ContentKind::Text,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_kind(mut self, kind: ContentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// Map a loose store payload into the strict shape.
    ///
    /// Returns `None` when the payload has no usable `id`. All other
    /// fields degrade gracefully: missing title/snippet become empty,
    /// an unknown kind becomes `Text`, an unparsable timestamp becomes
    /// the epoch, and a malformed embedding becomes `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = value.get("id").and_then(Value::as_u64)?;

        let title = value
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let snippet = value
            .get("snippet")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .map(ContentKind::parse)
            .unwrap_or(ContentKind::Text);

        let created_at = value
            .get("created_at")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(default_created_at);

        let embedding = value
            .get("embedding")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .map(|v| v.as_f64().map(|f| f as f32))
                    .collect::<Option<Vec<f32>>>()
            })
            .and_then(|parsed| parsed.filter(|e| !e.is_empty()));

        Some(Self {
            id,
            title,
            snippet,
            kind,
            created_at,
            embedding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_parse() {
        assert_eq!(ContentKind::parse("image"), ContentKind::Image);
        assert_eq!(ContentKind::parse(" LINK "), ContentKind::Link);
        assert_eq!(ContentKind::parse("text"), ContentKind::Text);
        assert_eq!(ContentKind::parse("video"), ContentKind::Text);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ContentKind::Image.to_string(), "Image");
        assert_eq!(ContentKind::Text.to_string(), "Text");
    }

    #[test]
    fn test_from_value_complete() {
        let payload = json!({
            "id": 7,
            "title": "Rust Guide",
            "snippet": "Learn rust",
            "kind": "link",
            "created_at": "2024-03-01T12:00:00Z",
            "embedding": [0.1, 0.2, 0.3],
        });

        let item = ContentItem::from_value(&payload).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.title, "Rust Guide");
        assert_eq!(item.kind, ContentKind::Link);
        assert!(item.has_embedding());
        assert_eq!(item.embedding.unwrap().len(), 3);
    }

    #[test]
    fn test_from_value_missing_id_skipped() {
        let payload = json!({"title": "No id"});
        assert!(ContentItem::from_value(&payload).is_none());
    }

    #[test]
    fn test_from_value_malformed_embedding_excluded() {
        let payload = json!({
            "id": 1,
            "title": "Bad embedding",
            "embedding": [0.1, "oops", 0.3],
        });

        let item = ContentItem::from_value(&payload).unwrap();
        assert!(item.embedding.is_none());
        assert!(!item.has_embedding());
    }

    #[test]
    fn test_from_value_empty_embedding_excluded() {
        let payload = json!({"id": 1, "embedding": []});
        let item = ContentItem::from_value(&payload).unwrap();
        assert!(item.embedding.is_none());
    }

    #[test]
    fn test_from_value_defaults() {
        let payload = json!({"id": 2});
        let item = ContentItem::from_value(&payload).unwrap();
        assert_eq!(item.title, "");
        assert_eq!(item.kind, ContentKind::Text);
        assert_eq!(item.created_at, DateTime::<Utc>::UNIX_EPOCH);
        assert!(item.embedding.is_none());
    }

    #[test]
    fn test_has_embedding_empty_vec() {
        let item = ContentItem::new(1, "x").with_embedding(vec![]);
        assert!(!item.has_embedding());
    }
}
