//! Core domain types for BookAdvisor.

use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};

/// Author used when the catalog does not report one.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Publish date used when the catalog does not report a first-publish year.
pub const UNKNOWN_PUBLISH_DATE: &str = "N/A";

/// Marker appended to a description that was cut short.
pub const ELLIPSIS: &str = "...";

/// Fold every run of line breaks in `text` into a single space.
///
/// Records are stored one per line, so no field may carry `\r` or `\n`.
/// Text without line breaks is returned unchanged.
pub fn single_line(text: &str) -> Cow<'_, str> {
    if !text.contains(['\r', '\n']) {
        return Cow::Borrowed(text);
    }

    let parts: Vec<&str> = text
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    Cow::Owned(parts.join(" "))
}

/// Accept JSON `null` where a string is expected, reading it as `""`.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// BookRecord
// ---------------------------------------------------------------------------

/// The canonical, enriched representation of a book, used for display and
/// persistence.
///
/// Records are immutable once built. Use [`BookRecord::builder`] to assemble
/// one field at a time; "editing" a record means building a replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    title: String,
    author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cover_url: Option<String>,
    publish_date: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    key: String,
    #[serde(default)]
    description: String,
}

impl BookRecord {
    /// Field names and types in declaration order, for documentation output.
    pub const SCHEMA: &'static [(&'static str, &'static str)] = &[
        ("title", "String"),
        ("author", "String"),
        ("cover_url", "Option<String>"),
        ("publish_date", "String"),
        ("key", "String"),
        ("description", "String"),
    ];

    /// Start building a record.
    pub fn builder() -> BookRecordBuilder {
        BookRecordBuilder::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.cover_url.as_deref()
    }

    pub fn publish_date(&self) -> &str {
        &self.publish_date
    }

    /// Opaque catalog identifier. Blank for manually entered records.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl std::fmt::Display for BookRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} by {}", self.title, self.author)
    }
}

// ---------------------------------------------------------------------------
// BookRecordBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`BookRecord`].
///
/// Unset fields fall back to the catalog defaults: empty title, key and
/// description, `"Unknown"` author, `"N/A"` publish date and no cover.
#[derive(Debug, Clone, Default)]
pub struct BookRecordBuilder {
    title: Option<String>,
    author: Option<String>,
    cover_url: Option<String>,
    publish_date: Option<String>,
    key: Option<String>,
    description: Option<String>,
}

impl BookRecordBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn cover_url(mut self, cover_url: Option<String>) -> Self {
        self.cover_url = cover_url;
        self
    }

    pub fn publish_date(mut self, publish_date: impl Into<String>) -> Self {
        self.publish_date = Some(publish_date.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Finalize the record.
    pub fn build(self) -> BookRecord {
        BookRecord {
            title: self.title.unwrap_or_default(),
            author: self.author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            cover_url: self.cover_url,
            publish_date: self
                .publish_date
                .unwrap_or_else(|| UNKNOWN_PUBLISH_DATE.to_string()),
            key: self.key.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// RawHit
// ---------------------------------------------------------------------------

/// One catalog search result as fetched, before enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHit {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Author names; only the first one is used.
    #[serde(default)]
    pub author_name: Option<Vec<String>>,
    /// Numeric cover image identifier.
    #[serde(default)]
    pub cover_i: Option<i64>,
    #[serde(default)]
    pub first_publish_year: Option<i64>,
    /// Opaque key used for the detail lookup (e.g. `/works/OL45804W`).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub key: String,
}

impl RawHit {
    /// First listed author, or `"Unknown"`.
    pub fn author(&self) -> String {
        self.author_name
            .as_ref()
            .and_then(|names| names.first())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
    }

    /// First-publish year as text, or `"N/A"`.
    pub fn publish_date(&self) -> String {
        self.first_publish_year
            .map(|year| year.to_string())
            .unwrap_or_else(|| UNKNOWN_PUBLISH_DATE.to_string())
    }

    /// Cover image URL built from `template`, replacing its `{id}` placeholder.
    pub fn cover_url(&self, template: &str) -> Option<String> {
        self.cover_i
            .map(|id| template.replace("{id}", &id.to_string()))
    }
}
