use serde::Serialize;

/// A parsed RSS channel.
///
/// Every text field is kept exactly as it appeared in the document. Dates are
/// opaque strings and are never interpreted. Absent elements leave the
/// corresponding field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Feed {
    /// `version` attribute of the `<rss>` root element
    pub version: String,
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: String,
    pub copyright: String,
    pub managing_editor: String,
    pub web_master: String,
    pub pub_date: String,
    pub last_build_date: String,
    pub category: String,
    pub generator: String,
    pub docs: String,
    pub image: Image,
    pub cloud: Cloud,
    pub ttl: String,
    /// Channel items in document order
    pub items: Vec<Item>,
}

/// The `<image>` block of a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Image {
    pub url: String,
    pub title: String,
    pub link: String,
    pub width: String,
    pub height: String,
    pub description: String,
}

/// Placeholder for the channel's `<cloud>` element.
///
/// The element's attributes (domain, port, path, protocol) are not retained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Cloud {}

/// A single `<item>` of a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Item {
    pub title: String,
    pub author: String,
    pub description: String,
    pub link: String,
    pub pub_date: String,
    pub guid: String,
}

impl Item {
    /// Whether `other` is the same entry as `self`.
    ///
    /// A non-empty guid equal to `other`'s is a match. Otherwise the items match
    /// when both `pub_date` and `title` are identical. The relation is not
    /// symmetric: only `self`'s guid decides whether the guid check applies.
    pub fn matches(&self, other: &Item) -> bool {
        (!self.guid.is_empty() && self.guid == other.guid)
            || (self.pub_date == other.pub_date && self.title == other.title)
    }
}
