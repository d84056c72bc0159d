use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use super::charset::decode_document;
use super::model::{Feed, Image, Item};

/// A document that could not be turned into a [`Feed`].
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The XML is not well-formed (syntax, mismatched tags, unknown entities)
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document contains no root element at all
    #[error("document has no root element")]
    MissingRoot,

    /// The root element is not `<rss>`
    #[error("expected <rss> root element, found <{0}>")]
    UnexpectedRoot(String),

    /// The document ended before the named element was closed
    #[error("document ended inside <{0}>")]
    UnclosedElement(String),

    /// The declared or advertised charset is not one we can decode
    #[error("unsupported character encoding: {0}")]
    UnsupportedCharset(String),

    /// The bytes are not valid in the detected encoding
    #[error("document is not valid {0}")]
    InvalidEncoding(&'static str),
}

/// Parses an RSS 2.0 document that is already decoded to text.
///
/// An empty string is accepted and yields `Feed::default()`. Any other input
/// must be well-formed XML with an `<rss>` root element. Elements that are not
/// part of the channel, image or item schema are skipped, and so are prefixed
/// extension elements such as `atom:link`. Text is kept verbatim, CDATA
/// included. When an element repeats, the last occurrence wins.
///
/// Parsing stops once the root element closes.
///
/// The input is already Unicode, so an `encoding` in the XML declaration is
/// not consulted and an unknown label there is not an error. Use
/// [`parse_bytes`] to honor the declared encoding.
///
/// # Errors
///
/// Returns [`DocumentError`] for malformed XML, a missing or foreign root
/// element, or a truncated document.
pub fn parse_text(content: &str) -> Result<Feed, DocumentError> {
    if content.is_empty() {
        return Ok(Feed::default());
    }

    // quick-xml (0.37) does not expand <!ENTITY> declarations; unknown
    // entity references surface as an escape error from `unescape()`.
    let mut reader = Reader::from_str(content);
    let mut builder = FeedBuilder::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                builder.open(&e, &reader)?;
            }
            Event::Empty(e) => {
                builder.open(&e, &reader)?;
                if builder.close() {
                    break;
                }
            }
            Event::End(_) => {
                if builder.close() {
                    break;
                }
            }
            Event::Text(e) => builder.push_text(&e.unescape()?),
            Event::CData(e) => builder.push_text(&String::from_utf8_lossy(&e.into_inner())),
            Event::Eof => return Err(builder.eof_error()),
            _ => {}
        }
    }

    let feed = builder.feed;
    tracing::debug!(
        title = %feed.title,
        items = feed.items.len(),
        "Parsed RSS document"
    );
    Ok(feed)
}

/// Decodes raw document bytes and parses them.
///
/// `content_type` is the transport `Content-Type` value, if any, and is used
/// when the document itself carries no BOM or encoding declaration. Empty
/// input yields `Feed::default()`, as with [`parse_text`].
pub fn parse_bytes(bytes: &[u8], content_type: Option<&str>) -> Result<Feed, DocumentError> {
    if bytes.is_empty() {
        return Ok(Feed::default());
    }
    let text = decode_document(bytes, content_type)?;
    parse_text(&text)
}

/// Accumulates a [`Feed`] while walking the event stream.
///
/// `open` holds one entry per unclosed element: its qualified name and the
/// character data seen directly inside it.
#[derive(Default)]
struct FeedBuilder {
    feed: Feed,
    open: Vec<(String, String)>,
    root_seen: bool,
}

impl FeedBuilder {
    fn open(&mut self, e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<(), DocumentError> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

        if self.open.is_empty() {
            if e.local_name().as_ref() != b"rss" {
                return Err(DocumentError::UnexpectedRoot(name));
            }
            self.root_seen = true;
            self.feed.version = root_version(e, reader)?;
        } else if name == "item" && scope(&self.open) == ["channel"] {
            self.feed.items.push(Item::default());
        }

        self.open.push((name, String::new()));
        Ok(())
    }

    /// Closes the innermost element. Returns `true` once the root is closed.
    fn close(&mut self) -> bool {
        let Some((name, text)) = self.open.pop() else {
            return true;
        };
        if self.open.is_empty() {
            return true;
        }

        let field = match scope(&self.open).as_slice() {
            ["channel"] => channel_field(&mut self.feed, &name),
            ["channel", "image"] => image_field(&mut self.feed.image, &name),
            ["channel", "item"] => self
                .feed
                .items
                .last_mut()
                .and_then(|item| item_field(item, &name)),
            _ => None,
        };
        if let Some(field) = field {
            *field = text;
        }
        false
    }

    fn push_text(&mut self, text: &str) {
        if let Some((_, buf)) = self.open.last_mut() {
            buf.push_str(text);
        }
    }

    fn eof_error(&self) -> DocumentError {
        match self.open.last() {
            Some((name, _)) => DocumentError::UnclosedElement(name.clone()),
            None if self.root_seen => DocumentError::UnclosedElement("rss".to_owned()),
            None => DocumentError::MissingRoot,
        }
    }
}

/// Names of the open elements below the root, outermost first.
fn scope(open: &[(String, String)]) -> Vec<&str> {
    open.iter().skip(1).map(|(name, _)| name.as_str()).collect()
}

fn root_version(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<String, DocumentError> {
    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed attribute on <rss>");
                continue;
            }
        };
        if attr.key.as_ref() == b"version" {
            return Ok(attr.decode_and_unescape_value(reader.decoder())?.into_owned());
        }
    }
    Ok(String::new())
}

fn channel_field<'a>(feed: &'a mut Feed, name: &str) -> Option<&'a mut String> {
    let field = match name {
        "title" => &mut feed.title,
        "link" => &mut feed.link,
        "description" => &mut feed.description,
        "language" => &mut feed.language,
        "copyright" => &mut feed.copyright,
        "managingEditor" => &mut feed.managing_editor,
        "webMaster" => &mut feed.web_master,
        "pubDate" => &mut feed.pub_date,
        "lastBuildDate" => &mut feed.last_build_date,
        "category" => &mut feed.category,
        "generator" => &mut feed.generator,
        "docs" => &mut feed.docs,
        "ttl" => &mut feed.ttl,
        _ => return None,
    };
    Some(field)
}

fn image_field<'a>(image: &'a mut Image, name: &str) -> Option<&'a mut String> {
    let field = match name {
        "url" => &mut image.url,
        "title" => &mut image.title,
        "link" => &mut image.link,
        "width" => &mut image.width,
        "height" => &mut image.height,
        "description" => &mut image.description,
        _ => return None,
    };
    Some(field)
}

fn item_field<'a>(item: &'a mut Item, name: &str) -> Option<&'a mut String> {
    let field = match name {
        "title" => &mut item.title,
        "author" => &mut item.author,
        "description" => &mut item.description,
        "link" => &mut item.link,
        "pubDate" => &mut item.pub_date,
        "guid" => &mut item.guid,
        _ => return None,
    };
    Some(field)
}
