use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// One `<item>` of an RSS channel, as found in the document.
///
/// Text fields hold exactly what the XML reader produced (entities and CDATA
/// decoded, nothing trimmed). Fields missing from the item are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub pub_date: String,
    /// `<media:thumbnail url="...">`, or the element text when there is no `url`.
    pub thumbnail: Option<String>,
    /// `<enclosure url="...">`
    pub enclosure: Option<String>,
    /// `<description>`, falling back to `<content:encoded>`.
    pub description: Option<String>,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("unexpected end of document: <{0}> is not closed")]
    Unclosed(String),
    #[error("document has no root element")]
    NoRoot,
}

/// Item child elements we keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    PubDate,
    Thumbnail,
    Description,
    ContentEncoded,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"link" => Some(Self::Link),
            b"pubDate" => Some(Self::PubDate),
            b"media:thumbnail" => Some(Self::Thumbnail),
            b"description" => Some(Self::Description),
            b"content:encoded" => Some(Self::ContentEncoded),
            _ => None,
        }
    }
}

/// Accumulates one item while its subtree is being read.
#[derive(Default)]
struct ItemBuilder {
    item: FeedItem,
    content_encoded: Option<String>,
    /// Fields whose first occurrence has been opened, empty or not.
    seen: Vec<Field>,
    /// Field currently receiving text, and whether it is the first occurrence.
    capturing: Option<(Field, bool)>,
    text: String,
}

impl ItemBuilder {
    /// Marks `field` as seen; true only for its first occurrence.
    fn claim(&mut self, field: Field) -> bool {
        if self.seen.contains(&field) {
            return false;
        }
        self.seen.push(field);
        true
    }

    fn commit(&mut self, field: Field, text: String) {
        match field {
            Field::Title => self.item.title = text,
            Field::Link => self.item.link = text,
            Field::PubDate => self.item.pub_date = text,
            Field::Thumbnail => self.item.thumbnail = Some(text),
            Field::Description => self.item.description = Some(text),
            Field::ContentEncoded => self.content_encoded = Some(text),
        }
    }

    fn finish(mut self) -> FeedItem {
        let no_description = self.item.description.as_deref().map_or(true, str::is_empty);
        if no_description && self.content_encoded.is_some() {
            self.item.description = self.content_encoded;
        }
        self.item
    }
}

/// Parses an RSS document into at most `max_items` items, in document order.
///
/// Only `rss/channel/item` elements are considered. A document without a
/// channel or without items yields an empty list. Anything that is not
/// well-formed XML is an error.
pub fn parse_feed(bytes: &[u8], max_items: usize) -> Result<Vec<FeedItem>, ParseError> {
    // quick-xml (0.37) never expands <!ENTITY> declarations; only the
    // five predefined entities are resolved by `unescape()`.
    let mut reader = Reader::from_reader(bytes);
    let decoder = reader.decoder();

    let mut items = Vec::new();
    let mut buf = Vec::new();
    // Open element names from the root down
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut seen_root = false;
    let mut current: Option<ItemBuilder> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                seen_root = true;
                let name = e.name().as_ref().to_vec();

                if is_item_path(&stack, &name) {
                    current = Some(ItemBuilder::default());
                } else if let Some(builder) = current.as_mut() {
                    // Direct children of <item> only
                    if stack.len() == 3 {
                        handle_child(builder, &e, decoder, false)?;
                    }
                }

                stack.push(name);
            }
            Event::Empty(e) => {
                seen_root = true;
                if is_item_path(&stack, e.name().as_ref()) {
                    if items.len() < max_items {
                        items.push(FeedItem::default());
                    }
                } else if let Some(builder) = current.as_mut() {
                    if stack.len() == 3 {
                        handle_child(builder, &e, decoder, true)?;
                    }
                }
            }
            Event::Text(e) => {
                if let Some(builder) = current.as_mut() {
                    if builder.capturing.is_some() && stack.len() == 4 {
                        builder.text.push_str(&e.unescape()?);
                    }
                }
            }
            Event::CData(e) => {
                if let Some(builder) = current.as_mut() {
                    if builder.capturing.is_some() && stack.len() == 4 {
                        builder.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
            }
            Event::End(_) => {
                // quick-xml rejects mismatched end tags, so the popped name is ours
                stack.pop();

                if let Some(builder) = current.as_mut() {
                    if stack.len() == 3 {
                        if let Some((field, first)) = builder.capturing.take() {
                            let text = std::mem::take(&mut builder.text);
                            if first {
                                builder.commit(field, text);
                            }
                        }
                    }
                }

                if stack.len() == 2 {
                    if let Some(builder) = current.take() {
                        if items.len() < max_items {
                            items.push(builder.finish());
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::Unclosed(
            String::from_utf8_lossy(&open).into_owned(),
        ));
    }
    if !seen_root {
        return Err(ParseError::NoRoot);
    }

    Ok(items)
}

/// True when `name` opened under `stack` is an `rss/channel/item` element.
fn is_item_path(stack: &[Vec<u8>], name: &[u8]) -> bool {
    name == b"item"
        && stack.len() == 2
        && stack[0].as_slice() == b"rss"
        && stack[1].as_slice() == b"channel"
}

/// Records an item child element: attribute-borne candidates are read
/// immediately, text-bearing fields start capturing.
fn handle_child(
    builder: &mut ItemBuilder,
    e: &BytesStart<'_>,
    decoder: quick_xml::encoding::Decoder,
    empty: bool,
) -> Result<(), ParseError> {
    let name = e.name();

    if name.as_ref() == b"enclosure" {
        if builder.item.enclosure.is_none() {
            if let Some(attr) = e.try_get_attribute("url")? {
                builder.item.enclosure = Some(attr.decode_and_unescape_value(decoder)?.into_owned());
            }
        }
        return Ok(());
    }

    let Some(field) = Field::from_name(name.as_ref()) else {
        return Ok(());
    };
    let first = builder.claim(field);

    if field == Field::Thumbnail && first {
        if let Some(attr) = e.try_get_attribute("url")? {
            builder.item.thumbnail = Some(attr.decode_and_unescape_value(decoder)?.into_owned());
            return Ok(());
        }
    }

    if empty {
        // <title/> and friends carry no text
        if first {
            builder.commit(field, String::new());
        }
    } else {
        builder.capturing = Some((field, first));
        builder.text.clear();
    }
    Ok(())
}
