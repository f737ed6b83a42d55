//! quick-xml front-end producing an [`XmlDocument`].
//!
//! quick-xml reports element boundaries but not attribute positions, so the
//! raw start tag is re-scanned to recover the byte offsets of every attribute
//! name and quoted value.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use text_size::TextSize;

use crate::base::{DocumentId, ElementId, offset};
use crate::error::XmlError;

use super::{XmlAttr, XmlDocument, XmlElement};

/// Parse layout text into an element tree.
///
/// Elements still open at the end of input are kept with `closed == false`
/// and extend to the end of the text.
pub fn parse_document(id: DocumentId, path: impl Into<String>, text: &str) -> Result<XmlDocument, XmlError> {
    let mut doc = XmlDocument::new(id, path);
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = true;

    let mut stack: Vec<ElementId> = Vec::new();

    loop {
        let before = position(&reader);
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let id = open_element(&mut doc, &stack, text, e, before, position(&reader))?;
                stack.push(id);
            }
            Ok(Event::Empty(ref e)) => {
                let after = position(&reader);
                let id = open_element(&mut doc, &stack, text, e, before, after)?;
                let element = doc.element_mut(id);
                element.end = offset(after);
                element.closed = true;
            }
            Ok(Event::End(_)) => {
                if let Some(id) = stack.pop() {
                    let element = doc.element_mut(id);
                    element.end = offset(position(&reader));
                    element.closed = true;
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(XmlError::syntax(reader.error_position() as usize, err.to_string()));
            }
            _ => {}
        }
    }

    for id in stack {
        doc.element_mut(id).end = offset(text.len());
    }

    tracing::trace!(path = doc.path(), elements = doc.len(), "parsed layout document");
    Ok(doc)
}

fn position(reader: &Reader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

fn open_element(
    doc: &mut XmlDocument,
    stack: &[ElementId],
    text: &str,
    e: &BytesStart<'_>,
    start: usize,
    start_tag_end: usize,
) -> Result<ElementId, XmlError> {
    let name = e.name();
    let tag = std::str::from_utf8(name.as_ref()).map_err(|_| XmlError::Encoding("tag name"))?;

    let mut element = XmlElement::new(tag, offset(start));
    element.start_tag_end = offset(start_tag_end);

    let raw = text.get(start..start_tag_end).unwrap_or("");
    let mut scanner = AttrScanner::new(raw, start, 1 + tag.len());

    for attr in e.attributes() {
        let attr = attr.map_err(|err| XmlError::syntax(start, err.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(|_| XmlError::Encoding("attribute name"))?;
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::syntax(start, err.to_string()))?;

        let (name_start, value_start, end) = scanner.next_attr().unwrap_or((start, start, start));
        let escapes = text
            .get(value_start + 1..end.saturating_sub(1))
            .filter(|raw| raw.contains('&'))
            .map(escape_map)
            .unwrap_or_default();
        element.attributes.insert(
            key.into(),
            XmlAttr {
                name: key.into(),
                value: value.into_owned(),
                start: offset(name_start),
                end: offset(end),
                value_start: offset(value_start),
                escapes,
            },
        );
    }

    Ok(doc.push(stack.last().copied(), element))
}

/// `(unescaped, raw)` offset pairs at both edges of every entity reference
/// in a raw attribute value.
fn escape_map(raw: &str) -> Vec<(TextSize, TextSize)> {
    let mut map = Vec::new();
    let mut decoded = 0;
    let mut pos = 0;
    while let Some(amp) = raw[pos..].find('&') {
        let entity_start = pos + amp;
        let Some(semi) = raw[entity_start..].find(';') else {
            break;
        };
        let entity_end = entity_start + semi + 1;
        let entity = &raw[entity_start..entity_end];
        let width = quick_xml::escape::unescape(entity).map_or(entity.len(), |text| text.len());

        decoded += entity_start - pos;
        map.push((offset(decoded), offset(entity_start)));
        decoded += width;
        map.push((offset(decoded), offset(entity_end)));
        pos = entity_end;
    }
    map
}

/// Walks `name="value"` pairs of a raw start tag, yielding absolute offsets.
struct AttrScanner<'a> {
    bytes: &'a [u8],
    base: usize,
    pos: usize,
}

impl<'a> AttrScanner<'a> {
    /// `raw` starts at the '<' of the tag, located at `base`; `skip` covers "<tag".
    fn new(raw: &'a str, base: usize, skip: usize) -> Self {
        Self {
            bytes: raw.as_bytes(),
            base,
            pos: skip.min(raw.len()),
        }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    /// Returns `(name_start, value_start, end)` of the next attribute.
    fn next_attr(&mut self) -> Option<(usize, usize, usize)> {
        self.skip_ws();
        let name_start = self.pos;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b == b'=' || b.is_ascii_whitespace() || b == b'/' || b == b'>' {
                break;
            }
            self.pos += 1;
        }
        if self.pos == name_start {
            return None;
        }
        self.skip_ws();
        if self.bytes.get(self.pos) != Some(&b'=') {
            return None;
        }
        self.pos += 1;
        self.skip_ws();
        let quote = *self.bytes.get(self.pos)?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }
        let value_start = self.pos;
        self.pos += 1;
        while self.pos < self.bytes.len() && self.bytes[self.pos] != quote {
            self.pos += 1;
        }
        self.pos = (self.pos + 1).min(self.bytes.len());
        Some((
            self.base + name_start,
            self.base + value_start,
            self.base + self.pos,
        ))
    }
}

impl TryFrom<&str> for XmlDocument {
    type Error = XmlError;

    /// Parse a standalone document (id 0, no path).
    fn try_from(text: &str) -> Result<Self, Self::Error> {
        parse_document(DocumentId::new(0), "", text)
    }
}
