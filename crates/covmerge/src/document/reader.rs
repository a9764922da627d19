//! XML text → [`Document`] using `quick-xml` events.

use super::{Document, Element, Node, NodeId};
use crate::result::{MergeError, MergeResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

/// Parse `text`, attributing errors to `origin`
pub(super) fn parse_document(text: &str, origin: &Path) -> MergeResult<Document> {
    let mut reader = Reader::from_str(text);

    let mut doc = Document::new();
    let mut open: Vec<NodeId> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            MergeError::parse(
                origin,
                format!("{e} (near byte {})", reader.buffer_position()),
            )
        })?;

        match event {
            Event::Start(start) => {
                let id = attach_element(&mut doc, &open, &start, origin)?;
                open.push(id);
            }
            Event::Empty(start) => {
                attach_element(&mut doc, &open, &start, origin)?;
            }
            Event::End(_) => {
                open.pop();
            }
            // Indentation between elements is dropped; any other text is kept as written.
            Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => {}
            Event::Text(text) => {
                let value = text
                    .unescape()
                    .map_err(|e| MergeError::parse(origin, e.to_string()))?;
                match open.last() {
                    Some(&parent) => {
                        let id = doc.push(Node::Text(value.into_owned()));
                        doc.append_child(parent, id);
                    }
                    None => {
                        return Err(MergeError::parse(
                            origin,
                            "character data outside of the root element",
                        ))
                    }
                }
            }
            Event::CData(data) => {
                if let Some(&parent) = open.last() {
                    let id = doc.push(Node::CData(String::from_utf8_lossy(&data).into_owned()));
                    doc.append_child(parent, id);
                }
            }
            Event::Comment(comment) => {
                // Comments in the prolog/epilog are dropped.
                if let Some(&parent) = open.last() {
                    let id =
                        doc.push(Node::Comment(String::from_utf8_lossy(&comment).into_owned()));
                    doc.append_child(parent, id);
                }
            }
            Event::DocType(doctype) => {
                doc.doctype = Some(String::from_utf8_lossy(&doctype).trim().to_string());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(&unclosed) = open.last() {
        return Err(MergeError::parse(
            origin,
            format!("element <{}> is never closed", doc.name(unclosed)),
        ));
    }
    if doc.root.is_none() {
        return Err(MergeError::parse(origin, "document has no root element"));
    }

    Ok(doc)
}

fn attach_element(
    doc: &mut Document,
    open: &[NodeId],
    start: &BytesStart<'_>,
    origin: &Path,
) -> MergeResult<NodeId> {
    let element = element_from(start, origin)?;
    let name = element.name.clone();
    let id = doc.push(Node::Element(element));

    match open.last() {
        Some(&parent) => doc.append_child(parent, id),
        None if doc.root.is_none() => doc.set_root(id),
        None => {
            return Err(MergeError::parse(
                origin,
                format!("second root element <{name}>"),
            ))
        }
    }
    Ok(id)
}

fn element_from(start: &BytesStart<'_>, origin: &Path) -> MergeResult<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));

    for attr in start.attributes() {
        let attr = attr.map_err(|e| {
            MergeError::parse(
                origin,
                format!("bad attribute on <{}>: {e}", element.name),
            )
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| MergeError::parse(origin, e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}
