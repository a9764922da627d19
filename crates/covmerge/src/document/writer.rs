//! [`Document`] → XML text, and atomic file output.

use super::{Document, Node, NodeId};
use crate::result::{MergeError, MergeResult};
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write as _;
use std::path::Path;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

pub(super) fn serialize(doc: &Document) -> MergeResult<String> {
    let mut prolog = Vec::new();
    prolog.extend_from_slice(XML_DECLARATION.as_bytes());
    prolog.push(b'\n');
    if let Some(doctype) = doc.doctype() {
        prolog.extend_from_slice(format!("<!DOCTYPE {doctype}>").as_bytes());
        prolog.push(b'\n');
    }

    let mut writer = Writer::new_with_indent(prolog, b' ', 2);
    if let Some(root) = doc.root() {
        write_node(&mut writer, doc, root)?;
    }

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes)
        .map_err(|e| MergeError::structural(format!("serialized report is not UTF-8: {e}")))
}

fn write_node(writer: &mut Writer<Vec<u8>>, doc: &Document, id: NodeId) -> MergeResult<()> {
    match doc.node(id) {
        Node::Element(element) => {
            let mut start = BytesStart::new(element.name.as_str());
            for (key, value) in &element.attributes {
                start.push_attribute((key.as_str(), value.as_str()));
            }

            if element.children.is_empty() {
                writer.write_event(Event::Empty(start))?;
            } else {
                writer.write_event(Event::Start(start))?;
                for &child in &element.children {
                    write_node(writer, doc, child)?;
                }
                writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
            }
        }
        Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        Node::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str())))?,
        Node::Comment(comment) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?;
        }
    }
    Ok(())
}

/// Serialize fully, then move a temp file over `path` so the target is
/// either untouched or complete.
pub(super) fn write_atomically(doc: &Document, path: &Path) -> MergeResult<()> {
    let xml = serialize(doc)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(xml.as_bytes())?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;

    tracing::debug!(path = %path.display(), bytes = xml.len(), "report written");
    Ok(())
}
