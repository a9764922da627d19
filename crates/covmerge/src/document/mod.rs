//! Arena-backed XML document model.
//!
//! Every [`Document`] owns its nodes in a flat arena and hands out [`NodeId`]
//! handles into it. A handle is only meaningful for the document that issued
//! it; moving a subtree between documents always goes through
//! [`Document::import`], which deep-copies the nodes into the target arena.
//!
//! ```text
//! coverage ─┬─ sources ── source*
//!           └─ packages ── package* ── classes ── class* ── (opaque detail)
//! ```

mod reader;
mod writer;

use crate::result::{MergeError, MergeResult};
use std::path::Path;

/// Handle to a node inside one [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena slot of this node
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// An element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name
    pub name: String,
    /// Attributes in document order, values unescaped
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<NodeId>,
}

impl Element {
    /// Create an element without attributes or children
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Look up an attribute value
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A node stored in the document arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Element node
    Element(Element),
    /// Character data (unescaped)
    Text(String),
    /// CDATA section content
    CData(String),
    /// Comment content
    Comment(String),
}

/// In-memory XML tree
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    doctype: Option<String>,
}

impl Document {
    /// Create an empty document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from text
    pub fn parse(text: &str) -> MergeResult<Self> {
        reader::parse_document(text, Path::new("<memory>"))
    }

    /// Read and parse a document from disk
    pub fn load(path: &Path) -> MergeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| MergeError::parse(path, e.to_string()))?;
        reader::parse_document(&text, path)
    }

    /// Root element, if any
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Root element, which must carry the given tag
    pub fn root_element(&self, tag: &str) -> MergeResult<NodeId> {
        let root = self
            .root
            .ok_or_else(|| MergeError::structural("document has no root element"))?;
        let name = self.name(root);
        if name != tag {
            return Err(MergeError::structural(format!(
                "expected root element <{tag}>, found <{name}>"
            )));
        }
        Ok(root)
    }

    /// DOCTYPE declaration content, without the `<!DOCTYPE` wrapper
    #[must_use]
    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    /// Replace the DOCTYPE declaration
    pub fn set_doctype(&mut self, doctype: Option<String>) {
        self.doctype = doctype;
    }

    /// Number of nodes held by the arena
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Access a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different document.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Access a node as an element
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id.0)? {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Tag name of an element, empty for non-element nodes
    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        self.element(id).map_or("", |el| el.name.as_str())
    }

    /// Attribute lookup
    #[must_use]
    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        self.element(id)?.attribute(key)
    }

    /// Attribute lookup where absence is an error
    pub fn require_attribute(&self, id: NodeId, key: &str) -> MergeResult<&str> {
        self.attribute(id, key).ok_or_else(|| {
            MergeError::structural(format!(
                "<{}> is missing attribute \"{key}\"",
                self.name(id)
            ))
        })
    }

    /// All children of `parent`, any kind
    #[must_use]
    pub fn children(&self, parent: NodeId) -> &[NodeId] {
        self.element(parent)
            .map(|el| el.children.as_slice())
            .unwrap_or_default()
    }

    /// Element children of `parent` carrying `tag`, in document order
    pub fn children_named<'a>(
        &'a self,
        parent: NodeId,
        tag: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(parent)
            .iter()
            .copied()
            .filter(move |&child| self.element(child).is_some_and(|el| el.name == tag))
    }

    /// First element child of `parent` carrying `tag`
    #[must_use]
    pub fn first_child_named(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.children_named(parent, tag).next()
    }

    /// First element child of `parent` carrying `tag`, where absence is an error
    pub fn require_child(&self, parent: NodeId, tag: &str) -> MergeResult<NodeId> {
        self.first_child_named(parent, tag).ok_or_else(|| {
            MergeError::structural(format!(
                "<{}> has no <{tag}> child",
                self.name(parent)
            ))
        })
    }

    /// Add a detached element to the arena
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.push(Node::Element(Element::new(name)))
    }

    /// Make `id` the root element
    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Set or replace an attribute on an element. No-op on non-element nodes.
    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: impl Into<String>) {
        if let Some(Node::Element(el)) = self.nodes.get_mut(id.0) {
            let value = value.into();
            match el.attributes.iter_mut().find(|(k, _)| k == key) {
                Some((_, v)) => *v = value,
                None => el.attributes.push((key.to_string(), value)),
            }
        }
    }

    /// Append `child` to the children of `parent`. No-op if `parent` is not an element.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(Node::Element(el)) = self.nodes.get_mut(parent.0) {
            el.children.push(child);
        }
    }

    /// Deep-copy the subtree rooted at `node` of `source` into this document.
    ///
    /// The returned node is detached; attach it with [`Document::append_child`].
    /// Nothing in the copy refers back to `source`.
    pub fn import(&mut self, source: &Self, node: NodeId) -> NodeId {
        let copy = match source.node(node) {
            Node::Element(el) => {
                let children = el
                    .children
                    .iter()
                    .map(|&child| self.import(source, child))
                    .collect();
                Node::Element(Element {
                    name: el.name.clone(),
                    attributes: el.attributes.clone(),
                    children,
                })
            }
            other => other.clone(),
        };
        self.push(copy)
    }

    /// Serialize to XML text
    pub fn to_xml_string(&self) -> MergeResult<String> {
        writer::serialize(self)
    }

    /// Serialize and write to `path`, replacing it atomically
    pub fn write_to(&self, path: &Path) -> MergeResult<()> {
        writer::write_atomically(self, path)
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<!DOCTYPE coverage SYSTEM "http://cobertura.sourceforge.net/xml/coverage-04.dtd">
<coverage version="5.5" timestamp="1700000000">
  <sources><source>/src</source></sources>
  <packages>
    <package name="com.a" line-rate="0.5" branch-rate="0.25" complexity="1">
      <classes>
        <class name="com.a.X" filename="a/X.java" line-rate="0.5" branch-rate="0.25">
          <lines><line number="1" hits="3"/></lines>
        </class>
      </classes>
    </package>
  </packages>
</coverage>
"#;

    #[test]
    fn test_parse_root_and_attributes() {
        let doc = Document::parse(SAMPLE).unwrap();
        let root = doc.root_element("coverage").unwrap();
        assert_eq!(doc.attribute(root, "version"), Some("5.5"));
        assert_eq!(doc.attribute(root, "timestamp"), Some("1700000000"));
        assert_eq!(doc.attribute(root, "missing"), None);
    }

    #[test]
    fn test_doctype_retained() {
        let doc = Document::parse(SAMPLE).unwrap();
        assert!(doc.doctype().unwrap().contains("coverage-04.dtd"));
    }

    #[test]
    fn test_root_element_mismatch() {
        let doc = Document::parse("<report/>").unwrap();
        let err = doc.root_element("coverage").unwrap_err();
        assert!(err.to_string().contains("<report>"));
    }

    #[test]
    fn test_children_named_in_order() {
        let doc = Document::parse("<r><a n=\"1\"/><b/><a n=\"2\"/><!-- c --><a n=\"3\"/></r>").unwrap();
        let root = doc.root().unwrap();
        let values: Vec<_> = doc
            .children_named(root, "a")
            .map(|a| doc.attribute(a, "n").unwrap())
            .collect();
        assert_eq!(values, vec!["1", "2", "3"]);
        assert_eq!(doc.children(root).len(), 5);
    }

    #[test]
    fn test_require_child_missing() {
        let doc = Document::parse("<coverage/>").unwrap();
        let root = doc.root().unwrap();
        let err = doc.require_child(root, "packages").unwrap_err();
        assert!(err.to_string().contains("<packages>"));
    }

    #[test]
    fn test_require_attribute_missing() {
        let doc = Document::parse("<package line-rate=\"1.0\"/>").unwrap();
        let root = doc.root().unwrap();
        let err = doc.require_attribute(root, "name").unwrap_err();
        assert!(err.to_string().contains("\"name\""));
        assert!(err.to_string().contains("<package>"));
    }

    #[test]
    fn test_import_is_independent_of_source() {
        let source = Document::parse(SAMPLE).unwrap();
        let root = source.root().unwrap();
        let packages = source.require_child(root, "packages").unwrap();

        let mut target = Document::new();
        let out_root = target.create_element("out");
        target.set_root(out_root);
        let copy = target.import(&source, packages);
        target.append_child(out_root, copy);
        drop(source);

        let package = target.first_child_named(copy, "package").unwrap();
        assert_eq!(target.attribute(package, "name"), Some("com.a"));
        let class = target
            .first_child_named(target.first_child_named(package, "classes").unwrap(), "class")
            .unwrap();
        assert_eq!(target.attribute(class, "filename"), Some("a/X.java"));
    }

    #[test]
    fn test_import_preserves_text_and_comments() {
        let source = Document::parse("<c><!-- note --><s>/src &amp; more</s><![CDATA[raw <x>]]></c>").unwrap();
        let mut target = Document::new();
        let copy = target.import(&source, source.root().unwrap());
        target.set_root(copy);

        let kids = target.children(copy).to_vec();
        assert_eq!(target.node(kids[0]), &Node::Comment(" note ".to_string()));
        let s = target.children(kids[1])[0];
        assert_eq!(target.node(s), &Node::Text("/src & more".to_string()));
        assert_eq!(target.node(kids[2]), &Node::CData("raw <x>".to_string()));
    }

    #[test]
    fn test_set_attribute_replaces() {
        let mut doc = Document::new();
        let el = doc.create_element("package");
        doc.set_attribute(el, "name", "a");
        doc.set_attribute(el, "name", "b");
        assert_eq!(doc.attribute(el, "name"), Some("b"));
        assert_eq!(doc.element(el).unwrap().attributes.len(), 1);
    }

    #[test]
    fn test_load_missing_file_is_parse_error() {
        let err = Document::load(Path::new("/definitely/not/here.xml")).unwrap_err();
        assert!(matches!(err, MergeError::Parse { .. }));
        assert!(err.to_string().contains("/definitely/not/here.xml"));
    }
}
