//! Typed view over a Cobertura-style coverage document.
//!
//! A [`Report`] owns its [`Document`] and indexes the two levels the merger
//! cares about (`package` and `class`) by name. Everything below a class is
//! opaque and only ever copied.

use crate::document::{Document, NodeId};
use crate::filter::ZERO_RATE;
use crate::result::{MergeError, MergeResult};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a report came from on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportSource {
    /// The first input report
    Primary,
    /// Increment report, zero-based in argument order
    Increment(usize),
}

impl fmt::Display for ReportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Increment(index) => write!(f, "increment #{}", index + 1),
        }
    }
}

/// A `line-rate`/`branch-rate` value: the text as written plus its number
#[derive(Debug, Clone, PartialEq)]
pub struct Rate {
    raw: String,
    value: f64,
}

impl Rate {
    /// Parse attribute text. Anything but a finite decimal is rejected.
    pub fn parse(raw: impl Into<String>) -> MergeResult<Self> {
        let raw = raw.into();
        let value = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| MergeError::structural(format!("\"{raw}\" is not a valid rate")))?;
        Ok(Self { raw, value })
    }

    /// Text as written in the report
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the text is exactly [`ZERO_RATE`]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.raw == ZERO_RATE
    }

    /// Numeric value for comparisons
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A `class` element of a package
#[derive(Debug, Clone)]
pub struct ClassEntry {
    /// Class name, unique within its package
    pub name: String,
    /// Branch coverage
    pub branch_rate: Rate,
    /// Line coverage
    pub line_rate: Rate,
    /// The `class` element itself
    pub node: NodeId,
}

/// A `package` element with its classes
#[derive(Debug, Clone)]
pub struct Package {
    /// Package name, unique within the report
    pub name: String,
    /// Complexity, copied opaquely
    pub complexity: String,
    /// Branch coverage
    pub branch_rate: Rate,
    /// Line coverage
    pub line_rate: Rate,
    /// The `package` element itself
    pub node: NodeId,
    classes: Vec<ClassEntry>,
    class_index: HashMap<String, usize>,
}

impl Package {
    /// Classes in document order
    #[must_use]
    pub fn classes(&self) -> &[ClassEntry] {
        &self.classes
    }

    /// Class by name
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&ClassEntry> {
        self.class_index.get(name).map(|&i| &self.classes[i])
    }
}

/// One loaded coverage report
#[derive(Debug)]
pub struct Report {
    source: ReportSource,
    label: String,
    document: Document,
    root: NodeId,
    sources: NodeId,
    packages: Vec<Package>,
    package_index: HashMap<String, usize>,
}

impl Report {
    /// Load and index a report file
    pub fn load(path: &Path, source: ReportSource) -> MergeResult<Self> {
        let document = Document::load(path)?;
        Self::from_document(document, source)
            .map(|report| report.with_label(path.display().to_string()))
            .map_err(|e| attribute_to(path, e))
    }

    /// Parse and index report text
    pub fn parse(text: &str, source: ReportSource) -> MergeResult<Self> {
        Self::from_document(Document::parse(text)?, source)
    }

    /// Index an already parsed document
    pub fn from_document(document: Document, source: ReportSource) -> MergeResult<Self> {
        let root = document.root_element("coverage")?;
        let packages_node = document.require_child(root, "packages")?;
        let sources = document.require_child(root, "sources")?;

        let mut packages = Vec::new();
        let mut package_index = HashMap::new();
        for node in document.children_named(packages_node, "package") {
            let package = index_package(&document, node)?;
            if package_index.insert(package.name.clone(), packages.len()).is_some() {
                return Err(MergeError::structural(format!(
                    "package \"{}\" appears more than once",
                    package.name
                )));
            }
            packages.push(package);
        }

        Ok(Self {
            source,
            label: source.to_string(),
            document,
            root,
            sources,
            packages,
            package_index,
        })
    }

    /// Replace the label used in progress messages
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Position of this report among the inputs
    #[must_use]
    pub const fn source(&self) -> ReportSource {
        self.source
    }

    /// Human-readable name, normally the input path
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Underlying document
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// The `coverage` root element
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// `version` attribute of the root
    pub fn version(&self) -> MergeResult<&str> {
        self.document.require_attribute(self.root, "version")
    }

    /// `timestamp` attribute of the root
    pub fn timestamp(&self) -> MergeResult<&str> {
        self.document.require_attribute(self.root, "timestamp")
    }

    /// The opaque `sources` element
    #[must_use]
    pub const fn sources(&self) -> NodeId {
        self.sources
    }

    /// Packages in document order
    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Package by name
    #[must_use]
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.package_index.get(name).map(|&i| &self.packages[i])
    }
}

fn index_package(doc: &Document, node: NodeId) -> MergeResult<Package> {
    let name = doc.require_attribute(node, "name")?.to_string();
    let in_package = |e: MergeError| match e {
        MergeError::Structural { message } => {
            MergeError::structural(format!("package \"{name}\": {message}"))
        }
        other => other,
    };

    let complexity = doc.require_attribute(node, "complexity").map_err(in_package)?;
    let branch_rate = rate_attribute(doc, node, "branch-rate").map_err(in_package)?;
    let line_rate = rate_attribute(doc, node, "line-rate").map_err(in_package)?;
    let classes_node = doc.require_child(node, "classes").map_err(in_package)?;

    let mut classes = Vec::new();
    let mut class_index = HashMap::new();
    for class_node in doc.children_named(classes_node, "class") {
        let class = index_class(doc, class_node).map_err(in_package)?;
        if class_index.insert(class.name.clone(), classes.len()).is_some() {
            return Err(in_package(MergeError::structural(format!(
                "class \"{}\" appears more than once",
                class.name
            ))));
        }
        classes.push(class);
    }

    Ok(Package {
        complexity: complexity.to_string(),
        branch_rate,
        line_rate,
        node,
        classes,
        class_index,
        name,
    })
}

fn index_class(doc: &Document, node: NodeId) -> MergeResult<ClassEntry> {
    let name = doc.require_attribute(node, "name")?.to_string();
    let in_class = |e: MergeError| match e {
        MergeError::Structural { message } => {
            MergeError::structural(format!("class \"{name}\": {message}"))
        }
        other => other,
    };
    let branch_rate = rate_attribute(doc, node, "branch-rate").map_err(in_class)?;
    let line_rate = rate_attribute(doc, node, "line-rate").map_err(in_class)?;
    Ok(ClassEntry {
        name,
        branch_rate,
        line_rate,
        node,
    })
}

fn rate_attribute(doc: &Document, node: NodeId, key: &str) -> MergeResult<Rate> {
    let raw = doc.require_attribute(node, key)?;
    Rate::parse(raw).map_err(|e| match e {
        MergeError::Structural { message } => {
            MergeError::structural(format!("{key}: {message}"))
        }
        other => other,
    })
}

/// Structural problems found while loading a file are reported against it.
fn attribute_to(path: &Path, err: MergeError) -> MergeError {
    match err {
        MergeError::Structural { message } => MergeError::Parse {
            path: PathBuf::from(path),
            message,
        },
        other => other,
    }
}
