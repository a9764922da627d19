//! Output tree under construction, owned by a single merge call.

use super::observer::MergeSummary;
use super::MergedReport;
use crate::document::{Document, NodeId};
use crate::report::{ClassEntry, Package, Report};
use crate::result::MergeResult;
use std::collections::{HashMap, HashSet};

/// A package already written to the output
#[derive(Debug, Clone)]
pub(crate) struct MergedPackage {
    pub(crate) name: String,
    pub(crate) classes_node: NodeId,
    pub(crate) classes: Vec<String>,
    class_set: HashSet<String>,
}

impl MergedPackage {
    pub(crate) fn contains(&self, class: &str) -> bool {
        self.class_set.contains(class)
    }
}

#[derive(Debug)]
pub(crate) struct MergeContext {
    output: Document,
    packages_node: NodeId,
    packages: Vec<MergedPackage>,
    index: HashMap<String, usize>,
    pub(crate) summary: MergeSummary,
}

impl MergeContext {
    /// Fresh output: `version`/`timestamp` and a clone of `sources` from the primary
    /// report, and an empty `packages` element.
    pub(crate) fn new(primary: &Report) -> MergeResult<Self> {
        let source = primary.document();
        let mut output = Document::new();
        output.set_doctype(source.doctype().map(str::to_string));

        let root = output.create_element("coverage");
        output.set_attribute(root, "version", primary.version()?);
        output.set_attribute(root, "timestamp", primary.timestamp()?);
        output.set_root(root);

        let sources = output.import(source, primary.sources());
        output.append_child(root, sources);

        let packages_node = output.create_element("packages");
        output.append_child(root, packages_node);

        Ok(Self {
            output,
            packages_node,
            packages: Vec::new(),
            index: HashMap::new(),
            summary: MergeSummary::default(),
        })
    }

    pub(crate) fn contains_package(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub(crate) fn package(&self, name: &str) -> Option<&MergedPackage> {
        self.index.get(name).map(|&i| &self.packages[i])
    }

    /// Append an empty package carrying only `name` and `complexity`
    pub(crate) fn add_package(&mut self, package: &Package) {
        let node = self.output.create_element("package");
        self.output.set_attribute(node, "name", package.name.as_str());
        self.output
            .set_attribute(node, "complexity", package.complexity.as_str());
        let classes_node = self.output.create_element("classes");
        self.output.append_child(node, classes_node);
        self.output.append_child(self.packages_node, node);

        self.index.insert(package.name.clone(), self.packages.len());
        self.packages.push(MergedPackage {
            name: package.name.clone(),
            classes_node,
            classes: Vec::new(),
            class_set: HashSet::new(),
        });
    }

    /// Clone `class` from `source` into the merged package `package`.
    /// Returns false if the package is not in the output.
    pub(crate) fn add_class(&mut self, package: &str, source: &Report, class: &ClassEntry) -> bool {
        let Some(&i) = self.index.get(package) else {
            return false;
        };
        let copy = self.output.import(source.document(), class.node);
        let merged = &mut self.packages[i];
        self.output.append_child(merged.classes_node, copy);
        merged.classes.push(class.name.clone());
        merged.class_set.insert(class.name.clone());
        true
    }

    pub(crate) fn finish(self) -> MergedReport {
        MergedReport::new(self.output, self.packages, self.index, self.summary)
    }
}
