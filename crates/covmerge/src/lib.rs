//! covmerge: combine coverage reports from sharded test runs
//!
//! One *primary* report seeds the output; any number of *increment* reports
//! fill in packages and classes the primary lacks. Nothing is ever averaged or
//! recomputed: each package or class in the output is a verbatim copy of
//! exactly one input.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────────┐    ┌──────────────┐
//! │ primary.xml  │───►│              │    │ CoverageMerger   │    │              │
//! │ inc-1.xml    │───►│ Report       │───►│  1. seed         │───►│ MergedReport │──► target.xml
//! │ inc-N.xml    │───►│ (Document +  │    │  2. admit        │    │ (Document)   │
//! └──────────────┘    │  name index) │    │  3. fill classes │    └──────────────┘
//!                     └──────────────┘    └──────────────────┘
//!                                          IgnoreFilter / ZeroCoverageFilter
//! ```
//!
//! # Example
//!
//! ```
//! use covmerge::{merge_reports, IgnoreFilter, Report, ReportSource};
//!
//! let primary = Report::parse(
//!     r#"<coverage version="1" timestamp="0"><sources/><packages>
//!          <package name="app" line-rate="0.5" branch-rate="0.5" complexity="0"><classes/></package>
//!        </packages></coverage>"#,
//!     ReportSource::Primary,
//! )?;
//! let merged = merge_reports(&primary, &[], IgnoreFilter::new())?;
//! assert_eq!(merged.package_names().collect::<Vec<_>>(), vec!["app"]);
//! # Ok::<(), covmerge::MergeError>(())
//! ```

#![warn(missing_docs)]

pub mod document;
pub mod filter;
pub mod merger;
pub mod report;
mod result;

pub use document::{Document, Element, Node, NodeId};
pub use filter::{is_ignored, IgnoreFilter, ZeroCoverageFilter, ZERO_RATE};
pub use merger::{
    merge_reports, CoverageMerger, MergeEvent, MergeObserver, MergeSummary, MergedReport,
    SkipReason,
};
pub use report::{ClassEntry, Package, Rate, Report, ReportSource};
pub use result::{MergeError, MergeResult};
