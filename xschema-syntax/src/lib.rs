//! Character-level XML scanning, and the contracts the schema model is
//! built on: character sources, error sinks and element trees.

pub mod buffer;
pub mod chars;
pub mod diagnostic;
pub mod error;
pub mod scanner;
pub mod source;
pub mod tree;

pub use buffer::XmlString;
pub use error::{Collector, ErrorReporter, Report, SCHEMA_DOMAIN, Severity, XML_DOMAIN};
pub use scanner::{Declaration, Markup, ScanError, ScanErrorCode, Scanner};
pub use source::{CharSource, DataRun, StrSource};
pub use tree::SchemaNode;
