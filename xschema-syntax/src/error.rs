//! The error sink shared by the scanner and the schema traversal.

use std::fmt;

/// Domain of well-formedness errors raised while scanning markup.
pub const XML_DOMAIN: &str = "http://www.w3.org/TR/1998/REC-xml-19980210";

/// Domain of errors raised while building types from a schema document.
pub const SCHEMA_DOMAIN: &str = "http://www.w3.org/TR/xml-schema-1";

#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

/// Receives every error either component raises.
///
/// A fatal report unwinds the scan that raised it regardless of what the
/// sink does; the sink only gets a say for the character-level errors the
/// scanner knows how to step over (see
/// [`continue_after_fatal_error`](ErrorReporter::continue_after_fatal_error)).
pub trait ErrorReporter {
    fn report(&mut self, domain: &'static str, code: &str, args: &[String], severity: Severity);

    /// As [`report`](ErrorReporter::report), with the byte offset in the
    /// source document the error concerns.
    fn report_at(
        &mut self,
        offset: usize,
        domain: &'static str,
        code: &str,
        args: &[String],
        severity: Severity,
    ) {
        let _ = offset;
        self.report(domain, code, args, severity);
    }

    /// When true, an invalid character is reported and skipped instead of
    /// ending the scan.
    fn continue_after_fatal_error(&self) -> bool {
        false
    }
}

/// One recorded call to [`ErrorReporter::report`].
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Report {
    pub domain: &'static str,
    pub code: String,
    pub args: Vec<String>,
    pub severity: Severity,
    pub offset: Option<usize>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        if !self.args.is_empty() {
            write!(f, ": {}", self.args.join(", "))?;
        }
        Ok(())
    }
}

/// An [`ErrorReporter`] that keeps every report in the order received.
#[derive(Default, Debug)]
pub struct Collector {
    reports: Vec<Report>,
    continue_after_fatal: bool,
}

impl Collector {
    pub fn new() -> Collector {
        Collector::default()
    }

    pub fn continue_after_fatal(mut self, enabled: bool) -> Collector {
        self.continue_after_fatal = enabled;
        self
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn codes(&self) -> Vec<&str> {
        self.reports.iter().map(|r| r.code.as_str()).collect()
    }

    pub fn has(&self, code: &str) -> bool {
        self.reports.iter().any(|r| r.code == code)
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.reports.iter().any(|r| r.severity != Severity::Warning)
    }

    pub fn take(&mut self) -> Vec<Report> {
        std::mem::take(&mut self.reports)
    }
}

impl ErrorReporter for Collector {
    fn report(&mut self, domain: &'static str, code: &str, args: &[String], severity: Severity) {
        tracing::trace!(code, ?args, ?severity, "report");
        self.reports.push(Report {
            domain,
            code: code.to_string(),
            args: args.to_vec(),
            severity,
            offset: None,
        });
    }

    fn report_at(
        &mut self,
        offset: usize,
        domain: &'static str,
        code: &str,
        args: &[String],
        severity: Severity,
    ) {
        self.report(domain, code, args, severity);
        if let Some(last) = self.reports.last_mut() {
            last.offset = Some(offset);
        }
    }

    fn continue_after_fatal_error(&self) -> bool {
        self.continue_after_fatal
    }
}
