//! Scanning of the declaration-level constructs of an XML document: XML and
//! text declarations, processing instructions, comments, character references
//! and surrogate pairs.
//!
//! Grammar productions referenced below are from
//! <https://www.w3.org/TR/xml/>.

use crate::buffer::XmlString;
use crate::chars;
use crate::error::{ErrorReporter, Severity, XML_DOMAIN};
use crate::source::{CharSource, DataRun};
use std::fmt;

const QUESTION: u16 = b'?' as u16;
const GT: u16 = b'>' as u16;
const LT: u16 = b'<' as u16;
const EQ: u16 = b'=' as u16;
const AMP: u16 = b'&' as u16;
const PERCENT: u16 = b'%' as u16;
const RSQB: u16 = b']' as u16;
const SEMICOLON: u16 = b';' as u16;
const QUOT: u16 = b'"' as u16;
const APOS: u16 = b'\'' as u16;

#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum ScanErrorCode {
    VersionNotSupported,
    VersionInfoRequired,
    EncodingDeclRequired,
    SDDeclInvalid,
    NoMorePseudoAttributes,
    MorePseudoAttributes,
    XMLDeclUnterminated,
    PseudoAttrNameExpected,
    EqRequiredInTextDecl,
    QuoteRequiredInTextDecl,
    InvalidCharInXMLDecl,
    InvalidCharInTextDecl,
    CloseQuoteMissingInTextDecl,
    PITargetRequired,
    ReservedPITarget,
    SpaceRequiredInPI,
    InvalidCharInPI,
    PIUnterminated,
    InvalidCharInComment,
    DashDashInComment,
    CommentUnterminated,
    SemicolonRequiredInCharRef,
    InvalidCharRef,
    InvalidCharInContent,
    NameRequiredInReference,
    SemicolonRequiredInReference,
}

impl ScanErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanErrorCode::VersionNotSupported => "VersionNotSupported",
            ScanErrorCode::VersionInfoRequired => "VersionInfoRequired",
            ScanErrorCode::EncodingDeclRequired => "EncodingDeclRequired",
            ScanErrorCode::SDDeclInvalid => "SDDeclInvalid",
            ScanErrorCode::NoMorePseudoAttributes => "NoMorePseudoAttributes",
            ScanErrorCode::MorePseudoAttributes => "MorePseudoAttributes",
            ScanErrorCode::XMLDeclUnterminated => "XMLDeclUnterminated",
            ScanErrorCode::PseudoAttrNameExpected => "PseudoAttrNameExpected",
            ScanErrorCode::EqRequiredInTextDecl => "EqRequiredInTextDecl",
            ScanErrorCode::QuoteRequiredInTextDecl => "QuoteRequiredInTextDecl",
            ScanErrorCode::InvalidCharInXMLDecl => "InvalidCharInXMLDecl",
            ScanErrorCode::InvalidCharInTextDecl => "InvalidCharInTextDecl",
            ScanErrorCode::CloseQuoteMissingInTextDecl => "CloseQuoteMissingInTextDecl",
            ScanErrorCode::PITargetRequired => "PITargetRequired",
            ScanErrorCode::ReservedPITarget => "ReservedPITarget",
            ScanErrorCode::SpaceRequiredInPI => "SpaceRequiredInPI",
            ScanErrorCode::InvalidCharInPI => "InvalidCharInPI",
            ScanErrorCode::PIUnterminated => "PIUnterminated",
            ScanErrorCode::InvalidCharInComment => "InvalidCharInComment",
            ScanErrorCode::DashDashInComment => "DashDashInComment",
            ScanErrorCode::CommentUnterminated => "CommentUnterminated",
            ScanErrorCode::SemicolonRequiredInCharRef => "SemicolonRequiredInCharRef",
            ScanErrorCode::InvalidCharRef => "InvalidCharRef",
            ScanErrorCode::InvalidCharInContent => "InvalidCharInContent",
            ScanErrorCode::NameRequiredInReference => "NameRequiredInReference",
            ScanErrorCode::SemicolonRequiredInReference => "SemicolonRequiredInReference",
        }
    }
}

/// A fatal well-formedness error. It has already been passed to the
/// [`ErrorReporter`] by the time the scan returns it.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ScanError {
    pub code: ScanErrorCode,
    pub args: Vec<String>,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code.as_str())?;
        if !self.args.is_empty() {
            write!(f, " ({})", self.args.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ScanError {}

/// Pseudo-attribute values of an XML or text declaration, in scan order.
#[derive(Default, PartialEq, Eq, Clone, Debug)]
pub struct Declaration {
    pub version: Option<String>,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

#[derive(Debug)]
pub struct ProcessingInstruction<'a> {
    pub target: String,
    pub data: &'a XmlString,
}

/// An item found by [`Scanner::scan_prolog`].
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Markup {
    Declaration(Declaration),
    ProcessingInstruction { target: String, data: String },
    Comment(String),
    CharReference(u32),
    EntityReference(String),
    Text(String),
}

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
enum DeclState {
    Version,
    Encoding,
    Standalone,
    Done,
}

/// Scratch state for scanning; reuse one per document.
///
/// Methods that return an [`XmlString`] lend out one of the scanner's own
/// buffers, so the result has to be copied before the scanner is used again.
#[derive(Default)]
pub struct Scanner {
    string: XmlString,
    string_buffer: XmlString,
    pseudo_attr_buffer: XmlString,
}

fn report_fatal(
    reporter: &mut dyn ErrorReporter,
    code: ScanErrorCode,
    args: Vec<String>,
) -> ScanError {
    reporter.report(XML_DOMAIN, code.as_str(), &args, Severity::Fatal);
    ScanError { code, args }
}

/// Reports a fatal error that the scanner can step over if the reporter asks
/// it to continue.
fn report_recoverable(
    reporter: &mut dyn ErrorReporter,
    code: ScanErrorCode,
    args: Vec<String>,
) -> Result<(), ScanError> {
    let err = report_fatal(reporter, code, args);
    if reporter.continue_after_fatal_error() {
        Ok(())
    } else {
        Err(err)
    }
}

impl Scanner {
    pub fn new() -> Scanner {
        Scanner::default()
    }

    /// Scans an XML or text declaration, positioned just after `<?xml`.
    ///
    /// ```text
    /// [23] XMLDecl ::= '<?xml' VersionInfo EncodingDecl? SDDecl? S? '?>'
    /// [77] TextDecl ::= '<?xml' VersionInfo? EncodingDecl S? '?>'
    /// ```
    pub fn scan_declaration(
        &mut self,
        source: &mut dyn CharSource,
        reporter: &mut dyn ErrorReporter,
        is_text_decl: bool,
    ) -> Result<Declaration, ScanError> {
        let mut decl = Declaration::default();
        let mut state = DeclState::Version;
        source.skip_spaces();
        while source.peek() != Some(QUESTION) {
            let (name, value) = self.scan_pseudo_attribute(source, reporter, is_text_decl)?;
            let value = value.to_string();
            match (state, name.as_str()) {
                (DeclState::Version, "version") => {
                    state = DeclState::Encoding;
                    if value != "1.0" {
                        return Err(report_fatal(
                            reporter,
                            ScanErrorCode::VersionNotSupported,
                            vec![value],
                        ));
                    }
                    decl.version = Some(value);
                }
                (DeclState::Version, "encoding") => {
                    if !is_text_decl {
                        return Err(report_fatal(
                            reporter,
                            ScanErrorCode::VersionInfoRequired,
                            vec![],
                        ));
                    }
                    decl.encoding = Some(value);
                    state = DeclState::Done;
                }
                (DeclState::Version, _) => {
                    let code = if is_text_decl {
                        ScanErrorCode::EncodingDeclRequired
                    } else {
                        ScanErrorCode::VersionInfoRequired
                    };
                    return Err(report_fatal(reporter, code, vec![]));
                }
                (DeclState::Encoding, "encoding") => {
                    decl.encoding = Some(value);
                    state = if is_text_decl {
                        DeclState::Done
                    } else {
                        DeclState::Standalone
                    };
                }
                (DeclState::Encoding | DeclState::Standalone, "standalone") if !is_text_decl => {
                    state = DeclState::Done;
                    if value != "yes" && value != "no" {
                        return Err(report_fatal(reporter, ScanErrorCode::SDDeclInvalid, vec![]));
                    }
                    decl.standalone = Some(value);
                }
                (DeclState::Encoding | DeclState::Standalone, _) => {
                    return Err(report_fatal(
                        reporter,
                        ScanErrorCode::EncodingDeclRequired,
                        vec![],
                    ));
                }
                (DeclState::Done, _) => {
                    return Err(report_fatal(
                        reporter,
                        ScanErrorCode::NoMorePseudoAttributes,
                        vec![],
                    ));
                }
            }
            source.skip_spaces();
        }
        if is_text_decl && state != DeclState::Done {
            return Err(report_fatal(
                reporter,
                ScanErrorCode::MorePseudoAttributes,
                vec![],
            ));
        }
        if !source.skip_char(QUESTION) || !source.skip_char(GT) {
            return Err(report_fatal(
                reporter,
                ScanErrorCode::XMLDeclUnterminated,
                vec![],
            ));
        }
        tracing::trace!(?decl, is_text_decl, "declaration");
        Ok(decl)
    }

    /// Scans one `name = 'value'` pair of a declaration.
    ///
    /// The error codes raised depend on `is_text_decl` only where the message
    /// names the kind of declaration.
    pub fn scan_pseudo_attribute(
        &mut self,
        source: &mut dyn CharSource,
        reporter: &mut dyn ErrorReporter,
        is_text_decl: bool,
    ) -> Result<(String, &XmlString), ScanError> {
        let Some(name) = source.scan_name() else {
            return Err(report_fatal(
                reporter,
                ScanErrorCode::PseudoAttrNameExpected,
                vec![],
            ));
        };
        source.skip_spaces();
        if !source.skip_char(EQ) {
            return Err(report_fatal(
                reporter,
                ScanErrorCode::EqRequiredInTextDecl,
                vec![name],
            ));
        }
        source.skip_spaces();
        let quote = match source.peek() {
            Some(q @ (QUOT | APOS)) => q,
            _ => {
                return Err(report_fatal(
                    reporter,
                    ScanErrorCode::QuoteRequiredInTextDecl,
                    vec![name],
                ));
            }
        };
        source.consume();
        let mut c = source.scan_literal(quote, &mut self.string);
        if c != Some(quote) {
            self.pseudo_attr_buffer.clear();
            loop {
                self.pseudo_attr_buffer.append(&self.string);
                match c {
                    // not markup inside a declaration
                    Some(unit @ (AMP | PERCENT | LT | RSQB)) => {
                        source.consume();
                        self.pseudo_attr_buffer.push(unit);
                    }
                    Some(unit) if chars::is_invalid(unit) => {
                        let code = if is_text_decl {
                            ScanErrorCode::InvalidCharInTextDecl
                        } else {
                            ScanErrorCode::InvalidCharInXMLDecl
                        };
                        report_recoverable(reporter, code, vec![format!("{unit:x}")])?;
                        source.consume();
                    }
                    _ => {}
                }
                c = source.scan_literal(quote, &mut self.string);
                if c == Some(quote) || c.is_none() {
                    break;
                }
            }
            self.pseudo_attr_buffer.append(&self.string);
            self.string.set(&self.pseudo_attr_buffer);
        }
        if !source.skip_char(quote) {
            return Err(report_fatal(
                reporter,
                ScanErrorCode::CloseQuoteMissingInTextDecl,
                vec![name],
            ));
        }
        Ok((name, &self.string))
    }

    /// Scans a processing instruction, positioned just after `<?`.
    ///
    /// ```text
    /// [16] PI ::= '<?' PITarget (S (Char* - (Char* '?>' Char*)))? '?>'
    /// [17] PITarget ::= Name - (('X' | 'x') ('M' | 'm') ('L' | 'l'))
    /// ```
    pub fn scan_pi(
        &mut self,
        source: &mut dyn CharSource,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<ProcessingInstruction<'_>, ScanError> {
        let Some(target) = source.scan_name() else {
            return Err(report_fatal(reporter, ScanErrorCode::PITargetRequired, vec![]));
        };
        let data = self.scan_pi_data(source, reporter, &target)?;
        Ok(ProcessingInstruction { target, data })
    }

    /// Scans the data of a processing instruction whose target has already
    /// been read, including the closing `?>`.
    ///
    /// Split out from [`scan_pi`](Scanner::scan_pi) for documents that start
    /// with a PI whose target merely begins with "xml", e.g. `<?xml-model`.
    pub fn scan_pi_data(
        &mut self,
        source: &mut dyn CharSource,
        reporter: &mut dyn ErrorReporter,
        target: &str,
    ) -> Result<&XmlString, ScanError> {
        if target.len() == 3 && target.eq_ignore_ascii_case("xml") {
            return Err(report_fatal(reporter, ScanErrorCode::ReservedPITarget, vec![]));
        }
        self.string_buffer.clear();
        if !source.skip_spaces() {
            if source.skip_string("?>") {
                return Ok(&self.string_buffer);
            }
            return Err(report_fatal(reporter, ScanErrorCode::SpaceRequiredInPI, vec![]));
        }
        loop {
            let run = source.scan_data("?>", &mut self.string);
            self.string_buffer.append(&self.string);
            match run {
                DataRun::Delimiter => break,
                DataRun::Eof => {
                    return Err(report_fatal(
                        reporter,
                        ScanErrorCode::PIUnterminated,
                        vec![target.to_string()],
                    ));
                }
                DataRun::Interrupted => {
                    if let Some(c) = source.peek() {
                        if chars::is_invalid(c) {
                            report_recoverable(
                                reporter,
                                ScanErrorCode::InvalidCharInPI,
                                vec![format!("{c:x}")],
                            )?;
                            source.consume();
                        }
                    }
                }
            }
        }
        Ok(&self.string_buffer)
    }

    /// Scans a comment, positioned just after `<!--`.
    ///
    /// ```text
    /// [15] Comment ::= '<!--' ((Char - '-') | ('-' (Char - '-')))* '-->'
    /// ```
    pub fn scan_comment(
        &mut self,
        source: &mut dyn CharSource,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<&XmlString, ScanError> {
        self.string_buffer.clear();
        loop {
            let run = source.scan_data("--", &mut self.string);
            self.string_buffer.append(&self.string);
            match run {
                DataRun::Delimiter => break,
                DataRun::Eof => {
                    return Err(report_fatal(
                        reporter,
                        ScanErrorCode::CommentUnterminated,
                        vec![],
                    ));
                }
                DataRun::Interrupted => {
                    if let Some(c) = source.peek() {
                        if chars::is_invalid(c) {
                            report_recoverable(
                                reporter,
                                ScanErrorCode::InvalidCharInComment,
                                vec![format!("{c:x}")],
                            )?;
                            source.consume();
                        }
                    }
                }
            }
        }
        if !source.skip_char(GT) {
            return Err(report_fatal(reporter, ScanErrorCode::DashDashInComment, vec![]));
        }
        Ok(&self.string_buffer)
    }

    /// Scans a character reference, positioned just after `&#`, appending
    /// the referenced character to `buf` and returning its code point.
    ///
    /// ```text
    /// [66] CharRef ::= '&#' [0-9]+ ';' | '&#x' [0-9a-fA-F]+ ';'
    /// ```
    pub fn scan_char_reference_value(
        &mut self,
        source: &mut dyn CharSource,
        reporter: &mut dyn ErrorReporter,
        buf: &mut XmlString,
    ) -> Result<u32, ScanError> {
        let hex = source.skip_char(b'x' as u16);
        self.string_buffer.clear();
        while let Some(c) = source.peek() {
            let digit = c < 0x80 && {
                let b = c as u8;
                if hex {
                    b.is_ascii_hexdigit()
                } else {
                    b.is_ascii_digit()
                }
            };
            if !digit {
                break;
            }
            source.consume();
            self.string_buffer.push(c);
        }
        if !source.skip_char(SEMICOLON) {
            return Err(report_fatal(
                reporter,
                ScanErrorCode::SemicolonRequiredInCharRef,
                vec![],
            ));
        }
        let digits = self.string_buffer.to_string();
        // an empty or overlong digit run has no value at all
        let value = u32::from_str_radix(&digits, if hex { 16 } else { 10 }).ok();
        let value = match value {
            Some(v) if chars::is_valid(v) => v,
            other => {
                let text = other
                    .map(|v| format!("{v:x}"))
                    .unwrap_or_else(|| "-1".to_string());
                return Err(report_fatal(reporter, ScanErrorCode::InvalidCharRef, vec![text]));
            }
        };
        if chars::is_supplemental(value) {
            buf.push(chars::high_surrogate(value));
            buf.push(chars::low_surrogate(value));
        } else {
            buf.push(value as u16);
        }
        Ok(value)
    }

    /// Scans a surrogate pair whose high half is the next unit, appending both
    /// halves to `buf`.
    ///
    /// Returns false, leaving the unit after the high surrogate unconsumed,
    /// when no low surrogate follows and the reporter chose to continue.
    pub fn scan_surrogates(
        &mut self,
        source: &mut dyn CharSource,
        reporter: &mut dyn ErrorReporter,
        buf: &mut XmlString,
    ) -> Result<bool, ScanError> {
        let Some(high) = source.consume() else {
            return Ok(false);
        };
        match source.peek() {
            Some(low) if chars::is_low_surrogate(low) => {
                source.consume();
                buf.push(high);
                buf.push(low);
                Ok(true)
            }
            _ => {
                report_recoverable(
                    reporter,
                    ScanErrorCode::InvalidCharInContent,
                    vec![format!("{high:x}")],
                )?;
                Ok(false)
            }
        }
    }

    /// Scans everything before the first start tag or doctype: an optional
    /// leading declaration, then PIs, comments, references and text.
    pub fn scan_prolog(
        &mut self,
        source: &mut dyn CharSource,
        reporter: &mut dyn ErrorReporter,
        is_text_decl: bool,
    ) -> Result<Vec<Markup>, ScanError> {
        let mut items = vec![];
        let mut at_start = true;
        loop {
            let first = std::mem::replace(&mut at_start, false);
            if source.skip_string("<?xml") {
                if first && source.peek().is_some_and(chars::is_space) {
                    let decl = self.scan_declaration(source, reporter, is_text_decl)?;
                    items.push(Markup::Declaration(decl));
                } else {
                    let mut name = XmlString::from("xml");
                    while let Some(unit) = source.peek() {
                        if !chars::is_name(unit as u32) {
                            break;
                        }
                        source.consume();
                        name.push(unit);
                    }
                    let target = name.to_string();
                    let data = self.scan_pi_data(source, reporter, &target)?.to_string();
                    items.push(Markup::ProcessingInstruction { target, data });
                }
            } else if source.skip_string("<?") {
                let pi = self.scan_pi(source, reporter)?;
                let data = pi.data.to_string();
                items.push(Markup::ProcessingInstruction {
                    target: pi.target,
                    data,
                });
            } else if source.skip_string("<!--") {
                let text = self.scan_comment(source, reporter)?.to_string();
                items.push(Markup::Comment(text));
            } else if source.skip_string("&#") {
                let mut buf = XmlString::new();
                let value = self.scan_char_reference_value(source, reporter, &mut buf)?;
                items.push(Markup::CharReference(value));
            } else if source.skip_char(AMP) {
                let Some(name) = source.scan_name() else {
                    return Err(report_fatal(
                        reporter,
                        ScanErrorCode::NameRequiredInReference,
                        vec![],
                    ));
                };
                if !source.skip_char(SEMICOLON) {
                    return Err(report_fatal(
                        reporter,
                        ScanErrorCode::SemicolonRequiredInReference,
                        vec![name],
                    ));
                }
                items.push(Markup::EntityReference(name));
            } else if matches!(source.peek(), None | Some(LT)) {
                break;
            } else {
                let text = self.scan_text(source, reporter)?;
                items.push(Markup::Text(text));
            }
        }
        Ok(items)
    }

    fn scan_text(
        &mut self,
        source: &mut dyn CharSource,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<String, ScanError> {
        self.string_buffer.clear();
        loop {
            let stop = source.scan_literal(LT, &mut self.string);
            self.string_buffer.append(&self.string);
            match stop {
                None | Some(LT) | Some(AMP) => break,
                Some(unit) if chars::is_high_surrogate(unit) => {
                    let mut pair = XmlString::new();
                    self.scan_surrogates(source, reporter, &mut pair)?;
                    self.string_buffer.append(&pair);
                }
                Some(unit) if chars::is_invalid(unit) => {
                    report_recoverable(
                        reporter,
                        ScanErrorCode::InvalidCharInContent,
                        vec![format!("{unit:x}")],
                    )?;
                    source.consume();
                }
                Some(unit) => {
                    source.consume();
                    self.string_buffer.push(unit);
                }
            }
        }
        Ok(self.string_buffer.to_string())
    }
}
