use assert_matches::assert_matches;
use xschema_syntax::source::CharSource;
use xschema_syntax::{
    Collector, Declaration, Markup, ScanError, ScanErrorCode, Scanner, Severity, StrSource,
};

fn prolog(text: &str) -> (Result<Vec<Markup>, ScanError>, Collector) {
    let mut src = StrSource::new(text);
    let mut errors = Collector::new();
    let items = Scanner::new().scan_prolog(&mut src, &mut errors, false);
    (items, errors)
}

#[test]
fn document_prolog() {
    let (items, errors) = prolog(
        "<?xml version=\"1.0\" encoding='UTF-8'?>\n\
         <?xml-stylesheet type=\"text/xsl\" href=\"s.xsl\"?>\n\
         <!-- generated -->\n\
         <!DOCTYPE r>",
    );
    let items = items.unwrap();
    assert!(errors.is_empty());
    assert_eq!(
        items[0],
        Markup::Declaration(Declaration {
            version: Some("1.0".to_string()),
            encoding: Some("UTF-8".to_string()),
            standalone: None,
        })
    );
    assert_matches!(
        &items[2],
        Markup::ProcessingInstruction { target, data }
            if target == "xml-stylesheet" && data == "type=\"text/xsl\" href=\"s.xsl\""
    );
    assert_eq!(items[4], Markup::Comment(" generated ".to_string()));
    assert_eq!(items.len(), 6);
}

#[test]
fn text_declaration_of_external_entity() {
    let mut src = StrSource::new("<?xml encoding=\"ISO-8859-1\"?>caf&#xE9;");
    let mut errors = Collector::new();
    let items = Scanner::new()
        .scan_prolog(&mut src, &mut errors, true)
        .unwrap();
    assert_eq!(
        items,
        vec![
            Markup::Declaration(Declaration {
                version: None,
                encoding: Some("ISO-8859-1".to_string()),
                standalone: None,
            }),
            Markup::Text("caf".to_string()),
            Markup::CharReference(0xE9),
        ]
    );
    assert!(src.is_at_end());
}

#[test]
fn supplementary_text_passes_through() {
    let (items, errors) = prolog("\u{10348}&#x10348;<a/>");
    assert_eq!(
        items.unwrap(),
        vec![
            Markup::Text("\u{10348}".to_string()),
            Markup::CharReference(0x10348)
        ]
    );
    assert!(errors.is_empty());
}

#[test]
fn lone_high_surrogate_in_text() {
    let mut units: Vec<u16> = "ab".encode_utf16().collect();
    units.push(0xD800);
    units.extend("cd<x/>".encode_utf16());

    let mut src = StrSource::from_units(units.clone());
    let mut errors = Collector::new();
    assert_matches!(
        Scanner::new().scan_prolog(&mut src, &mut errors, false),
        Err(ScanError { code: ScanErrorCode::InvalidCharInContent, ref args }) if args == &["d800"]
    );

    let mut src = StrSource::from_units(units);
    let mut errors = Collector::new().continue_after_fatal(true);
    let items = Scanner::new()
        .scan_prolog(&mut src, &mut errors, false)
        .unwrap();
    assert_eq!(items, vec![Markup::Text("abcd".to_string())]);
    assert_eq!(errors.codes(), vec!["InvalidCharInContent"]);
    assert_eq!(errors.reports()[0].severity, Severity::Fatal);
}

#[test]
fn continuing_only_steps_over_character_errors() {
    let mut src = StrSource::new("<!-- a\u{1}b --><!-- c -- d -->");
    let mut errors = Collector::new().continue_after_fatal(true);
    assert_matches!(
        Scanner::new().scan_prolog(&mut src, &mut errors, false),
        Err(ScanError {
            code: ScanErrorCode::DashDashInComment,
            ..
        })
    );
    assert_eq!(errors.codes(), vec!["InvalidCharInComment", "DashDashInComment"]);
}

#[test]
fn unterminated_constructs_at_end_of_input() {
    assert_matches!(
        prolog("<!-- open").0,
        Err(ScanError {
            code: ScanErrorCode::CommentUnterminated,
            ..
        })
    );
    assert_matches!(
        prolog("<?target open").0,
        Err(ScanError { code: ScanErrorCode::PIUnterminated, ref args }) if args == &["target"]
    );
}

#[test]
fn entity_reference_needs_semicolon() {
    assert_matches!(
        prolog("&amp <a/>").0,
        Err(ScanError {
            code: ScanErrorCode::SemicolonRequiredInReference,
            ..
        })
    );
    assert_matches!(
        prolog("& <a/>").0,
        Err(ScanError {
            code: ScanErrorCode::NameRequiredInReference,
            ..
        })
    );
}

#[test]
fn scanner_is_reusable_after_error() {
    let mut scanner = Scanner::new();
    let mut errors = Collector::new();
    let mut src = StrSource::new("<?xml version='2.0'?>");
    assert!(scanner.scan_prolog(&mut src, &mut errors, false).is_err());
    let mut src = StrSource::new("<?xml version='1.0'?><a/>");
    let items = scanner.scan_prolog(&mut src, &mut errors, false).unwrap();
    assert_eq!(items.len(), 1);
    assert!(src.skip_string("<a/>"));
}
