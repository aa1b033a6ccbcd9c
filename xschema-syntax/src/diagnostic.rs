use crate::error::{Report, Severity};
use codemap::CodeMap;
use codemap_diagnostic::{Diagnostic, Level, SpanLabel, SpanStyle};

/// Turns collected reports into diagnostics over the given source text,
/// labelling the reported offset where there is one.
pub fn diagnostics(name: String, source: String, reports: &[Report]) -> (CodeMap, Vec<Diagnostic>) {
    let mut map = CodeMap::new();
    let len = source.len() as u64;
    let file = map.add_file(name, source);
    let diagnostics = reports
        .iter()
        .map(|report| {
            let spans = match report.offset {
                Some(offset) => {
                    let begin = (offset as u64).min(len);
                    let end = (begin + 1).min(len);
                    vec![SpanLabel {
                        span: file.span.subspan(begin, end),
                        label: None,
                        style: SpanStyle::Primary,
                    }]
                }
                None => vec![],
            };
            Diagnostic {
                level: match report.severity {
                    Severity::Warning => Level::Warning,
                    Severity::Error | Severity::Fatal => Level::Error,
                },
                message: report.to_string(),
                code: Some(report.code.clone()),
                spans,
            }
        })
        .collect();
    (map, diagnostics)
}
