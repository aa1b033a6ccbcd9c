use xschema_model::datatype::facets::{FacetKind, Facets};
use xschema_model::{
    Datatype, Grammar, QName, SchemaDocument, TypeIndex, TypeRegistry, Variety, traverse_schema,
};
use xschema_syntax::diagnostic::diagnostics;
use xschema_syntax::{Collector, Markup, Report, Scanner, StrSource};

use std::path::{Path, PathBuf};
use std::process::exit;
use std::rc::Rc;

use structopt::StructOpt;
use tracing::debug;

type Outcomes = Vec<(QName, Option<TypeIndex>)>;

#[derive(Debug, StructOpt)]
enum Cli {
    /// Scans the declaration, PIs, comments and references before the first
    /// element
    Prolog {
        #[structopt(long)]
        text_decl: bool,
        #[structopt(long)]
        continue_after_fatal: bool,
        file: PathBuf,
    },
    /// Builds every global simple type of a schema and prints it
    Types { schema: PathBuf },
    /// Validates values against a global or built-in simple type
    Check {
        schema: PathBuf,
        #[structopt(long = "type")]
        type_name: String,
        values: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();
    match Cli::from_args() {
        Cli::Prolog {
            text_decl,
            continue_after_fatal,
            file,
        } => prolog(file, text_decl, continue_after_fatal),
        Cli::Types { schema } => types(schema),
        Cli::Check {
            schema,
            type_name,
            values,
        } => check(schema, type_name, values),
    }
}

fn read(path: &Path, status: i32) -> String {
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("{}: {err}", path.display());
            exit(status);
        }
    }
}

fn emit(path: &Path, source: String, reports: &[Report]) {
    let (map, d) = diagnostics(path.to_string_lossy().to_string(), source, reports);
    let mut emitter =
        codemap_diagnostic::Emitter::stderr(codemap_diagnostic::ColorConfig::Auto, Some(&map));
    emitter.emit(&d[..]);
}

fn prolog(file: PathBuf, text_decl: bool, continue_after_fatal: bool) {
    let text = read(&file, 1);
    let mut source = StrSource::new(&text);
    let mut collector = Collector::new().continue_after_fatal(continue_after_fatal);
    let mut scanner = Scanner::new();
    match scanner.scan_prolog(&mut source, &mut collector, text_decl) {
        Ok(items) => {
            for item in &items {
                print_markup(item);
            }
            if !collector.is_empty() {
                emit(&file, text, collector.reports());
            }
        }
        Err(err) => {
            debug!(%err, "prolog scan failed");
            let mut reports = collector.take();
            if let Some(last) = reports.last_mut() {
                last.offset.get_or_insert(source.byte_offset());
            }
            emit(&file, text, &reports);
            exit(1);
        }
    }
}

fn print_markup(item: &Markup) {
    match item {
        Markup::Declaration(decl) => println!(
            "declaration version={:?} encoding={:?} standalone={:?}",
            decl.version, decl.encoding, decl.standalone
        ),
        Markup::ProcessingInstruction { target, data } => println!("pi {target} {data:?}"),
        Markup::Comment(text) => println!("comment {text:?}"),
        Markup::CharReference(c) => println!("char-ref U+{c:04X}"),
        Markup::EntityReference(name) => println!("entity-ref {name}"),
        Markup::Text(text) => println!("text {text:?}"),
    }
}

fn load(path: &Path, status: i32) -> (String, Grammar, Collector, Outcomes) {
    let text = read(path, status);
    let mut grammar = Grammar::new();
    let mut collector = Collector::new();
    let results = {
        let xml = match roxmltree::Document::parse(&text) {
            Ok(xml) => xml,
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                exit(status);
            }
        };
        match SchemaDocument::new(xml.root_element(), &mut grammar, &mut collector) {
            Some(doc) => traverse_schema(&doc, &mut grammar, &mut collector),
            None => Vec::new(),
        }
    };
    (text, grammar, collector, results)
}

fn types(schema: PathBuf) {
    let (text, grammar, collector, results) = load(&schema, 2);
    for (name, index) in &results {
        match index {
            Some(index) => print_type(grammar.get(*index)),
            None => println!("{}: not built", name.local),
        }
    }
    if !collector.is_empty() {
        emit(&schema, text, collector.reports());
    }
    if collector.has_errors() {
        exit(2);
    }
}

fn print_type(datatype: &Datatype) {
    let variety = match datatype.variety() {
        Variety::Atomic(p) => format!("atomic {}", p.name()),
        Variety::List(item) => format!("list of {item}"),
        Variety::Union(members) => {
            let names: Vec<String> = members.iter().map(|m| m.to_string()).collect();
            format!("union of {}", names.join(" "))
        }
    };
    println!("{}: {variety}", datatype.name().local);
    if let Some(base) = datatype.base() {
        println!("  base {base}");
    }
    let facets = datatype.facets();
    for kind in facets.defined().iter() {
        let fixed = if facets.fixed.contains(kind) { " (fixed)" } else { "" };
        println!("  {kind} {}{fixed}", facet_value(facets, kind));
    }
    if !datatype.final_set().is_empty() {
        println!("  final {}", datatype.final_set());
    }
}

fn facet_value(facets: &Facets, kind: FacetKind) -> String {
    let number = |n: Option<usize>| n.map(|n| n.to_string()).unwrap_or_default();
    let digits = |n: Option<u32>| n.map(|n| n.to_string()).unwrap_or_default();
    match kind {
        FacetKind::Length => number(facets.length),
        FacetKind::MinLength => number(facets.min_length),
        FacetKind::MaxLength => number(facets.max_length),
        FacetKind::Pattern => {
            let patterns: Vec<&str> = facets.patterns.iter().map(|p| p.as_str()).collect();
            patterns.join(" & ")
        }
        FacetKind::Enumeration => facets.enumeration.as_deref().unwrap_or(&[]).join(" "),
        FacetKind::WhiteSpace => facets.white_space.map(|w| w.name()).unwrap_or("").to_string(),
        FacetKind::MaxInclusive | FacetKind::MaxExclusive => {
            facets.max.as_ref().map(|b| b.value().to_string()).unwrap_or_default()
        }
        FacetKind::MinInclusive | FacetKind::MinExclusive => {
            facets.min.as_ref().map(|b| b.value().to_string()).unwrap_or_default()
        }
        FacetKind::TotalDigits => digits(facets.total_digits),
        FacetKind::FractionDigits => digits(facets.fraction_digits),
    }
}

/// Finds `name` among the schema's globals, then among the built-ins. An
/// `xs:` or `xsd:` prefix selects the built-ins directly.
fn find_type(grammar: &Grammar, results: &Outcomes, name: &str) -> Option<Rc<Datatype>> {
    if let Some(local) = name.strip_prefix("xs:").or_else(|| name.strip_prefix("xsd:")) {
        return grammar.lookup(&QName::xsd(local)).cloned();
    }
    results
        .iter()
        .find(|(qname, _)| qname.local == name)
        .and_then(|(_, index)| index.map(|i| grammar.get(i).clone()))
        .or_else(|| grammar.lookup(&QName::xsd(name)).cloned())
}

fn check(schema: PathBuf, type_name: String, values: Vec<String>) {
    let (text, grammar, collector, results) = load(&schema, 3);
    if collector.has_errors() {
        emit(&schema, text, collector.reports());
    }
    let Some(datatype) = find_type(&grammar, &results, &type_name) else {
        eprintln!("no simple type named '{type_name}'");
        exit(3);
    };
    for value in values {
        match datatype.validate(&value) {
            Ok(()) => println!("{value:?}: valid"),
            Err(err) => {
                println!("{value:?}: {err}");
                exit(3);
            }
        }
    }
}
