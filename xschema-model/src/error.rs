use xschema_syntax::tree::SchemaNode;
use xschema_syntax::{ErrorReporter, SCHEMA_DOMAIN, Severity};

/// Codes reported while building simple types from a schema document.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum SchemaErrorCode {
    EltMustMatch,
    EmptySimpleType,
    ContentError,
    FeatureUnsupported,
    ListUnionRestrictionError,
    UnknownBaseDatatype,
    BaseTypeNotFound,
    NotationNotFound,
    FinalViolation,
    CosListOfAtomic,
    DatatypeError,
    DatatypeFacetError,
    AttMustAppear,
    AttNotAllowed,
    AttInvalidValue,
    UnboundPrefix,
    DuplicateGlobal,
    NotASchema,
}

impl SchemaErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaErrorCode::EltMustMatch => "s4s-elt-must-match",
            SchemaErrorCode::EmptySimpleType => "EmptySimpleType",
            SchemaErrorCode::ContentError => "SimpleTypeContentError",
            SchemaErrorCode::FeatureUnsupported => "FeatureUnsupported",
            SchemaErrorCode::ListUnionRestrictionError => "ListUnionRestrictionError",
            SchemaErrorCode::UnknownBaseDatatype => "UnknownBaseDatatype",
            SchemaErrorCode::BaseTypeNotFound | SchemaErrorCode::NotationNotFound => "src-resolve",
            SchemaErrorCode::FinalViolation => "st-props-correct.3",
            SchemaErrorCode::CosListOfAtomic => "cos-list-of-atomic",
            SchemaErrorCode::DatatypeError => "DatatypeError",
            SchemaErrorCode::DatatypeFacetError => "DatatypeFacetError",
            SchemaErrorCode::AttMustAppear => "s4s-att-must-appear",
            SchemaErrorCode::AttNotAllowed => "s4s-att-not-allowed",
            SchemaErrorCode::AttInvalidValue => "s4s-att-invalid-value",
            SchemaErrorCode::UnboundPrefix => "src-resolve.4",
            SchemaErrorCode::DuplicateGlobal => "sch-props-correct.2",
            SchemaErrorCode::NotASchema => "s4s-elt-schema-ns",
        }
    }

    /// Structural errors abandon the type being traversed; the others are
    /// reported and traversal carries on.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            SchemaErrorCode::EltMustMatch
                | SchemaErrorCode::EmptySimpleType
                | SchemaErrorCode::FeatureUnsupported
                | SchemaErrorCode::ListUnionRestrictionError
                | SchemaErrorCode::UnknownBaseDatatype
                | SchemaErrorCode::CosListOfAtomic
                | SchemaErrorCode::DatatypeFacetError
        )
    }
}

/// Reports a schema error against `node`.
pub fn report<'a, N: SchemaNode<'a>>(
    reporter: &mut dyn ErrorReporter,
    node: N,
    code: SchemaErrorCode,
    args: &[String],
) {
    reporter.report_at(
        node.position(),
        SCHEMA_DOMAIN,
        code.as_str(),
        args,
        Severity::Error,
    );
}
