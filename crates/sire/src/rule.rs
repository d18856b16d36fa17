//! Per-field rule declarations.

use crate::error::{Result, SchemaError};
use crate::schema::Schema;
use crate::validators::ValidatorSpec;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Primitive type tags a field can be coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Trimmed, HTML-escaped string
    Text,
    /// Raw string
    Plain,
    /// Tag-filtered markup
    Html,
    /// Integer
    Int,
    /// Floating point number
    Float,
    /// Boolean
    Bool,
    /// Sequential array
    List,
}

impl PrimitiveType {
    /// The tag as written in rule declarations.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Text => "text",
            PrimitiveType::Plain => "plain",
            PrimitiveType::Html => "html",
            PrimitiveType::Int => "int",
            PrimitiveType::Float => "float",
            PrimitiveType::Bool => "bool",
            PrimitiveType::List => "list",
        }
    }
}

impl FromStr for PrimitiveType {
    type Err = SchemaError;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "text" => Ok(PrimitiveType::Text),
            "plain" => Ok(PrimitiveType::Plain),
            "html" => Ok(PrimitiveType::Html),
            "int" => Ok(PrimitiveType::Int),
            "float" => Ok(PrimitiveType::Float),
            "bool" => Ok(PrimitiveType::Bool),
            "list" => Ok(PrimitiveType::List),
            other => Err(SchemaError::UnknownType(other.to_string())),
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declared type of a field.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// A primitive tag with its colon separated arguments (`html:b,i`)
    Primitive(PrimitiveType, Vec<String>),
    /// A nested schema validated recursively
    Nested(Arc<Schema>),
}

impl FieldType {
    /// Parse a `tag[:arg...]` declaration.
    pub fn parse(declaration: &str) -> Result<Self> {
        let mut parts = declaration.split(':');
        let tag = parts.next().unwrap_or_default();
        let primitive = tag.parse::<PrimitiveType>()?;
        Ok(FieldType::Primitive(
            primitive,
            parts.map(str::to_string).collect(),
        ))
    }

    /// `"schema"` for nested schemas, the primitive tag otherwise.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Primitive(primitive, _) => primitive.as_str(),
            FieldType::Nested(_) => "schema",
        }
    }

    /// Whether missing values default to `false` instead of `null`.
    pub fn is_bool(&self) -> bool {
        matches!(self, FieldType::Primitive(PrimitiveType::Bool, _))
    }
}

/// Conversion into a [`FieldType`] for [`Schema::add`].
pub trait IntoFieldType {
    /// Convert, failing on unknown type tags.
    fn into_field_type(self) -> Result<FieldType>;
}

impl IntoFieldType for FieldType {
    fn into_field_type(self) -> Result<FieldType> {
        Ok(self)
    }
}

impl IntoFieldType for PrimitiveType {
    fn into_field_type(self) -> Result<FieldType> {
        Ok(FieldType::Primitive(self, Vec::new()))
    }
}

impl IntoFieldType for &str {
    fn into_field_type(self) -> Result<FieldType> {
        FieldType::parse(self)
    }
}

impl IntoFieldType for String {
    fn into_field_type(self) -> Result<FieldType> {
        FieldType::parse(&self)
    }
}

impl IntoFieldType for Schema {
    fn into_field_type(self) -> Result<FieldType> {
        Ok(FieldType::Nested(Arc::new(self)))
    }
}

impl IntoFieldType for Arc<Schema> {
    fn into_field_type(self) -> Result<FieldType> {
        Ok(FieldType::Nested(self))
    }
}

/// Declaration of one field: its type and validator chain.
#[derive(Debug, Clone)]
pub struct Rule {
    field: String,
    label: Option<String>,
    field_type: FieldType,
    validators: Vec<ValidatorSpec>,
}

impl Rule {
    /// Create a rule, rejecting empty field names and validator specs.
    pub fn new<S: AsRef<str>>(
        field: impl Into<String>,
        field_type: FieldType,
        validators: &[S],
    ) -> Result<Self> {
        let field = field.into();
        if field.is_empty() {
            return Err(SchemaError::EmptyField);
        }

        let validators = validators
            .iter()
            .map(|spec| {
                ValidatorSpec::parse(spec.as_ref())
                    .ok_or_else(|| SchemaError::EmptyValidator(field.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            field,
            label: None,
            field_type,
            validators,
        })
    }

    /// Builder-style label assignment.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The display name: the label, or the field name when unlabelled.
    pub fn name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.field)
    }

    /// The label, if one was set.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The declared type.
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// `"schema"` for nested schemas, the primitive tag otherwise.
    pub fn type_name(&self) -> &'static str {
        self.field_type.name()
    }

    /// The validator chain in declaration order.
    pub fn validators(&self) -> &[ValidatorSpec] {
        &self.validators
    }
}

/// Handle returned by [`Schema::add`] to attach a label.
///
/// `label` consumes the handle, so a rule is labelled at most once per
/// declaration.
#[derive(Debug)]
pub struct RuleHandle<'a> {
    rule: &'a mut Rule,
}

impl<'a> RuleHandle<'a> {
    pub(crate) fn new(rule: &'a mut Rule) -> Self {
        Self { rule }
    }

    /// Set the display label of the rule.
    pub fn label(self, label: impl Into<String>) -> &'a Rule {
        self.rule.label = Some(label.into());
        self.rule
    }

    /// The rule as declared so far.
    pub fn rule(&self) -> &Rule {
        self.rule
    }
}
