use crate::{
    TEMPLATE_FUNCTION_NAME,
    error::VocabularyError,
    supplier::{NodeSupplier, UnboundedSupplier},
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;

///
/// Literal
///
/// Scalar value carried by a terminal. Collaborators normalize raw input
/// (dates, epochs) into one of these before it reaches a builder.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl Literal {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Int(_) | Self::Bool(_) => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(_) | Self::Int(_) => None,
        }
    }

    /// Convert a JSON scalar; arrays, objects, null and non-integral numbers
    /// are rejected.
    pub fn from_json(value: &JsonValue) -> Result<Self, VocabularyError> {
        match value {
            JsonValue::String(s) => Ok(Self::Text(s.clone())),
            JsonValue::Bool(b) => Ok(Self::Bool(*b)),
            JsonValue::Number(n) => n.as_i64().map(Self::Int).ok_or_else(|| {
                VocabularyError::malformed_function(format!("argument {n} is not an integer"))
            }),
            JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => Err(
                VocabularyError::malformed_function(format!("argument {value} is not a scalar")),
            ),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

///
/// TemplateValue
///
/// A value left unbound at build time. The default is used until a later
/// binding step supplies the real value for the node identified by `node_id`.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateValue {
    pub default_value: Literal,
    pub node_id: String,
    pub is_visible: bool,
    pub is_read_only: bool,
}

impl TemplateValue {
    #[must_use]
    pub fn new(
        default_value: Literal,
        node_id: impl Into<String>,
        is_visible: bool,
        is_read_only: bool,
    ) -> Self {
        Self {
            default_value,
            node_id: node_id.into(),
            is_visible,
            is_read_only,
        }
    }
}

impl fmt::Display for TemplateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "template({}, {:?}, visible={}, read_only={})",
            self.default_value, self.node_id, self.is_visible, self.is_read_only
        )
    }
}

///
/// FunctionCall
///
/// Function name plus its ordered literal arguments.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct FunctionCall {
    pub(crate) name: String,
    pub(crate) args: Vec<Literal>,
}

impl FunctionCall {
    /// Validate and assemble a function call. The name must be a non-empty
    /// identifier without whitespace, must not be the reserved
    /// [`TEMPLATE_FUNCTION_NAME`], and at least one argument is required.
    pub fn new(name: &str, args: &[Literal]) -> Result<Self, VocabularyError> {
        if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(VocabularyError::malformed_function(format!(
                "function name {name:?} is not a textual identifier"
            )));
        }
        if name == TEMPLATE_FUNCTION_NAME {
            return Err(VocabularyError::malformed_function(format!(
                "function name '{name}' is reserved for templated values"
            )));
        }

        let fn_name = name.to_string();
        let mut supplier = UnboundedSupplier::new(
            name,
            Box::new(move |args: Vec<Literal>| {
                Ok(Self {
                    name: fn_name.clone(),
                    args,
                })
            }),
        );
        let malformed =
            |_| VocabularyError::malformed_function(format!("function '{name}' has no arguments"));
        for arg in args {
            supplier.set_next(arg.clone()).map_err(malformed)?;
        }

        supplier.get().map_err(malformed)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn args(&self) -> &[Literal] {
        &self.args
    }

    /// Read function metadata from a loosely typed document of the shape
    /// `{"name": "...", "args": [...]}`.
    pub fn from_json(metadata: &JsonValue) -> Result<Self, VocabularyError> {
        let JsonValue::Object(map) = metadata else {
            return Err(VocabularyError::malformed_function(
                "function metadata must be an object",
            ));
        };

        let Some(JsonValue::String(name)) = map.get("name") else {
            return Err(VocabularyError::malformed_function(
                "function name must be a string",
            ));
        };

        let Some(JsonValue::Array(raw_args)) = map.get("args") else {
            return Err(VocabularyError::malformed_function(
                "function args must be a list",
            ));
        };

        let args = raw_args
            .iter()
            .map(Literal::from_json)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(name, &args)
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

///
/// Subject
///
/// Left-hand side of a terminal: a field reference, or a literal standing in
/// for the property (function-style predicates such as `true = f(...)`).
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Subject {
    Property(String),
    LiteralProperty(Literal),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(name) => f.write_str(name),
            Self::LiteralProperty(literal) => write!(f, "{literal}"),
        }
    }
}

///
/// TerminalValue
///
/// Right-hand side of a plain terminal. Exactly one kind is ever present.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum TerminalValue {
    #[serde(rename = "value")]
    Plain(Literal),

    #[serde(rename = "templateProperties")]
    Templated(TemplateValue),
}

impl fmt::Display for TerminalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(literal) => write!(f, "{literal}"),
            Self::Templated(template) => write!(f, "{template}"),
        }
    }
}
