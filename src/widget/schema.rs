//! Structural input schemas and argument validation.
//!
//! Every widget declares an [`InputSchema`]: an ordered list of fields, each
//! with a canonical name, an optional wire alias, a kind and a required flag.
//! [`InputSchema::validate`] turns the untyped JSON argument bag sent by the
//! client into [`Arguments`] keyed by canonical name, or a [`ValidationError`]
//! describing every failing field.
//!
//! Validation is lax in the same way most JSON APIs are: numeric strings are
//! accepted for numbers, `"yes"`/`"no"` for booleans, and unknown fields are
//! ignored so that newer clients keep working against older servers.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::error::ToolError;

/// Largest integer magnitude a JSON float can carry without losing precision.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Semantic type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// UTF-8 text.
    String,
    /// Whole number (`i64`).
    Integer,
    /// Any JSON number.
    Number,
    /// `true` / `false`.
    Boolean,
}

impl FieldKind {
    /// JSON Schema `type` keyword for this kind.
    #[must_use]
    pub const fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Coerces a raw JSON value to this kind.
    ///
    /// Returns `None` if the value cannot represent this kind.
    #[must_use]
    pub fn coerce(self, value: &Value) -> Option<Value> {
        match self {
            Self::String => value.as_str().map(|s| Value::String(s.to_owned())),
            Self::Integer => match value {
                Value::Number(n) => n.as_i64().map(Value::from).or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER)
                        .map(|f| {
                            #[allow(clippy::cast_possible_truncation)] // bounded above
                            let whole = f as i64;
                            Value::from(whole)
                        })
                }),
                Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
                _ => None,
            },
            Self::Number => match value {
                Value::Number(_) => Some(value.clone()),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number),
                _ => None,
            },
            Self::Boolean => match value {
                Value::Bool(b) => Some(Value::Bool(*b)),
                Value::Number(n) => match n.as_i64() {
                    Some(0) => Some(Value::Bool(false)),
                    Some(1) => Some(Value::Bool(true)),
                    _ => None,
                },
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => Some(Value::Bool(true)),
                    "false" | "no" | "off" | "0" => Some(Value::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
        }
    }
}

/// A single field of an [`InputSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    name: String,
    alias: Option<String>,
    kind: FieldKind,
    required: bool,
    description: Option<String>,
}

impl FieldSpec {
    /// Declares a required field.
    #[must_use]
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            alias: None,
            kind,
            required: true,
            description: None,
        }
    }

    /// Declares an optional field.
    #[must_use]
    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind)
        }
    }

    /// Sets the wire-level alias the field may arrive under.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the human-readable description shown in the JSON Schema.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Canonical field name, used as the key in [`Arguments`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name clients are expected to send: the alias when one is declared.
    #[must_use]
    pub fn wire_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// The field's semantic type.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Whether the field must be present.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Looks the field up in a raw argument object, alias first.
    fn lookup<'a>(&self, object: &'a Map<String, Value>) -> Option<&'a Value> {
        self.alias
            .as_deref()
            .and_then(|alias| object.get(alias))
            .or_else(|| object.get(&self.name))
    }
}

/// The structural description of a widget's accepted arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSchema {
    fields: Vec<FieldSpec>,
}

impl InputSchema {
    /// A schema accepting no arguments (extra fields are still ignored).
    #[must_use]
    pub const fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    /// Adds a field to the schema.
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Renders the schema as a JSON Schema object for `tools/list`.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            let mut property = Map::new();
            property.insert("type".to_string(), json!(field.kind.json_type()));
            if let Some(ref description) = field.description {
                property.insert("description".to_string(), json!(description));
            }
            properties.insert(field.wire_name().to_string(), Value::Object(property));

            if field.required {
                required.push(json!(field.wire_name()));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(schema)
    }

    /// Validates a raw argument bag.
    ///
    /// `null` is treated as an empty object. Every field is checked, so the
    /// error lists all failures rather than just the first one.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the bag is not an object, a required
    /// field is missing or `null`, or a value cannot be coerced to its kind.
    pub fn validate(&self, raw: &Value) -> Result<Arguments, ValidationError> {
        let empty = Map::new();
        let object = match raw {
            Value::Null => &empty,
            Value::Object(map) => map,
            other => {
                return Err(ValidationError {
                    errors: vec![FieldError {
                        field: "$".to_string(),
                        expected: "object".to_string(),
                        message: "arguments must be a JSON object".to_string(),
                        received: Some(other.clone()),
                    }],
                });
            }
        };

        let mut values = Map::new();
        let mut errors = Vec::new();

        for field in &self.fields {
            match field.lookup(object) {
                supplied @ (None | Some(Value::Null)) => {
                    if field.required {
                        errors.push(FieldError::missing(field, supplied.cloned()));
                    }
                }
                Some(value) => match field.kind.coerce(value) {
                    Some(coerced) => {
                        values.insert(field.name.clone(), coerced);
                    }
                    None => errors.push(FieldError::invalid(field, value.clone())),
                },
            }
        }

        if errors.is_empty() {
            Ok(Arguments(values))
        } else {
            Err(ValidationError { errors })
        }
    }
}

/// Validated arguments, keyed by canonical field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    /// Returns a validated value by canonical name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns a validated string value by canonical name.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Returns `true` if no arguments were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deserialises the arguments into a typed input record.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] if the record's shape does not
    /// match the schema it was validated against.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, ToolError> {
        serde_json::from_value(Value::Object(self.0))
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))
    }
}

/// One failing field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Wire name of the field (`$` for the whole argument bag).
    pub field: String,
    /// The constraint that was not met.
    pub expected: String,
    /// What went wrong.
    pub message: String,
    /// The offending value, if one was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<Value>,
}

impl FieldError {
    fn missing(field: &FieldSpec, received: Option<Value>) -> Self {
        Self {
            field: field.wire_name().to_string(),
            expected: field.kind.json_type().to_string(),
            message: "field required".to_string(),
            received,
        }
    }

    fn invalid(field: &FieldSpec, received: Value) -> Self {
        Self {
            field: field.wire_name().to_string(),
            expected: field.kind.json_type().to_string(),
            message: format!("input should be a valid {}", field.kind.json_type()),
            received: Some(received),
        }
    }
}

/// Argument validation failed for one or more fields.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{} invalid field(s): {}", .errors.len(), summarise(.errors))]
pub struct ValidationError {
    /// Every failing field, in schema order.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Returns `true` if the named wire field is among the failures.
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Serialises the field errors as a JSON array.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.errors).unwrap_or_default()
    }
}

fn summarise(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} ({})", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}
