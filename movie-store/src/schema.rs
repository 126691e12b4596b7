//! Structural validation of loosely-typed input, e.g. the query string of an API Gateway event.
//!
//! A [Shape] declares which fields are allowed, which of them are required and what JSON type
//! each one must have. It can also render itself as a JSON schema so that a client
//! sending the wrong params can be told what was expected.

use crate::types::CastQueryParams;
use serde_json::{json, Map, Value};
use std::fmt;

/// JSON types a field can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
}

impl FieldType {
    fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
}

/// A closed object shape: fields not listed here are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub name: &'static str,
    pub fields: &'static [Field],
}

/// Why the input does not match the shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Missing(&'static str),
    WrongType { field: &'static str, expected: FieldType },
    UnknownField(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "must have required property '{field}'"),
            Self::WrongType { field, expected } => write!(f, "'{field}' must be {}", expected.as_str()),
            Self::UnknownField(field) => write!(f, "must NOT have additional property '{field}'"),
        }
    }
}

impl Shape {
    /// Checks the input against the shape and returns the first violation.
    /// Missing required fields are reported first, then type mismatches, then unknown fields.
    pub fn validate(&self, input: &Map<String, Value>) -> Result<(), Violation> {
        for field in self.fields {
            match input.get(field.name) {
                None if field.required => return Err(Violation::Missing(field.name)),
                Some(value) if !field.field_type.accepts(value) => {
                    return Err(Violation::WrongType {
                        field: field.name,
                        expected: field.field_type,
                    })
                }
                _ => {}
            }
        }

        match input.keys().find(|k| !self.fields.iter().any(|f| f.name == k.as_str())) {
            Some(unknown) => Err(Violation::UnknownField(unknown.clone())),
            None => Ok(()),
        }
    }

    /// Renders the shape as a JSON schema (draft-07 subset) for error responses.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), json!({ "type": f.field_type.as_str() })))
            .collect();
        let required: Vec<&str> = self.fields.iter().filter(|f| f.required).map(|f| f.name).collect();

        json!({
            "title": self.name,
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

/// The only query string params accepted by the cast lookup
pub const CAST_QUERY_SHAPE: Shape = Shape {
    name: "MovieCastMemberQueryParams",
    fields: &[
        Field {
            name: "movieId",
            field_type: FieldType::String,
            required: true,
        },
        Field {
            name: "roleName",
            field_type: FieldType::String,
            required: false,
        },
        Field {
            name: "actorName",
            field_type: FieldType::String,
            required: false,
        },
    ],
};

impl CastQueryParams {
    /// Validates the raw query string params against [CAST_QUERY_SHAPE] and extracts them.
    pub fn from_query(query: &Map<String, Value>) -> Result<Self, Violation> {
        CAST_QUERY_SHAPE.validate(query)?;

        let get = |name: &str| query.get(name).and_then(Value::as_str).map(str::to_owned);

        Ok(Self {
            movie_id: get("movieId").unwrap_or_default(),
            role_name: get("roleName"),
            actor_name: get("actorName"),
        })
    }
}
