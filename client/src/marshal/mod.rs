//! # Typed Graph Marshalling
//!
//! JSON ⇄ DTO conversion driven by static per-type [`TypeDescriptor`]s.
//!
//! Decoding walks the untyped JSON tree with the target type's descriptor:
//!
//! 1. every declared field is looked up case-insensitively;
//! 2. a missing (or `null`) field is skipped and the DTO keeps its default;
//! 3. `Scalar` values are taken as-is, `Date` values go through the strict
//!    ISO-8601 parser, `Object` values recurse with the nested descriptor,
//!    `Array` values are converted element-wise with the `<field>[]` hint;
//! 4. the normalized tree is handed to serde, which assigns it to the
//!    concrete struct. A present value of the wrong type is an error, never
//!    silently dropped.
//!
//! Encoding goes the other way: serde lowers the DTO, then the descriptor
//! makes sure every declared field is emitted (as `null` when empty) and
//! nothing else is.
//!
//! The marshaller never looks at a concrete type by name; new DTOs only
//! need a descriptor and a [`Marshal`] impl.

pub mod date;
pub mod descriptor;

pub use date::{DateParseError, IsoDateTime};
pub use descriptor::{FieldDescriptor, FieldKind, TypeDescriptor};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while converting between JSON and DTOs.
#[derive(Debug, Error)]
pub enum MarshalError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("expected a JSON object for {type_name}")]
    NotAnObject { type_name: &'static str },

    #[error("field `{field}`: invalid ISO-8601 date `{value}`")]
    DateParseError { field: String, value: String },

    #[error("field `{field}`: expected a JSON {expected}")]
    UnexpectedValue {
        field: String,
        expected: &'static str,
    },

    #[error("type mismatch in {type_name}: {source}")]
    TypeMismatch {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// A DTO the marshaller can convert.
///
/// Implementors derive serde with `#[serde(default, rename_all = "camelCase")]`
/// so that field names line up with the descriptor and missing fields fall
/// back to `Default`.
pub trait Marshal: Serialize + DeserializeOwned {
    fn descriptor() -> &'static TypeDescriptor;

    fn from_json(text: &str) -> Result<Self, MarshalError> {
        from_json(text)
    }

    fn to_json(&self) -> Result<String, MarshalError> {
        to_json(self)
    }
}

/// Parse `text` into `T`.
pub fn from_json<T: Marshal>(text: &str) -> Result<T, MarshalError> {
    let tree: Value = serde_json::from_str(text).map_err(MarshalError::InvalidJson)?;
    from_value(&tree)
}

/// Parse UTF-8 bytes into `T`.
pub fn from_slice<T: Marshal>(bytes: &[u8]) -> Result<T, MarshalError> {
    let tree: Value = serde_json::from_slice(bytes).map_err(MarshalError::InvalidJson)?;
    from_value(&tree)
}

/// Convert an already parsed tree into `T`.
pub fn from_value<T: Marshal>(tree: &Value) -> Result<T, MarshalError> {
    let descriptor = T::descriptor();
    let normalized = match tree {
        Value::Null => Value::Object(Map::new()),
        Value::Object(object) => Value::Object(normalize_object(object, descriptor, "")?),
        _ => {
            return Err(MarshalError::NotAnObject {
                type_name: descriptor.name,
            })
        }
    };

    serde_json::from_value(normalized).map_err(|source| MarshalError::TypeMismatch {
        type_name: descriptor.name,
        source,
    })
}

/// Render `value` as compact JSON text.
pub fn to_json<T: Marshal>(value: &T) -> Result<String, MarshalError> {
    let tree = to_value(value)?;
    serde_json::to_string(&tree).map_err(MarshalError::Serialization)
}

/// Render `value` as a JSON tree containing exactly the declared fields.
pub fn to_value<T: Marshal>(value: &T) -> Result<Value, MarshalError> {
    let raw = serde_json::to_value(value).map_err(MarshalError::Serialization)?;
    let descriptor = T::descriptor();
    match raw {
        Value::Object(object) => Ok(Value::Object(lower_object(&object, descriptor))),
        _ => Err(MarshalError::NotAnObject {
            type_name: descriptor.name,
        }),
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Case-insensitive field lookup; an exact match wins. `null` counts as absent.
fn lookup<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object
        .get(name)
        .or_else(|| {
            object
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
        .filter(|value| !value.is_null())
}

fn join_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", parent, field)
    }
}

fn normalize_object(
    object: &Map<String, Value>,
    descriptor: &'static TypeDescriptor,
    path: &str,
) -> Result<Map<String, Value>, MarshalError> {
    let mut out = Map::new();

    for field in descriptor.declared_fields() {
        let Some(value) = lookup(object, field.name) else {
            continue;
        };
        let field_path = join_path(path, field.name);

        let converted = match field.kind {
            FieldKind::Array => {
                let element = descriptor.element_hint(field.name).unwrap_or(FieldKind::Scalar);
                normalize_array(value, element, &field_path)?
            }
            kind => normalize_value(value, kind, &field_path)?,
        };
        out.insert(field.name.to_string(), converted);
    }

    Ok(out)
}

fn normalize_value(value: &Value, kind: FieldKind, path: &str) -> Result<Value, MarshalError> {
    match kind {
        FieldKind::Scalar => Ok(value.clone()),
        FieldKind::Date => match value.as_str().map(IsoDateTime::parse) {
            Some(Ok(date)) => Ok(Value::String(date.encode())),
            Some(Err(_)) | None => Err(MarshalError::DateParseError {
                field: path.to_string(),
                value: match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                },
            }),
        },
        FieldKind::Object(nested) => match value {
            Value::Object(object) => Ok(Value::Object(normalize_object(object, nested, path)?)),
            // A null element of an object array decodes as a default instance.
            Value::Null => Ok(Value::Object(Map::new())),
            _ => Err(MarshalError::UnexpectedValue {
                field: path.to_string(),
                expected: kind.label(),
            }),
        },
        // Array elements that are arrays themselves carry no element hint.
        FieldKind::Array => normalize_array(value, FieldKind::Scalar, path),
    }
}

fn normalize_array(value: &Value, element: FieldKind, path: &str) -> Result<Value, MarshalError> {
    let Value::Array(items) = value else {
        return Err(MarshalError::UnexpectedValue {
            field: path.to_string(),
            expected: FieldKind::Array.label(),
        });
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| normalize_value(item, element, &format!("{}[{}]", path, index)))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn lower_object(
    object: &Map<String, Value>,
    descriptor: &'static TypeDescriptor,
) -> Map<String, Value> {
    let mut out = Map::new();

    for field in descriptor.declared_fields() {
        let value = object.get(field.name).cloned().unwrap_or(Value::Null);
        let lowered = match field.kind {
            FieldKind::Array => {
                let element = descriptor.element_hint(field.name).unwrap_or(FieldKind::Scalar);
                lower_array(value, element)
            }
            kind => lower_value(value, kind),
        };
        out.insert(field.name.to_string(), lowered);
    }

    out
}

fn lower_value(value: Value, kind: FieldKind) -> Value {
    match (kind, value) {
        (FieldKind::Object(nested), Value::Object(object)) => {
            Value::Object(lower_object(&object, nested))
        }
        (FieldKind::Array, value) => lower_array(value, FieldKind::Scalar),
        // Scalars and dates are already in wire form after serde.
        (_, value) => value,
    }
}

fn lower_array(value: Value, element: FieldKind) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| lower_value(item, element))
                .collect(),
        ),
        Value::Null => Value::Array(Vec::new()),
        other => other,
    }
}
