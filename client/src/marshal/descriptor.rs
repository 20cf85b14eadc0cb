//! Static per-type field tables.
//!
//! A [`TypeDescriptor`] lists the fields of one DTO type and how each of
//! them is marshalled. Array fields carry a second entry named
//! `<field>[]` describing their elements:
//!
//! ```text
//!   transactions     Array
//!   transactions[]   Object(&TRANSACTION)
//! ```
//!
//! Descriptors are plain `static` data. They are never built or mutated at
//! runtime.

use crate::config::ARRAY_ELEMENT_SUFFIX;

/// How a single field is marshalled.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Raw JSON value, assigned as-is.
    Scalar,
    /// ISO-8601 date-time with explicit offset.
    Date,
    /// Nested object described by another descriptor.
    Object(&'static TypeDescriptor),
    /// Sequence; element kind comes from the `<field>[]` entry.
    Array,
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Scalar => "scalar",
            FieldKind::Date => "date",
            FieldKind::Object(_) => "object",
            FieldKind::Array => "array",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub const fn scalar(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar,
        }
    }

    pub const fn date(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Date,
        }
    }

    pub const fn object(name: &'static str, descriptor: &'static TypeDescriptor) -> Self {
        Self {
            name,
            kind: FieldKind::Object(descriptor),
        }
    }

    pub const fn array(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Array,
        }
    }

    /// Whether this entry describes array elements rather than a field.
    pub fn is_element_hint(&self) -> bool {
        self.name.ends_with(ARRAY_ELEMENT_SUFFIX)
    }
}

/// Field table of one DTO type.
#[derive(Debug)]
pub struct TypeDescriptor {
    pub name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl TypeDescriptor {
    pub const fn new(name: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        Self { name, fields }
    }

    /// Fields that appear in JSON, without the `[]` element entries.
    pub fn declared_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|field| !field.is_element_hint())
    }

    /// Kind registered under `name`, compared case-insensitively.
    pub fn hint(&self, name: &str) -> Option<FieldKind> {
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
            .map(|field| field.kind)
    }

    /// Element kind of the array field `name`, from its `name[]` entry.
    pub fn element_hint(&self, name: &str) -> Option<FieldKind> {
        self.hint(&format!("{}{}", name, ARRAY_ELEMENT_SUFFIX))
    }
}
