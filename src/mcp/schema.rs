//! Parameter type descriptions
//!
//! Every tool parameter is declared with a Rust type. [`Describe`] turns that
//! type into a [`TypeShape`], which is used both to render the parameter in
//! `tools/list` and to decode the incoming argument in `tools/call`.

use crate::error::{AppError, Result};
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Wire-level JSON type of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum WireType {
    String,
    /// A string holding a UUID.
    Guid,
    Integer,
    Number,
    Boolean,
    Array(Box<TypeShape>),
    /// A record with named fields.
    Object(Vec<FieldSpec>),
    /// Free-form string → string map.
    Map,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeShape {
    pub wire: WireType,
    pub nullable: bool,
}

impl TypeShape {
    pub const fn new(wire: WireType) -> Self {
        Self {
            wire,
            nullable: false,
        }
    }

    /// Value used when a non-nullable argument is absent and has no default.
    /// Reference types (strings, arrays, records) stay absent.
    pub fn zero_value(&self) -> Value {
        if self.nullable {
            return Value::Null;
        }
        match self.wire {
            WireType::Integer | WireType::Number => json!(0),
            WireType::Boolean => json!(false),
            WireType::Guid => json!(Uuid::nil().to_string()),
            _ => Value::Null,
        }
    }

    pub fn to_schema(&self) -> Value {
        match &self.wire {
            WireType::String | WireType::Guid => json!({ "type": "string" }),
            WireType::Integer => json!({ "type": "integer" }),
            WireType::Number => json!({ "type": "number" }),
            WireType::Boolean => json!({ "type": "boolean" }),
            WireType::Array(items) => json!({ "type": "array", "items": items.to_schema() }),
            WireType::Object(fields) => {
                let properties: Map<String, Value> = fields
                    .iter()
                    .map(|f| (f.name.to_string(), f.shape.to_schema()))
                    .collect();
                let required: Vec<&str> = fields
                    .iter()
                    .filter(|f| !f.shape.nullable)
                    .map(|f| f.name)
                    .collect();
                json!({ "type": "object", "properties": properties, "required": required })
            }
            WireType::Map => json!({
                "type": "object",
                "additionalProperties": { "type": "string" }
            }),
        }
    }

    /// Checks that `value` fits this shape. Returns a human readable reason
    /// on mismatch; `path` locates nested failures.
    fn check(&self, value: &Value, path: &str) -> std::result::Result<(), String> {
        if value.is_null() {
            return if self.nullable {
                Ok(())
            } else {
                Err(format!("{path}: expected a value, found null"))
            };
        }

        let mismatch = |expected: &str| Err(format!("{path}: expected {expected}, found {value}"));
        match &self.wire {
            WireType::String => match value {
                Value::String(_) => Ok(()),
                _ => mismatch("a string"),
            },
            WireType::Guid => match value.as_str().map(Uuid::parse_str) {
                Some(Ok(_)) => Ok(()),
                _ => mismatch("a GUID string"),
            },
            WireType::Integer => {
                if value.is_i64() || value.is_u64() {
                    Ok(())
                } else {
                    mismatch("an integer")
                }
            }
            WireType::Number => match value {
                Value::Number(_) => Ok(()),
                _ => mismatch("a number"),
            },
            WireType::Boolean => match value {
                Value::Bool(_) => Ok(()),
                _ => mismatch("a boolean"),
            },
            WireType::Array(items) => match value {
                Value::Array(values) => values
                    .iter()
                    .enumerate()
                    .try_for_each(|(i, v)| items.check(v, &format!("{path}[{i}]"))),
                _ => mismatch("an array"),
            },
            WireType::Object(fields) => match value {
                Value::Object(map) => fields.iter().try_for_each(|f| {
                    let nested = format!("{path}.{}", f.name);
                    match map.get(f.name) {
                        Some(v) => f.shape.check(v, &nested),
                        None if f.shape.nullable => Ok(()),
                        None => Err(format!("{nested}: missing required field")),
                    }
                }),
                _ => mismatch("an object"),
            },
            WireType::Map => match value {
                Value::Object(map) if map.values().all(Value::is_string) => Ok(()),
                _ => mismatch("an object of strings"),
            },
        }
    }
}

/// A named field of a record type, in wire (camelCase) spelling.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub shape: TypeShape,
}

impl FieldSpec {
    pub fn of<T: Describe>(name: &'static str) -> Self {
        Self {
            name,
            shape: T::shape(),
        }
    }
}

/// Maps a Rust type onto its wire shape.
pub trait Describe {
    fn shape() -> TypeShape;
}

macro_rules! describe_as {
    ($wire:expr => $($ty:ty),+) => {
        $(impl Describe for $ty {
            fn shape() -> TypeShape {
                TypeShape::new($wire)
            }
        })+
    };
}

describe_as!(WireType::String => String);
describe_as!(WireType::Guid => Uuid);
describe_as!(WireType::Integer => i32, i64, u32, u64);
describe_as!(WireType::Number => Decimal, f64);
describe_as!(WireType::Boolean => bool);
describe_as!(WireType::Map => BTreeMap<String, String>, HashMap<String, String>);

impl<T: Describe> Describe for Vec<T> {
    fn shape() -> TypeShape {
        TypeShape::new(WireType::Array(Box::new(T::shape())))
    }
}

impl<T: Describe> Describe for Option<T> {
    fn shape() -> TypeShape {
        TypeShape {
            nullable: true,
            ..T::shape()
        }
    }
}

// =============================================================================
// Parameters
// =============================================================================

/// A declared tool parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub shape: TypeShape,
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn of<T: Describe>(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            shape: T::shape(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Optional iff the type is nullable or a default exists.
    pub fn is_required(&self) -> bool {
        !self.shape.nullable && self.default.is_none()
    }

    fn to_schema(&self) -> Value {
        let mut schema = self.shape.to_schema();
        if let Value::Object(map) = &mut schema {
            if !self.description.is_empty() {
                map.insert("description".into(), json!(self.description));
            }
            if let Some(default) = &self.default {
                map.insert("default".into(), default.clone());
            }
        }
        schema
    }

    /// Resolves this parameter's value from the raw call arguments:
    /// the supplied value, else the declared default, else the type's zero
    /// value (absent for reference types).
    pub fn resolve(&self, raw: Option<&Value>) -> Result<Value> {
        let supplied = raw.filter(|v| !v.is_null()).cloned();
        let value = match supplied {
            Some(value) => self.normalize(value),
            None => match &self.default {
                Some(default) => default.clone(),
                None => return Ok(self.shape.zero_value()),
            },
        };

        self.shape
            .check(&value, self.name)
            .map_err(|reason| invalid_argument(self.name, reason))?;
        Ok(value)
    }

    /// Lenient wire conversions applied before type checking.
    fn normalize(&self, value: Value) -> Value {
        match (&self.shape.wire, value) {
            // integers may arrive as strings
            (WireType::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(n) => json!(n),
                Err(_) => Value::String(s),
            },
            // GUID lists drop empty entries
            (WireType::Array(items), Value::Array(values)) if items.wire == WireType::Guid => {
                Value::Array(
                    values
                        .into_iter()
                        .filter(|v| !v.is_null() && v.as_str().map_or(true, |s| !s.trim().is_empty()))
                        .collect(),
                )
            }
            (_, value) => value,
        }
    }
}

pub fn invalid_argument(param: &str, reason: impl std::fmt::Display) -> AppError {
    AppError::InvalidArguments {
        param: param.to_string(),
        source: serde_json::Error::custom(reason),
    }
}

/// `{type:"object", properties:{...}, required:[...]}` for a parameter list.
pub fn input_schema(params: &[ParamSpec]) -> Value {
    let properties: Map<String, Value> = params
        .iter()
        .map(|p| (p.name.to_string(), p.to_schema()))
        .collect();
    let required: Vec<&str> = params
        .iter()
        .filter(|p| p.is_required())
        .map(|p| p.name)
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
