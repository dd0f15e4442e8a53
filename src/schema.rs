//! Declarative JSON shapes for request bodies and model replies.

use std::fmt;

use chrono::NaiveDate;
use reqwest::Url;
use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String,
    Number,
    Boolean,
    /// ISO-8601 calendar date, `YYYY-MM-DD`.
    Date,
    /// Absolute `http`/`https` URL.
    Url,
    Enum(Vec<String>),
    Array(Box<Schema>),
    Object(Vec<Field>),
    /// Object whose keys must all come from `keys`. With `single` set it must
    /// hold exactly one entry.
    Map {
        keys: Vec<String>,
        values: Box<Schema>,
        single: bool,
    },
    AnyOf(Vec<Schema>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
    pub required: bool,
    pub description: Option<String>,
}

impl Field {
    pub fn required(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            required: true,
            description: None,
        }
    }

    pub fn optional(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            required: false,
            ..Self::required(name, schema)
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "(root)" } else { &self.path };
        write!(f, "{}: expected {}, got {}", path, self.expected, self.actual)
    }
}

#[derive(Debug, Clone, Error)]
#[error("{} violation(s): {}", .violations.len(), summary(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

fn summary(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Schema {
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Schema::Enum(values.into_iter().map(Into::into).collect())
    }

    pub fn array(item: Schema) -> Self {
        Schema::Array(Box::new(item))
    }

    pub fn map<I, S>(keys: I, values: Schema) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Schema::Map {
            keys: keys.into_iter().map(Into::into).collect(),
            values: Box::new(values),
            single: false,
        }
    }

    /// Like [`Schema::map`], but the object must hold exactly one entry.
    pub fn single_entry<I, S>(keys: I, values: Schema) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Schema::Map {
            keys: keys.into_iter().map(Into::into).collect(),
            values: Box::new(values),
            single: true,
        }
    }

    /// Undeclared object keys are dropped from the result, and an optional
    /// field sent as `null` is treated as absent.
    pub fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        let mut violations = Vec::new();
        let coerced = self.check(value, "", &mut violations);
        if violations.is_empty() {
            Ok(coerced)
        } else {
            Err(ValidationError { violations })
        }
    }

    fn check(&self, value: &Value, path: &str, out: &mut Vec<Violation>) -> Value {
        match self {
            Schema::String => {
                if !value.is_string() {
                    out.push(violation(path, "string", value));
                }
            }
            Schema::Number => {
                if !value.is_number() {
                    out.push(violation(path, "number", value));
                }
            }
            Schema::Boolean => {
                if !value.is_boolean() {
                    out.push(violation(path, "boolean", value));
                }
            }
            Schema::Date => match value.as_str() {
                Some(s) if s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() => {}
                _ => out.push(violation(path, "ISO-8601 date (YYYY-MM-DD)", value)),
            },
            Schema::Url => match value.as_str().map(Url::parse) {
                Some(Ok(url)) if matches!(url.scheme(), "http" | "https") => {}
                _ => out.push(violation(path, "absolute http(s) URL", value)),
            },
            Schema::Enum(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| a == s) => {}
                _ => out.push(violation(path, &one_of(allowed), value)),
            },
            Schema::Array(item) => {
                let Some(items) = value.as_array() else {
                    out.push(violation(path, "array", value));
                    return value.clone();
                };
                return Value::Array(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, v)| item.check(v, &format!("{path}[{i}]"), out))
                        .collect(),
                );
            }
            Schema::Object(fields) => {
                let Some(object) = value.as_object() else {
                    out.push(violation(path, "object", value));
                    return value.clone();
                };
                let mut coerced = Map::new();
                for field in fields {
                    let field_path = join(path, &field.name);
                    match object.get(&field.name) {
                        None | Some(Value::Null) if !field.required => {}
                        None => out.push(Violation {
                            path: field_path,
                            expected: format!("required {}", field.schema.label()),
                            actual: "missing".to_string(),
                        }),
                        Some(v) => {
                            let checked = field.schema.check(v, &field_path, out);
                            coerced.insert(field.name.clone(), checked);
                        }
                    }
                }
                return Value::Object(coerced);
            }
            Schema::Map { keys, values, single } => {
                let Some(object) = value.as_object() else {
                    out.push(violation(path, "object", value));
                    return value.clone();
                };
                if *single && object.len() != 1 {
                    out.push(violation(path, &self.label(), value));
                }
                let mut coerced = Map::new();
                for (key, v) in object {
                    let entry_path = join(path, key);
                    if !keys.iter().any(|k| k == key) {
                        out.push(Violation {
                            path: entry_path,
                            expected: format!("key {}", one_of(keys)),
                            actual: json!(key).to_string(),
                        });
                        continue;
                    }
                    let checked = values.check(v, &entry_path, out);
                    coerced.insert(key.clone(), checked);
                }
                return Value::Object(coerced);
            }
            Schema::AnyOf(options) => {
                for option in options {
                    let mut scratch = Vec::new();
                    let checked = option.check(value, path, &mut scratch);
                    if scratch.is_empty() {
                        return checked;
                    }
                }
                out.push(violation(path, &self.label(), value));
            }
        }
        value.clone()
    }

    pub fn label(&self) -> String {
        match self {
            Schema::String => "string".into(),
            Schema::Number => "number".into(),
            Schema::Boolean => "boolean".into(),
            Schema::Date => "ISO-8601 date (YYYY-MM-DD)".into(),
            Schema::Url => "absolute http(s) URL".into(),
            Schema::Enum(values) => one_of(values),
            Schema::Array(item) => format!("array of {}", item.label()),
            Schema::Map { single: true, keys, .. } => {
                format!("object with exactly one key {}", one_of(keys))
            }
            Schema::Object(_) | Schema::Map { .. } => "object".into(),
            Schema::AnyOf(options) => options
                .iter()
                .map(Schema::label)
                .collect::<Vec<_>>()
                .join(" or "),
        }
    }

    /// Render the shape as JSON Schema for a structured-output request.
    pub fn to_json_schema(&self) -> Value {
        match self {
            Schema::String => json!({ "type": "string" }),
            Schema::Number => json!({ "type": "number" }),
            Schema::Boolean => json!({ "type": "boolean" }),
            Schema::Date => json!({ "type": "string", "format": "date" }),
            Schema::Url => json!({ "type": "string", "format": "uri" }),
            Schema::Enum(values) => json!({ "type": "string", "enum": values }),
            Schema::Array(item) => json!({ "type": "array", "items": item.to_json_schema() }),
            Schema::Object(fields) => {
                let mut properties = Map::new();
                for field in fields {
                    let mut property = field.schema.to_json_schema();
                    if let (Some(description), Some(obj)) =
                        (&field.description, property.as_object_mut())
                    {
                        obj.insert("description".into(), json!(description));
                    }
                    properties.insert(field.name.clone(), property);
                }
                let required: Vec<&str> = fields
                    .iter()
                    .filter(|f| f.required)
                    .map(|f| f.name.as_str())
                    .collect();
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                    "additionalProperties": false,
                })
            }
            Schema::Map { keys, values, single } => {
                let mut rendered = json!({
                    "type": "object",
                    "propertyNames": { "enum": keys },
                    "additionalProperties": values.to_json_schema(),
                });
                if let (true, Some(obj)) = (*single, rendered.as_object_mut()) {
                    obj.insert("minProperties".into(), json!(1));
                    obj.insert("maxProperties".into(), json!(1));
                }
                rendered
            }
            Schema::AnyOf(options) => json!({
                "anyOf": options.iter().map(Schema::to_json_schema).collect::<Vec<_>>(),
            }),
        }
    }
}

fn violation(path: &str, expected: &str, actual: &Value) -> Violation {
    Violation {
        path: path.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

fn one_of(values: &[String]) -> String {
    format!("one of [{}]", values.join(", "))
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
