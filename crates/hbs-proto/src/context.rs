// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Render context assembly.
//!
//! This module turns a loaded companion data document into the value a
//! template is rendered against, and provides the layered [`Context`]
//! used by the diagnostic path.
//!
//! # Companion data
//!
//! For a template identifier `P`, the data document lives at `P + ".js"`.
//! The document is lenient JSON: unquoted keys and comments are
//! tolerated by the parser itself, not by a run-time branch. An absent
//! document is equivalent to `{}`.
//!
//! # Value resolution
//!
//! The diagnostic path looks keys up through an ordered
//! [`ValueResolver`] chain: direct mapping lookup, then field-style
//! lookup, then accessor-style lookup. The first strategy that yields a
//! value wins.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{HbsError, Result};
use crate::loader::ResourceLoader;

/// Parses a lenient-JSON object document.
///
/// Tolerates unquoted keys and comment syntax. The top level must be
/// an object; anything else is malformed.
pub fn parse_lenient(path: &str, source: &str) -> Result<Map<String, Value>> {
    let value: Value = json5::from_str(source).map_err(|e| HbsError::Data {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(HbsError::Data {
            path: path.to_string(),
            message: format!("expected an object document, found {other}"),
        }),
    }
}

/// Builds the data context for the primary render path.
///
/// Shares the pipeline's [`ResourceLoader`]; a missing companion
/// document is not an error and yields the empty object.
#[derive(Clone)]
pub struct ContextAssembler {
    loader: Arc<dyn ResourceLoader>,
}

impl ContextAssembler {
    /// Creates an assembler reading data documents through `loader`.
    pub fn new(loader: Arc<dyn ResourceLoader>) -> Self {
        Self { loader }
    }

    /// Loads and parses the companion data document for `template_id`.
    ///
    /// The document path is always `template_id + ".js"`, regardless
    /// of the extension the request carried.
    pub fn build_data_context(&self, template_id: &str) -> Result<Value> {
        let data_path = format!("{}.js", template_id);
        let source = match self.loader.load(&data_path) {
            Ok(source) => source,
            Err(HbsError::NotFound(_)) => {
                tracing::debug!(path = %data_path, "no companion data, using empty object");
                "{}".to_string()
            }
            Err(e) => return Err(e),
        };
        Ok(Value::Object(parse_lenient(&data_path, &source)?))
    }
}

/// A single key-lookup strategy over a context value.
///
/// Strategies are tried in a fixed order until one yields a value;
/// a `None` means "missing for this strategy", not an error.
pub trait ValueResolver: Send + Sync {
    /// Resolves `key` from `source`, if this strategy applies.
    fn resolve(&self, source: &Value, key: &str) -> Option<Value>;
}

/// Direct mapping lookup: the key as given, in an object.
pub struct MapValueResolver;

impl ValueResolver for MapValueResolver {
    fn resolve(&self, source: &Value, key: &str) -> Option<Value> {
        source.as_object()?.get(key).cloned()
    }
}

/// Field-style lookup: the snake_case spelling of the key.
///
/// Record-like objects serialize their fields in snake_case, while a
/// template (or a foreign error payload) may ask in camelCase.
pub struct FieldValueResolver;

impl ValueResolver for FieldValueResolver {
    fn resolve(&self, source: &Value, key: &str) -> Option<Value> {
        let field = to_snake_case(key);
        if field == key {
            return None;
        }
        source.as_object()?.get(&field).cloned()
    }
}

/// Accessor-style lookup: `get_<key>` or `is_<key>` entries.
pub struct AccessorValueResolver;

impl ValueResolver for AccessorValueResolver {
    fn resolve(&self, source: &Value, key: &str) -> Option<Value> {
        let object = source.as_object()?;
        let field = to_snake_case(key);
        object
            .get(&format!("get_{field}"))
            .or_else(|| object.get(&format!("is_{field}")))
            .cloned()
    }
}

/// The default strategy chain, in precedence order.
pub const DEFAULT_RESOLVERS: &[&dyn ValueResolver] = &[
    &MapValueResolver,
    &FieldValueResolver,
    &AccessorValueResolver,
];

/// Resolves `key` from `source` through the default chain.
pub fn resolve_value(source: &Value, key: &str) -> Option<Value> {
    DEFAULT_RESOLVERS
        .iter()
        .find_map(|resolver| resolver.resolve(source, key))
}

fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Layered key/value rendering context.
///
/// Frames merge in order, a later frame winning over an earlier one
/// for the same key. Lookups walk frames newest-first through the
/// resolver chain.
#[derive(Debug, Clone)]
pub struct Context {
    frames: Vec<Value>,
}

impl Context {
    /// Creates a context with `base` as its first frame.
    pub fn new(base: Value) -> Self {
        Self { frames: vec![base] }
    }

    /// Adds a single-key overlay frame. Later combines win.
    pub fn combine(mut self, key: impl Into<String>, value: Value) -> Self {
        let mut frame = Map::new();
        frame.insert(key.into(), value);
        self.frames.push(Value::Object(frame));
        self
    }

    /// Resolves `key` through the strategy chain, newest frame first.
    pub fn lookup(&self, key: &str) -> Option<Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| resolve_value(frame, key))
    }

    /// Flattens the frames into the value handed to the engine.
    pub fn to_value(&self) -> Value {
        let mut merged = Map::new();
        for frame in &self.frames {
            if let Value::Object(map) = frame {
                for (key, value) in map {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
        Value::Object(merged)
    }
}
