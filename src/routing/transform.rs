//! Parameter transformers.
//!
//! # Responsibilities
//! - Convert raw path segment text into typed route parameter values
//! - Provide the built-in `str` and `int` conversions
//! - Allow applications to register their own type tags
//!
//! # Design Decisions
//! - Transformers never fail the match: a rejected value is carried to the
//!   handler as `ParamValue::Invalid` and validated there
//! - An unregistered type tag passes the raw text through unchanged

use std::collections::HashMap;
use std::sync::Arc;

/// A route parameter value after transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Pass-through text (`str`, or an unregistered type tag).
    Str(String),
    /// Parsed integer (`int`).
    Int(i64),
    /// Raw text the transformer rejected. Handlers decide what to do with it.
    Invalid(String),
}

impl ParamValue {
    /// The integer value, if this parameter parsed as one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The textual value, for pass-through parameters.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The raw text of the segment, whatever the transformer made of it.
    pub fn raw(&self) -> String {
        match self {
            ParamValue::Str(s) | ParamValue::Invalid(s) => s.clone(),
            ParamValue::Int(n) => n.to_string(),
        }
    }
}

/// Conversion function applied to a raw path segment.
pub type Transformer = Arc<dyn Fn(&str) -> ParamValue + Send + Sync>;

/// Named transformer functions, selected by the type tag in `:name:type`.
#[derive(Clone)]
pub struct TransformerRegistry {
    by_tag: HashMap<String, Transformer>,
}

impl TransformerRegistry {
    /// Registry with the built-in `str` and `int` transformers.
    pub fn new() -> Self {
        let mut registry = Self {
            by_tag: HashMap::new(),
        };
        registry.set("str", |raw| ParamValue::Str(raw.to_string()));
        registry.set("int", |raw| match raw.parse::<i64>() {
            Ok(n) => ParamValue::Int(n),
            Err(_) => ParamValue::Invalid(raw.to_string()),
        });
        registry
    }

    /// Register (or replace) a transformer under a type tag.
    pub fn set<F>(&mut self, tag: &str, func: F)
    where
        F: Fn(&str) -> ParamValue + Send + Sync + 'static,
    {
        self.by_tag.insert(tag.to_string(), Arc::new(func));
    }

    /// Remove a transformer. Segments declared with the tag fall back to
    /// raw pass-through.
    pub fn remove(&mut self, tag: &str) -> bool {
        self.by_tag.remove(tag).is_some()
    }

    /// Apply the transformer registered under `tag` to `raw`.
    ///
    /// Unknown tags are not an error: the raw text is passed through.
    pub fn apply(&self, tag: &str, raw: &str) -> ParamValue {
        match self.by_tag.get(tag) {
            Some(transform) => transform(raw),
            None => ParamValue::Str(raw.to_string()),
        }
    }
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
