//! Type coercion of raw input into declared primitive types.
//!
//! Every function is pure: `(pristine, label) -> Value`. A failed coercion
//! yields a [`Value`] whose coerced slot still holds the input and whose
//! error is the type's message rendered with the field label.

use crate::message::Messages;
use crate::rule::PrimitiveType;
use crate::sanitize::{clean_html, escape_html, DEFAULT_ALLOWED_TAGS};
use crate::value::{string_form, Value};
use regex::Regex;
use serde_json::Value as Json;
use std::sync::OnceLock;

static INT_REGEX: OnceLock<Regex> = OnceLock::new();
static FLOAT_REGEX: OnceLock<Regex> = OnceLock::new();

fn int_regex() -> &'static Regex {
    INT_REGEX.get_or_init(|| Regex::new(r"^(0|-?[1-9][0-9]*)$").expect("int pattern is valid"))
}

fn float_regex() -> &'static Regex {
    FLOAT_REGEX.get_or_init(|| {
        Regex::new(r"^[-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?$").expect("float pattern is valid")
    })
}

/// Coerce `pristine` to a primitive type.
pub fn coerce(
    primitive: PrimitiveType,
    args: &[String],
    pristine: &Json,
    label: &str,
    messages: &Messages,
) -> Value {
    match primitive {
        PrimitiveType::Text => to_text(pristine, label, messages),
        PrimitiveType::Plain => to_plain(pristine, label, messages),
        PrimitiveType::Html => to_html(pristine, args, label, messages),
        PrimitiveType::Int => to_int(pristine, label, messages),
        PrimitiveType::Float => to_float(pristine, label, messages),
        PrimitiveType::Bool => to_bool(pristine, label, messages),
        PrimitiveType::List => to_list(pristine, label, messages),
    }
}

fn is_falsy(value: &Json) -> bool {
    match value {
        Json::Null => true,
        Json::Bool(b) => !b,
        Json::Number(n) => n.as_f64() == Some(0.0),
        Json::String(s) => s.is_empty() || s == "0",
        Json::Array(items) => items.is_empty(),
        Json::Object(map) => map.is_empty(),
    }
}

/// Booleans pass; `1/on/true/yes` and `0/off/false/no/null` are recognised
/// case-insensitively; falsy input is `false`.
pub fn to_bool(pristine: &Json, label: &str, messages: &Messages) -> Value {
    if let Json::Bool(b) = pristine {
        return Value::new(Json::Bool(*b), pristine.clone());
    }

    if is_falsy(pristine) {
        return Value::new(Json::Bool(false), pristine.clone());
    }

    let lowered = string_form(pristine).map(|s| s.to_lowercase());
    match lowered.as_deref() {
        Some("1" | "on" | "true" | "yes") => Value::new(Json::Bool(true), pristine.clone()),
        Some("0" | "off" | "false" | "no" | "null") => {
            Value::new(Json::Bool(false), pristine.clone())
        }
        _ => Value::invalid(pristine.clone(), messages.coercion("bool", label)),
    }
}

/// Integers and `null` pass; integral floats and integer strings convert.
pub fn to_int(pristine: &Json, label: &str, messages: &Messages) -> Value {
    let invalid = || Value::invalid(pristine.clone(), messages.coercion("int", label));

    match pristine {
        Json::Null => Value::new(Json::Null, Json::Null),
        Json::Number(n) if n.is_i64() || n.is_u64() => Value::new(pristine.clone(), pristine.clone()),
        Json::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                Value::new(Json::from(f as i64), pristine.clone())
            }
            _ => invalid(),
        },
        Json::Array(_) | Json::Object(_) => invalid(),
        other => {
            let text = string_form(other).unwrap_or_default();
            let text = text.trim();
            if !int_regex().is_match(text) {
                return invalid();
            }
            match text.parse::<i64>() {
                Ok(i) => Value::new(Json::from(i), pristine.clone()),
                Err(_) => invalid(),
            }
        }
    }
}

/// Floats and `null` pass; integers widen; numeric strings convert.
pub fn to_float(pristine: &Json, label: &str, messages: &Messages) -> Value {
    let invalid = || Value::invalid(pristine.clone(), messages.coercion("float", label));

    match pristine {
        Json::Null => Value::new(Json::Null, Json::Null),
        Json::Number(n) if n.is_f64() => Value::new(pristine.clone(), pristine.clone()),
        Json::Number(n) => match n.as_f64() {
            Some(f) => Value::new(Json::from(f), pristine.clone()),
            None => invalid(),
        },
        Json::Array(_) | Json::Object(_) => invalid(),
        other => {
            let text = string_form(other).unwrap_or_default();
            let text = text.trim();
            if !float_regex().is_match(text) {
                return invalid();
            }
            match text.parse::<f64>() {
                Ok(f) if f.is_finite() => Value::new(Json::from(f), pristine.clone()),
                _ => invalid(),
            }
        }
    }
}

fn non_empty(text: &str) -> Json {
    if text.is_empty() {
        Json::Null
    } else {
        Json::String(text.to_string())
    }
}

/// HTML-escaped and trimmed string; empty becomes `null`.
pub fn to_text(pristine: &Json, label: &str, messages: &Messages) -> Value {
    match string_form(pristine) {
        Some(text) => Value::new(non_empty(escape_html(&text).trim()), pristine.clone()),
        None => Value::invalid(pristine.clone(), messages.coercion("text", label)),
    }
}

/// Raw string; empty becomes `null`.
pub fn to_plain(pristine: &Json, label: &str, messages: &Messages) -> Value {
    match string_form(pristine) {
        Some(text) => Value::new(non_empty(&text), pristine.clone()),
        None => Value::invalid(pristine.clone(), messages.coercion("text", label)),
    }
}

/// Markup reduced to the allowed tags, trimmed; empty becomes `null`.
///
/// `args[0]` is a comma separated allow-list (`html:b,i,p`).
pub fn to_html(pristine: &Json, args: &[String], label: &str, messages: &Messages) -> Value {
    let Some(text) = string_form(pristine) else {
        return Value::invalid(pristine.clone(), messages.coercion("text", label));
    };

    let cleaned = match args.first() {
        Some(allowed) => {
            let allowed: Vec<&str> = allowed.split(',').map(str::trim).collect();
            clean_html(&text, &allowed)
        }
        None => clean_html(&text, DEFAULT_ALLOWED_TAGS),
    };

    Value::new(non_empty(cleaned.trim()), pristine.clone())
}

/// Sequential arrays pass; everything else is invalid.
pub fn to_list(pristine: &Json, label: &str, messages: &Messages) -> Value {
    match pristine {
        Json::Array(_) => Value::new(pristine.clone(), pristine.clone()),
        _ => Value::invalid(pristine.clone(), messages.coercion("list", label)),
    }
}
