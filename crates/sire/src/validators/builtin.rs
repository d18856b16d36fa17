//! The validators every schema starts with.

use super::Validator;
use crate::dns::MxResolver;
use crate::message::Messages;
use crate::value::{as_float, string_form, Value};
use regex::Regex;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

// Pre-compiled regex patterns
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        // RFC 5322 simplified, with at least one dot in the domain
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
        ).expect("email pattern is valid")
    })
}

/// Build the built-in validators with messages from `messages`.
pub fn builtins(messages: &Messages, resolver: Arc<dyn MxResolver>) -> Vec<Validator> {
    vec![
        Validator::new("required", messages.get("required"), required, false),
        email(messages.get("email"), resolver),
        Validator::new(
            "minlen",
            messages.get("minlen"),
            |value: &Value, args: &[String]| {
                length_bound(value, args, "minlen").is_some_and(|(len, min)| len >= min)
            },
            true,
        ),
        Validator::new(
            "maxlen",
            messages.get("maxlen"),
            |value: &Value, args: &[String]| {
                length_bound(value, args, "maxlen").is_some_and(|(len, max)| len <= max)
            },
            true,
        ),
        Validator::new(
            "min",
            messages.get("min"),
            |value: &Value, args: &[String]| {
                numeric_bound(args, "min").is_some_and(|min| as_float(value.coerced()) >= min)
            },
            true,
        ),
        Validator::new(
            "max",
            messages.get("max"),
            |value: &Value, args: &[String]| {
                numeric_bound(args, "max").is_some_and(|max| as_float(value.coerced()) <= max)
            },
            true,
        ),
        regex(messages.get("regex")),
        Validator::new("in", messages.get("in"), one_of, true),
    ]
    .into_iter()
    .map(Validator::into_builtin)
    .collect()
}

/// Build the `email` validator around a resolver.
pub(crate) fn email(message: &str, resolver: Arc<dyn MxResolver>) -> Validator {
    Validator::new(
        "email",
        message,
        move |value: &Value, args: &[String]| {
            let Some(address) = string_form(value.coerced()) else {
                return false;
            };
            let address = address.trim();

            if !email_regex().is_match(address) {
                return false;
            }

            if args.first().map(String::as_str) == Some("checkdns") {
                return address
                    .rsplit_once('@')
                    .is_some_and(|(_, domain)| resolver.has_mx(domain));
            }

            true
        },
        true,
    )
}

fn required(value: &Value, _args: &[String]) -> bool {
    match value.coerced() {
        Json::Null => false,
        Json::String(s) => !s.trim().is_empty(),
        Json::Array(items) => !items.is_empty(),
        Json::Object(map) => !map.is_empty(),
        _ => true,
    }
}

fn one_of(value: &Value, args: &[String]) -> bool {
    // Allowed values are one comma separated argument: in:first,second,third
    let Some(allowed) = args.first() else {
        tracing::warn!("validator 'in' used without an allow-list");
        return false;
    };

    string_form(value.coerced()).is_some_and(|s| allowed.split(',').any(|a| a == s))
}

fn length_bound(value: &Value, args: &[String], name: &str) -> Option<(usize, usize)> {
    let Some(bound) = args.first().and_then(|a| a.trim().parse::<usize>().ok()) else {
        tracing::warn!(validator = name, ?args, "length bound is not a non-negative integer");
        return None;
    };

    let len = string_form(value.coerced())?.chars().count();
    Some((len, bound))
}

fn numeric_bound(args: &[String], name: &str) -> Option<f64> {
    let bound = args.first().and_then(|a| a.trim().parse::<f64>().ok());
    if bound.is_none() {
        tracing::warn!(validator = name, ?args, "numeric bound is not a number");
    }
    bound
}

fn regex(message: &str) -> Validator {
    // Compiled patterns are shared by every run of the schema
    let cache: Arc<Mutex<HashMap<String, Option<Regex>>>> = Arc::default();

    Validator::new(
        "regex",
        message,
        move |value: &Value, args: &[String]| {
            let pattern = args.join(":");
            let Some(text) = string_form(value.coerced()) else {
                return false;
            };

            let mut cache = match cache.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };

            let compiled = cache.entry(pattern).or_insert_with_key(|pattern| {
                compile_pattern(pattern)
                    .map_err(|error| {
                        tracing::warn!(pattern = %pattern, %error, "invalid regex pattern");
                    })
                    .ok()
            });

            compiled.as_ref().is_some_and(|re| re.is_match(&text))
        },
        true,
    )
}

/// Compile a validator pattern so that it must match the whole value.
///
/// Accepts a bare pattern (`^[a-z]+$`) or a delimited one with trailing
/// flags (`/^[a-z]+$/i`). Supported flags: `i`, `m`, `s`, `x`, `U`; `u`
/// and `D` are accepted and ignored.
pub fn compile_pattern(raw: &str) -> Result<Regex, regex::Error> {
    let (body, flags) = split_delimited(raw).unwrap_or((raw, String::new()));

    let prefix = if flags.is_empty() {
        String::new()
    } else {
        format!("(?{})", flags)
    };

    // In verbose mode a trailing `#` comment must end before the anchor.
    let close = if flags.contains('x') { "\n" } else { "" };

    Regex::new(&format!(r"{}\A(?:{}{})\z", prefix, body, close))
}

fn split_delimited(raw: &str) -> Option<(&str, String)> {
    let delimiter = raw.chars().next()?;
    if !matches!(delimiter, '/' | '#' | '~' | '@' | '%' | '!') {
        return None;
    }

    let end = raw.rfind(delimiter)?;
    if end == 0 {
        return None;
    }

    let body = &raw[delimiter.len_utf8()..end];
    let mut flags = String::new();
    for flag in raw[end + delimiter.len_utf8()..].chars() {
        match flag {
            'i' | 'm' | 's' | 'x' | 'U' => flags.push(flag),
            'u' | 'D' => {}
            _ => return None,
        }
    }

    Some((body, flags))
}
