//! Schema definitions.
//!
//! A [`Schema`] is an immutable set of field rules plus the validators,
//! messages and hooks they use. Running it with [`Schema::validate`]
//! produces a fresh [`Validation`], so one definition can be shared
//! between threads and validations.
//!
//! ## Example
//!
//! ```rust
//! use sire::Schema;
//! use serde_json::json;
//!
//! let mut schema = Schema::default();
//! schema.add("age", "int", &["required", "min:18"]).unwrap().label("Age");
//!
//! let validation = schema.validate(&json!({"age": "21"})).unwrap();
//! assert!(validation.is_valid());
//! assert_eq!(validation.values()["age"], json!(21));
//! ```

use crate::config::SchemaConfig;
use crate::dns::{default_resolver, MxResolver};
use crate::error::{Result, SchemaError};
use crate::message::Messages;
use crate::rule::{FieldType, IntoFieldType, Rule, RuleHandle};
use crate::validation::{self, Review, Validation};
use crate::validators::{builtins, Validator};
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Cross-field check run after a validation without field errors.
pub type ReviewFn = Arc<dyn Fn(&mut Review<'_>) + Send + Sync>;

type RulesFn = Box<dyn FnOnce(&mut Schema) -> Result<()>>;

/// An immutable validation schema.
#[derive(Clone)]
pub struct Schema {
    config: SchemaConfig,
    rules: IndexMap<String, Rule>,
    validators: HashMap<String, Validator>,
    messages: Messages,
    resolver: Arc<dyn MxResolver>,
    review: Option<ReviewFn>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(SchemaConfig::default())
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("config", &self.config)
            .field("rules", &self.rules)
            .field("validators", &self.validators.keys().collect::<Vec<_>>())
            .field("resolver", &self.resolver)
            .field("review", &self.review.is_some())
            .finish()
    }
}

impl Schema {
    /// Create an empty schema with the built-in validators.
    pub fn new(config: SchemaConfig) -> Self {
        let messages = Messages::default();
        let resolver = default_resolver();
        let validators = builtins(&messages, resolver.clone())
            .into_iter()
            .map(|v| (v.name().to_string(), v))
            .collect();

        Self {
            config,
            rules: IndexMap::new(),
            validators,
            messages,
            resolver,
            review: None,
        }
    }

    /// Create an empty list-mode schema.
    pub fn list() -> Self {
        Self::new(SchemaConfig::default().list(true))
    }

    /// Start building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Declare a field.
    ///
    /// `field_type` is a tag such as `"int"` or `"html:b,i"`, a
    /// [`PrimitiveType`](crate::PrimitiveType), or another schema.
    /// Declaring a field again replaces its rule in place.
    ///
    /// # Errors
    ///
    /// [`SchemaError::EmptyField`], [`SchemaError::UnknownType`] or
    /// [`SchemaError::EmptyValidator`] for a malformed declaration.
    pub fn add(
        &mut self,
        field: impl Into<String>,
        field_type: impl IntoFieldType,
        validators: &[&str],
    ) -> Result<RuleHandle<'_>> {
        let rule = Rule::new(field, field_type.into_field_type()?, validators)?;

        let slot = match self.rules.entry(rule.field().to_string()) {
            Entry::Occupied(entry) => {
                let slot = entry.into_mut();
                *slot = rule;
                slot
            }
            Entry::Vacant(entry) => entry.insert(rule),
        };

        Ok(RuleHandle::new(slot))
    }

    /// Register a validator, replacing any validator of the same name.
    pub fn register(&mut self, validator: Validator) -> &mut Self {
        self.validators
            .insert(validator.name().to_string(), validator);
        self
    }

    /// Override a message template.
    ///
    /// `key` is a type tag (`"int"`, `"schema"`, ...) or a validator name.
    pub fn set_message(&mut self, key: &str, template: impl Into<String>) -> &mut Self {
        let template = template.into();
        if let Some(validator) = self.validators.remove(key) {
            self.validators
                .insert(key.to_string(), validator.with_message(template.clone()));
        }
        self.messages.set(key, template);
        self
    }

    /// Use another resolver for `email:checkdns`.
    ///
    /// Only the built-in `email` validator is rebuilt around the resolver;
    /// a registered replacement stays in place.
    pub fn set_resolver(&mut self, resolver: Arc<dyn MxResolver>) -> &mut Self {
        let builtin = self.validators.get("email").map_or(true, Validator::is_builtin);

        if builtin {
            let message = self
                .validators
                .get("email")
                .map(|v| v.message().to_string())
                .unwrap_or_else(|| self.messages.get("email").to_string());
            let email = crate::validators::email_validator(&message, resolver.clone());
            self.register(email.into_builtin());
        }

        self.resolver = resolver;
        self
    }

    /// The rule declared for `field`.
    pub fn rule(&self, field: &str) -> Option<&Rule> {
        self.rules.get(field)
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    /// The validator registered under `name`.
    pub fn validator(&self, name: &str) -> Option<&Validator> {
        self.validators.get(name)
    }

    /// The configuration.
    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Section title used when grouping errors.
    pub fn title(&self) -> Option<&str> {
        self.config.title.as_deref()
    }

    /// Whether the schema validates a list of records.
    pub fn is_list(&self) -> bool {
        self.config.list
    }

    pub(crate) fn messages(&self) -> &Messages {
        &self.messages
    }

    pub(crate) fn review_fn(&self) -> Option<&ReviewFn> {
        self.review.as_ref()
    }

    /// Validate a payload as a top-level schema.
    ///
    /// # Errors
    ///
    /// Only for definition bugs and a payload of the wrong shape. Invalid
    /// data is reported through the returned [`Validation`].
    pub fn validate(&self, data: &Json) -> Result<Validation> {
        self.validate_at(data, 1)
    }

    /// Validate a payload at a nesting level, starting at 1.
    pub fn validate_at(&self, data: &Json, level: usize) -> Result<Validation> {
        self.check_validators()?;
        validation::run(self, data, level)?.ok_or(SchemaError::InvalidPayload {
            expected: if self.is_list() {
                "an array of objects"
            } else {
                "an object"
            },
        })
    }

    /// Fail on validator names nobody registered, including in sub-schemas.
    fn check_validators(&self) -> Result<()> {
        for rule in self.rules.values() {
            for spec in rule.validators() {
                if !self.validators.contains_key(spec.name()) {
                    return Err(SchemaError::UnknownValidator {
                        field: rule.field().to_string(),
                        name: spec.name().to_string(),
                    });
                }
            }

            if let FieldType::Nested(schema) = rule.field_type() {
                schema.check_validators()?;
            }
        }

        Ok(())
    }
}

/// Builder for [`Schema`].
///
/// ```rust
/// use sire::Schema;
/// use serde_json::json;
///
/// let schema = Schema::builder()
///     .title("Account")
///     .rules(|s| {
///         s.add("password", "plain", &["required"])?;
///         s.add("repeat", "plain", &["required"])?;
///         Ok(())
///     })
///     .review(|review| {
///         if review.values()["password"] != review.values()["repeat"] {
///             review.add_error("repeat", "Passwords differ");
///         }
///     })
///     .build()
///     .unwrap();
///
/// let validation = schema
///     .validate(&json!({"password": "a", "repeat": "b"}))
///     .unwrap();
/// assert_eq!(validation.error_count(), 1);
/// ```
#[derive(Default)]
pub struct SchemaBuilder {
    config: SchemaConfig,
    rules: Vec<RulesFn>,
    review: Option<ReviewFn>,
    validators: Vec<Validator>,
    messages: Vec<(String, String)>,
    resolver: Option<Arc<dyn MxResolver>>,
}

impl SchemaBuilder {
    /// Replace the whole configuration.
    pub fn config(mut self, config: SchemaConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate a list of records.
    pub fn list(mut self) -> Self {
        self.config.list = true;
        self
    }

    /// Pass unknown input keys through untyped.
    pub fn keep_unknown(mut self) -> Self {
        self.config.keep_unknown = true;
        self
    }

    /// Set the locales.
    pub fn locales<I, S>(mut self, locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config = self.config.locales(locales);
        self
    }

    /// Set the section title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    /// Add a rule-building function, run once by [`build`](Self::build).
    pub fn rules<F>(mut self, rules: F) -> Self
    where
        F: FnOnce(&mut Schema) -> Result<()> + 'static,
    {
        self.rules.push(Box::new(rules));
        self
    }

    /// Set the cross-field check.
    pub fn review<F>(mut self, review: F) -> Self
    where
        F: Fn(&mut Review<'_>) + Send + Sync + 'static,
    {
        self.review = Some(Arc::new(review));
        self
    }

    /// Register a custom validator.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Override a message template.
    pub fn message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.push((key.into(), template.into()));
        self
    }

    /// Set the MX resolver.
    pub fn resolver(mut self, resolver: Arc<dyn MxResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Build the schema, running the rule-building functions.
    ///
    /// # Errors
    ///
    /// Whatever a rule-building function returns.
    pub fn build(self) -> Result<Schema> {
        let mut schema = Schema::new(self.config);

        if let Some(resolver) = self.resolver {
            schema.set_resolver(resolver);
        }
        for validator in self.validators {
            schema.register(validator);
        }
        for (key, template) in &self.messages {
            schema.set_message(key, template.clone());
        }
        for rules in self.rules {
            rules(&mut schema)?;
        }
        schema.review = self.review;

        Ok(schema)
    }
}
