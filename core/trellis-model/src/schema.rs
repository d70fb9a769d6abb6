//! Attribute schemas and the builder that declares them.
//!
//! A [`Schema`] is built once per entity type and is immutable afterwards.
//! Declaration mistakes are collected by the [`SchemaBuilder`] and reported
//! together from [`SchemaBuilder::build`].

use crate::coercion::{Coercion, CoercionRegistry, CoercionTarget};
use crate::entity::Entity;
use crate::validation::{ValidationResult, Validator};
use crate::value::{Value, ValueMap};
use crate::wrap::{SourceType, WrapRule};
use crate::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// A named constructor: builds an entity of the given schema from one value.
pub type Constructor = Arc<dyn Fn(&Arc<Schema>, Value) -> ModelResult<Entity> + Send + Sync>;

/// What construction does with keys that are not declared attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeyPolicy {
    /// Skip the key.
    #[default]
    Ignore,
    /// Fail with [`ModelError::UnknownAttribute`].
    Reject,
}

/// A declared attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
    comparable: bool,
    predicate: bool,
    namespace: Option<Arc<Schema>>,
}

impl Attribute {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn is_comparable(&self) -> bool {
        self.comparable
    }

    pub const fn is_predicate(&self) -> bool {
        self.predicate
    }

    /// The nested schema, for namespace attributes.
    pub fn namespace(&self) -> Option<&Arc<Schema>> {
        self.namespace.as_ref()
    }
}

/// Options for a single attribute declaration.
///
/// Defaults: no coercion, comparable, not a predicate.
#[derive(Clone)]
pub struct AttributeOptions {
    coerce_type: Option<Arc<dyn CoercionTarget>>,
    selector: Option<String>,
    comparable: bool,
    predicate: bool,
}

impl Default for AttributeOptions {
    fn default() -> Self {
        Self {
            coerce_type: None,
            selector: None,
            comparable: true,
            predicate: false,
        }
    }
}

impl AttributeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for `coerce_type(target).selector(selector)`.
    #[must_use]
    pub fn coerce_with<T>(self, target: T, selector: impl Into<String>) -> Self
    where
        T: CoercionTarget + 'static,
    {
        self.coerce_type(target).selector(selector)
    }

    /// Sets the coercion type. A selector must be given as well.
    #[must_use]
    pub fn coerce_type<T>(mut self, target: T) -> Self
    where
        T: CoercionTarget + 'static,
    {
        self.coerce_type = Some(Arc::new(target));
        self
    }

    /// Sets the coercion selector. A coercion type must be given as well.
    #[must_use]
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    #[must_use]
    pub const fn comparable(mut self, comparable: bool) -> Self {
        self.comparable = comparable;
        self
    }

    #[must_use]
    pub const fn predicate(mut self, predicate: bool) -> Self {
        self.predicate = predicate;
        self
    }
}

/// The attribute schema of one entity type.
pub struct Schema {
    name: String,
    attributes: Vec<Attribute>,
    positions: HashMap<String, usize>,
    coercions: CoercionRegistry,
    wrap_rules: Vec<WrapRule>,
    constructors: BTreeMap<String, Constructor>,
    parent: Option<Arc<Schema>>,
    validator: Option<Arc<dyn Validator>>,
    unknown_keys: UnknownKeyPolicy,
}

impl Schema {
    /// Starts declaring a new entity type.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute names in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(Attribute::name)
    }

    /// Attribute names that participate in equality.
    pub fn comparable_fields(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|attr| attr.comparable)
            .map(Attribute::name)
    }

    /// Attribute names whose values are nested entities.
    pub fn namespace_fields(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|attr| attr.namespace.is_some())
            .map(Attribute::name)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.position(name).map(|idx| &self.attributes[idx])
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn coercions(&self) -> &CoercionRegistry {
        &self.coercions
    }

    pub fn wrap_rules(&self) -> &[WrapRule] {
        &self.wrap_rules
    }

    pub(crate) fn constructor(&self, name: &str) -> Option<&Constructor> {
        self.constructors.get(name)
    }

    pub fn parent(&self) -> Option<&Arc<Schema>> {
        self.parent.as_ref()
    }

    /// True if `self` is `other` or extends it, directly or transitively.
    pub fn is_a(&self, other: &Schema) -> bool {
        std::ptr::eq(self, other) || self.parent.as_ref().is_some_and(|p| p.is_a(other))
    }

    pub fn validator(&self) -> Option<&dyn Validator> {
        self.validator.as_deref()
    }

    pub const fn unknown_keys(&self) -> UnknownKeyPolicy {
        self.unknown_keys
    }

    /// Runs the configured validator over raw params, if there is one.
    pub fn validate(&self, params: &ValueMap) -> Option<ValidationResult> {
        self.validator().map(|validator| validator.validate(params))
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields().collect::<Vec<_>>())
            .field("coercions", &self.coercions)
            .field("wrap_rules", &self.wrap_rules)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("unknown_keys", &self.unknown_keys)
            .finish_non_exhaustive()
    }
}

/// Declares a [`Schema`].
///
/// ```
/// use trellis_model::{AttributeOptions, Schema};
///
/// let address = Schema::builder("Address").field("city").field("zip").build().unwrap();
/// let person = Schema::builder("Person")
///     .field("name")
///     .attr("cache", AttributeOptions::new().comparable(false))
///     .namespace("address", &address)
///     .build()
///     .unwrap();
/// assert_eq!(person.fields().collect::<Vec<_>>(), ["name", "cache", "address"]);
/// ```
pub struct SchemaBuilder {
    name: String,
    attributes: Vec<Attribute>,
    coercions: CoercionRegistry,
    wrap_rules: Vec<WrapRule>,
    constructors: BTreeMap<String, Constructor>,
    parent: Option<Arc<Schema>>,
    validator: Option<Arc<dyn Validator>>,
    unknown_keys: UnknownKeyPolicy,
    errors: Vec<String>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            coercions: CoercionRegistry::default(),
            wrap_rules: Vec::new(),
            constructors: BTreeMap::new(),
            parent: None,
            validator: None,
            unknown_keys: UnknownKeyPolicy::default(),
            errors: Vec::new(),
        }
    }

    /// Declares a subtype of `parent`.
    ///
    /// The parent's wrap rules and named constructors are copied as they are
    /// now; attributes are not inherited.
    pub fn extending(name: impl Into<String>, parent: &Arc<Schema>) -> Self {
        let mut builder = Self::new(name);
        builder.wrap_rules = parent.wrap_rules.clone();
        builder.constructors = parent.constructors.clone();
        builder.parent = Some(Arc::clone(parent));
        builder
    }

    /// Declares an attribute with default options.
    #[must_use]
    pub fn field(self, name: impl Into<String>) -> Self {
        self.attr(name, AttributeOptions::default())
    }

    /// Declares an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, options: AttributeOptions) -> Self {
        let name = name.into();
        let coercion = match (options.coerce_type, options.selector) {
            (None, None) => None,
            (Some(target), Some(selector)) => match Coercion::new(target, selector) {
                Ok(coercion) => Some(coercion),
                Err(err) => {
                    self.errors.push(format!("attribute `{name}`: {err}"));
                    return self;
                }
            },
            (Some(target), None) => {
                self.errors.push(format!(
                    "attribute `{name}`: coercion type {} given without a selector",
                    target.type_name()
                ));
                return self;
            }
            (None, Some(selector)) => {
                self.errors.push(format!(
                    "attribute `{name}`: selector `{selector}` given without a coercion type"
                ));
                return self;
            }
        };
        self.push(
            Attribute {
                name,
                comparable: options.comparable,
                predicate: options.predicate,
                namespace: None,
            },
            coercion,
        )
    }

    /// Declares an attribute that also answers [`Entity::is`].
    #[must_use]
    pub fn attr_predicate(self, name: impl Into<String>, options: AttributeOptions) -> Self {
        self.attr(name, options.predicate(true))
    }

    /// Declares several attributes sharing the same options.
    #[must_use]
    pub fn attrs<I, S>(self, names: I, options: AttributeOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .fold(self, |builder, name| builder.attr(name, options.clone()))
    }

    #[must_use]
    pub fn attrs_predicate<I, S>(self, names: I, options: AttributeOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attrs(names, options.predicate(true))
    }

    /// Declares a comparable attribute holding an entity of `schema`.
    /// Assigned values go through the nested schema's wrap.
    #[must_use]
    pub fn namespace(self, name: impl Into<String>, schema: &Arc<Schema>) -> Self {
        let name = name.into();
        let coercion = Coercion::new(Arc::new(Arc::clone(schema)), "wrap");
        self.push_coerced(
            Attribute {
                name,
                comparable: true,
                predicate: false,
                namespace: Some(Arc::clone(schema)),
            },
            coercion,
        )
    }

    /// Declares a namespace attribute together with its nested schema, named
    /// `<Parent>::<name>`.
    #[must_use]
    pub fn namespace_with<F>(mut self, name: impl Into<String>, declare: F) -> Self
    where
        F: FnOnce(SchemaBuilder) -> SchemaBuilder,
    {
        let name = name.into();
        let nested = declare(SchemaBuilder::new(format!("{}::{name}", self.name)));
        match nested.build() {
            Ok(schema) => self.namespace(name, &schema),
            Err(err) => {
                self.errors.push(format!("namespace `{name}`: {err}"));
                self
            }
        }
    }

    /// Declares an attribute holding a list of entities of `schema`; each
    /// element goes through the nested schema's wrap.
    #[must_use]
    pub fn list_of(self, name: impl Into<String>, schema: &Arc<Schema>) -> Self {
        self.attr(
            name,
            AttributeOptions::new().coerce_with(Arc::clone(schema), "wrap_each"),
        )
    }

    /// Registers a named constructor usable as a coercion selector and as a
    /// wrap rule target.
    #[must_use]
    pub fn constructor<F>(mut self, name: impl Into<String>, construct: F) -> Self
    where
        F: Fn(&Arc<Schema>, Value) -> ModelResult<Entity> + Send + Sync + 'static,
    {
        let name = name.into();
        if matches!(name.as_str(), "wrap" | "new" | "wrap_each") {
            self.errors
                .push(format!("constructor `{name}` shadows a built-in selector"));
            return self;
        }
        self.constructors.insert(name, Arc::new(construct));
        self
    }

    /// Appends a wrap rule: inputs matching `source` are handed to the named
    /// constructor. Rules are tried in declaration order.
    #[must_use]
    pub fn wrap_from(mut self, source: SourceType, constructor: impl Into<String>) -> Self {
        self.wrap_rules.push(WrapRule::new(source, constructor));
        self
    }

    #[must_use]
    pub fn validator<V>(mut self, validator: V) -> Self
    where
        V: Validator + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    #[must_use]
    pub const fn unknown_keys(mut self, policy: UnknownKeyPolicy) -> Self {
        self.unknown_keys = policy;
        self
    }

    /// Finishes the declaration.
    ///
    /// Fails with [`ModelError::Configuration`] listing every problem found
    /// while declaring.
    pub fn build(mut self) -> ModelResult<Arc<Schema>> {
        for rule in &self.wrap_rules {
            if !self.constructors.contains_key(rule.constructor()) {
                self.errors.push(format!(
                    "wrap rule for {} names unknown constructor `{}`",
                    rule.source().name(),
                    rule.constructor()
                ));
            }
        }
        if !self.errors.is_empty() {
            return Err(ModelError::Configuration(format!(
                "{}: {}",
                self.name,
                self.errors.join("; ")
            )));
        }

        let positions = self
            .attributes
            .iter()
            .enumerate()
            .map(|(idx, attr)| (attr.name.clone(), idx))
            .collect();
        Ok(Arc::new(Schema {
            name: self.name,
            attributes: self.attributes,
            positions,
            coercions: self.coercions,
            wrap_rules: self.wrap_rules,
            constructors: self.constructors,
            parent: self.parent,
            validator: self.validator,
            unknown_keys: self.unknown_keys,
        }))
    }

    fn push_coerced(mut self, attribute: Attribute, coercion: ModelResult<Coercion>) -> Self {
        match coercion {
            Ok(coercion) => self.push(attribute, Some(coercion)),
            Err(err) => {
                self.errors
                    .push(format!("attribute `{}`: {err}", attribute.name));
                self
            }
        }
    }

    fn push(mut self, attribute: Attribute, coercion: Option<Coercion>) -> Self {
        if self.attributes.iter().any(|a| a.name == attribute.name) {
            self.errors
                .push(format!("attribute `{}` declared twice", attribute.name));
            return self;
        }
        if let Some(coercion) = coercion {
            self.coercions.insert(attribute.name.clone(), coercion);
        }
        self.attributes.push(attribute);
        self
    }
}
