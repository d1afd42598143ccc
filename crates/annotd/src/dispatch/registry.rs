//! Action registry: descriptors, capability flags, and construction.
//!
//! Each action is described once, at startup, by an [`ActionDescriptor`]
//! holding its handler binding and its [`Capabilities`]. The registry built
//! from those descriptors is immutable and shared by every dispatch.
//!
//! Declaring parameters statically through [`ParamSpec`] means a handler can
//! never ask for variadic arguments, and attaching capabilities to the
//! descriptor means an action cannot require authentication without also
//! being registered.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::catalogue::{self, InvocationStyle};
use super::dispatcher::DISPATCH_TARGET;
use super::errors::ProtocolError;
use super::handler::{ExpandHandler, PositionalHandler};

/// Per-action behaviour flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    annotation: bool,
    logged: bool,
    requires_auth: bool,
}

impl Capabilities {
    /// No special handling.
    pub const NONE: Self = Self {
        annotation: false,
        logged: false,
        requires_auth: false,
    };

    /// Annotation-editing action: audit-logged and authenticated.
    pub const ANNOTATION: Self = Self {
        annotation: true,
        logged: true,
        requires_auth: true,
    };

    /// Returns these capabilities with audit logging enabled.
    #[must_use]
    pub const fn logged(self) -> Self {
        Self {
            logged: true,
            ..self
        }
    }

    /// Returns these capabilities with authentication required.
    #[must_use]
    pub const fn authenticated(self) -> Self {
        Self {
            requires_auth: true,
            ..self
        }
    }

    /// Whether the action edits annotations.
    pub const fn is_annotation(self) -> bool {
        self.annotation
    }

    /// Whether the action is bracketed by audit events.
    pub const fn is_logged(self) -> bool {
        self.logged
    }

    /// Whether the action needs an authenticated session.
    pub const fn requires_auth(self) -> bool {
        self.requires_auth
    }
}

/// Declared parameter of a positional handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    name: String,
    default: Option<Value>,
}

impl ParamSpec {
    /// A parameter the client must supply.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    /// A parameter that falls back to `default` when absent or null.
    pub fn optional(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }

    /// Request field the parameter is read from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fallback value, if any.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether the parameter has no fallback.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// How a handler receives its arguments.
#[derive(Clone)]
pub enum HandlerBinding {
    /// The handler receives the whole request mapping.
    Expand(Arc<dyn ExpandHandler>),
    /// The handler receives one value per declared parameter, in order.
    Positional {
        /// Declared parameters.
        params: Vec<ParamSpec>,
        /// Operation to call with the bound values.
        handler: Arc<dyn PositionalHandler>,
    },
}

impl HandlerBinding {
    /// Binds an expand-style handler.
    pub fn expand(handler: impl ExpandHandler + 'static) -> Self {
        Self::Expand(Arc::new(handler))
    }

    /// Binds a positional handler with its declared parameters.
    pub fn positional(params: Vec<ParamSpec>, handler: impl PositionalHandler + 'static) -> Self {
        Self::Positional {
            params,
            handler: Arc::new(handler),
        }
    }

    /// Invocation style of the binding.
    pub fn style(&self) -> InvocationStyle {
        match self {
            Self::Expand(_) => InvocationStyle::Expand,
            Self::Positional { .. } => InvocationStyle::Positional,
        }
    }

    fn params(&self) -> &[ParamSpec] {
        match self {
            Self::Expand(_) => &[],
            Self::Positional { params, .. } => params,
        }
    }
}

impl fmt::Debug for HandlerBinding {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expand(_) => formatter.write_str("Expand"),
            Self::Positional { params, .. } => formatter
                .debug_struct("Positional")
                .field("params", params)
                .finish_non_exhaustive(),
        }
    }
}

/// Immutable description of one action.
#[derive(Debug, Clone)]
pub struct ActionDescriptor {
    name: String,
    binding: HandlerBinding,
    capabilities: Capabilities,
}

impl ActionDescriptor {
    /// Describes an action with no special capabilities.
    pub fn new(name: impl Into<String>, binding: HandlerBinding) -> Self {
        Self {
            name: name.into(),
            binding,
            capabilities: Capabilities::NONE,
        }
    }

    /// Replaces the descriptor's capabilities.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Action name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handler binding.
    pub fn binding(&self) -> &HandlerBinding {
        &self.binding
    }

    /// Capability flags.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Whether the handler receives the whole request mapping.
    pub fn is_expand(&self) -> bool {
        self.binding.style() == InvocationStyle::Expand
    }
}

/// Errors raised while building the registry. All are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// An action name was empty.
    #[error("action names must not be empty")]
    EmptyActionName,
    /// Two descriptors used the same name.
    #[error("action \"{name}\" is registered twice")]
    DuplicateAction { name: String },
    /// A parameter name was empty.
    #[error("action \"{action}\" declares a parameter with an empty name")]
    EmptyParameterName { action: String },
    /// A parameter name appeared twice in one declaration.
    #[error("action \"{action}\" declares parameter \"{parameter}\" twice")]
    DuplicateParameter { action: String, parameter: String },
    /// The name is not part of the standard catalogue.
    #[error("\"{name}\" is not a standard action")]
    UnknownStandardAction { name: String },
    /// The binding style disagrees with the catalogue entry.
    #[error("standard action \"{name}\" must be bound as {expected}")]
    BindingMismatch {
        name: String,
        expected: InvocationStyle,
    },
}

/// Accumulates descriptors and validates them as they arrive.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    actions: HashMap<String, ActionDescriptor>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the name is empty or already taken, or
    /// when the parameter declaration repeats or omits a name.
    pub fn register(&mut self, descriptor: ActionDescriptor) -> Result<&mut Self, RegistryError> {
        validate_descriptor(&descriptor)?;
        if self.actions.contains_key(descriptor.name()) {
            return Err(RegistryError::DuplicateAction {
                name: descriptor.name.clone(),
            });
        }

        debug!(
            target: DISPATCH_TARGET,
            action = descriptor.name(),
            expand = descriptor.is_expand(),
            capabilities = ?descriptor.capabilities(),
            "registered action"
        );
        self.actions.insert(descriptor.name.clone(), descriptor);
        Ok(self)
    }

    /// Binds a handler to a standard action, taking flags from the catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownStandardAction`] for names outside the
    /// catalogue, [`RegistryError::BindingMismatch`] when the binding style
    /// differs from the catalogue entry, and any error from
    /// [`RegistryBuilder::register`].
    pub fn register_standard(
        &mut self,
        name: &str,
        binding: HandlerBinding,
    ) -> Result<&mut Self, RegistryError> {
        let Some(entry) = catalogue::standard_action(name) else {
            return Err(RegistryError::UnknownStandardAction {
                name: name.to_owned(),
            });
        };
        if binding.style() != entry.style {
            return Err(RegistryError::BindingMismatch {
                name: name.to_owned(),
                expected: entry.style,
            });
        }
        self.register(ActionDescriptor::new(entry.name, binding).with_capabilities(entry.capabilities))
    }

    /// Freezes the registry.
    pub fn build(self) -> ActionRegistry {
        ActionRegistry {
            actions: self.actions,
        }
    }
}

fn validate_descriptor(descriptor: &ActionDescriptor) -> Result<(), RegistryError> {
    if descriptor.name.is_empty() {
        return Err(RegistryError::EmptyActionName);
    }

    let mut seen = HashSet::new();
    for param in descriptor.binding.params() {
        if param.name.is_empty() {
            return Err(RegistryError::EmptyParameterName {
                action: descriptor.name.clone(),
            });
        }
        if !seen.insert(param.name.as_str()) {
            return Err(RegistryError::DuplicateParameter {
                action: descriptor.name.clone(),
                parameter: param.name.clone(),
            });
        }
    }
    Ok(())
}

/// Immutable table from action name to descriptor.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, ActionDescriptor>,
}

impl ActionRegistry {
    /// Starts building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Looks up an action.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAction`] carrying the attempted name.
    pub fn resolve(&self, name: &str) -> Result<&ActionDescriptor, ProtocolError> {
        self.actions
            .get(name)
            .ok_or_else(|| ProtocolError::invalid_action(name))
    }

    /// Whether `name` is a registered expand-style action.
    pub fn is_expand(&self, name: &str) -> bool {
        self.actions.get(name).is_some_and(ActionDescriptor::is_expand)
    }

    /// Whether `name` is a registered annotation-editing action.
    pub fn is_annotation_action(&self, name: &str) -> bool {
        self.capabilities(name).is_some_and(Capabilities::is_annotation)
    }

    /// Whether `name` is a registered audit-logged action.
    pub fn is_logged(&self, name: &str) -> bool {
        self.capabilities(name).is_some_and(Capabilities::is_logged)
    }

    /// Whether `name` is a registered action requiring authentication.
    pub fn requires_auth(&self, name: &str) -> bool {
        self.capabilities(name).is_some_and(Capabilities::requires_auth)
    }

    /// Registered action names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether no actions are registered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    fn capabilities(&self, name: &str) -> Option<Capabilities> {
        self.actions.get(name).map(ActionDescriptor::capabilities)
    }
}
