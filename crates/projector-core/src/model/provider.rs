use crate::model::types::{ValueType, format_params};
use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// ProviderId
///
/// Stable identifier of a provider, usually its type name.
///

#[derive(
    Clone, Debug, Deref, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProviderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

///
/// InvocationMode
///
/// How instances of a provider are obtained when one of its instance methods
/// is selected. The engine records the strategy; the host performs the lookup.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum InvocationMode {
    /// No instance can be obtained; only static methods are callable.
    Stateless,

    /// Instances are looked up by provider type.
    #[default]
    InstanceByType,

    /// Instances are looked up by a named component key.
    InstanceByName(String),
}

///
/// Receiver
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum Receiver {
    #[default]
    Static,
    Instance,
}

///
/// MethodSignature
///
/// One method exposed by a provider: name, ordered parameter types, return
/// type, and whether it needs a provider instance.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<ValueType>,
    pub returns: ValueType,

    #[serde(default)]
    pub receiver: Receiver,
}

impl MethodSignature {
    /// Build a static (stateless) method signature.
    #[must_use]
    pub fn stateless(
        name: impl Into<String>,
        params: impl IntoIterator<Item = ValueType>,
        returns: impl Into<ValueType>,
    ) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().collect(),
            returns: returns.into(),
            receiver: Receiver::Static,
        }
    }

    /// Build an instance-requiring method signature.
    #[must_use]
    pub fn instance(
        name: impl Into<String>,
        params: impl IntoIterator<Item = ValueType>,
        returns: impl Into<ValueType>,
    ) -> Self {
        Self {
            receiver: Receiver::Instance,
            ..Self::stateless(name, params, returns)
        }
    }

    #[must_use]
    pub const fn is_stateless(&self) -> bool {
        matches!(self.receiver, Receiver::Static)
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}({})",
            self.returns,
            self.name,
            format_params(&self.params)
        )?;
        if !self.is_stateless() {
            f.write_str(" [instance]")?;
        }

        Ok(())
    }
}

///
/// ProviderDescriptor
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProviderDescriptor {
    pub id: ProviderId,

    #[serde(default)]
    pub mode: InvocationMode,

    #[serde(default)]
    pub methods: Vec<MethodSignature>,
}

impl ProviderDescriptor {
    #[must_use]
    pub fn new(id: impl Into<ProviderId>, mode: InvocationMode) -> Self {
        Self {
            id: id.into(),
            mode,
            methods: Vec::new(),
        }
    }

    /// Provider whose instances are looked up by type.
    #[must_use]
    pub fn by_type(id: impl Into<ProviderId>) -> Self {
        Self::new(id, InvocationMode::InstanceByType)
    }

    /// Provider whose instances are looked up by a named component key.
    #[must_use]
    pub fn by_name(id: impl Into<ProviderId>, name: impl Into<String>) -> Self {
        Self::new(id, InvocationMode::InstanceByName(name.into()))
    }

    /// Provider that never yields an instance.
    #[must_use]
    pub fn stateless(id: impl Into<ProviderId>) -> Self {
        Self::new(id, InvocationMode::Stateless)
    }

    #[must_use]
    pub fn with_method(mut self, method: MethodSignature) -> Self {
        self.methods.push(method);
        self
    }

    /// Return whether `method` can be invoked through this provider at all.
    #[must_use]
    pub const fn can_invoke(&self, method: &MethodSignature) -> bool {
        method.is_stateless() || !matches!(self.mode, InvocationMode::Stateless)
    }

    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodSignature> {
        self.methods.iter().filter(move |method| method.name == name)
    }
}

///
/// ProviderRegistry
///
/// Providers in declaration order. Order is significant: method search is
/// first-match-wins across this list.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProviderRegistry {
    providers: Vec<ProviderDescriptor>,
}

impl ProviderRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, provider: ProviderDescriptor) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn push(&mut self, provider: ProviderDescriptor) {
        self.providers.push(provider);
    }

    // get
    // first declaration wins when an id is registered twice
    #[must_use]
    pub fn get(&self, id: &ProviderId) -> Option<&ProviderDescriptor> {
        self.providers.iter().find(|provider| &provider.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ProviderId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.iter()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<ProviderId> {
        self.providers
            .iter()
            .map(|provider| provider.id.clone())
            .collect()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl FromIterator<ProviderDescriptor> for ProviderRegistry {
    fn from_iter<I: IntoIterator<Item = ProviderDescriptor>>(iter: I) -> Self {
        Self {
            providers: iter.into_iter().collect(),
        }
    }
}
