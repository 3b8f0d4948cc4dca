use crate::model::{
    directive::MethodRef,
    provider::{InvocationMode, MethodSignature, ProviderDescriptor, ProviderId, ProviderRegistry},
    types::{ValueType, format_params},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

///
/// MethodError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum MethodError {
    /// Neither an explicit name nor a naming convention is available.
    #[error("no method name given and no naming convention applies")]
    NameRequired,

    #[error("{}", format_not_found(.expected, .searched, .candidates))]
    NotFound {
        expected: ExpectedSignature,
        searched: Vec<ProviderId>,
        candidates: Vec<Candidate>,
    },

    #[error(
        "provider '{provider}' not found; available providers: {}",
        format_ids(.available)
    )]
    ProviderNotRegistered {
        provider: ProviderId,
        available: Vec<ProviderId>,
    },
}

fn format_ids(ids: &[ProviderId]) -> String {
    if ids.is_empty() {
        return "(none)".to_string();
    }

    ids.iter()
        .map(ProviderId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_not_found(
    expected: &ExpectedSignature,
    searched: &[ProviderId],
    candidates: &[Candidate],
) -> String {
    let mut out = format!(
        "method '{}' not found in any provider; searched in: {}; expected signature: {expected}",
        expected.name,
        format_ids(searched)
    );
    for candidate in candidates {
        out.push_str(&format!(
            "; found in {} but with wrong signature: {}",
            candidate.provider, candidate.signature
        ));
    }

    out
}

///
/// ReturnConstraint
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ReturnConstraint {
    /// Any return type is accepted; a later stage checks compatibility.
    Any,

    /// The return type must be assignable to this type.
    AssignableTo(ValueType),
}

impl ReturnConstraint {
    fn accepts(&self, returns: &ValueType, numeric_widening: bool) -> bool {
        match self {
            Self::Any => true,
            Self::AssignableTo(target) => returns.is_assignable_to(target, numeric_widening),
        }
    }
}

///
/// ReceiverFilter
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum ReceiverFilter {
    /// Any method the provider can actually invoke.
    #[default]
    Any,

    StatelessOnly,

    /// Instance methods only, whatever the provider's invocation mode.
    /// Diagnostic lookups use this to name a method that exists but needs
    /// an instance.
    InstanceOnly,
}

///
/// ExpectedSignature
///
/// The signature a query is looking for, kept for diagnostics.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ExpectedSignature {
    pub name: String,
    pub params: Vec<ValueType>,
    pub returns: ReturnConstraint,
}

impl fmt::Display for ExpectedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.returns {
            ReturnConstraint::Any => f.write_str("_")?,
            ReturnConstraint::AssignableTo(ty) => write!(f, "{ty}")?,
        }

        write!(f, " {}({})", self.name, format_params(&self.params))
    }
}

///
/// Candidate
///
/// Method with the wanted name that did not match, reported as a near miss.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Candidate {
    pub provider: ProviderId,
    pub signature: MethodSignature,
}

///
/// Invocation
///
/// How a resolved method is called. Instance strategies name the lookup the
/// host must perform; the engine never performs it.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Invocation {
    Stateless,
    InstanceByType(ProviderId),
    InstanceByName(String),
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stateless => f.write_str("stateless"),
            Self::InstanceByType(provider) => write!(f, "instance by type {provider}"),
            Self::InstanceByName(name) => write!(f, "instance by name '{name}'"),
        }
    }
}

///
/// ResolvedMethod
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ResolvedMethod {
    pub provider: ProviderId,
    pub signature: MethodSignature,
    pub invocation: Invocation,
}

impl ResolvedMethod {
    #[must_use]
    pub const fn returns(&self) -> &ValueType {
        &self.signature.returns
    }

    #[must_use]
    pub const fn is_stateless(&self) -> bool {
        matches!(self.invocation, Invocation::Stateless)
    }
}

impl fmt::Display for ResolvedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}({}) -> {} [{}]",
            self.provider,
            self.signature.name,
            format_params(&self.signature.params),
            self.signature.returns,
            self.invocation
        )
    }
}

///
/// MethodQuery
///
/// Everything the resolver needs for one lookup. The caller owns the naming
/// convention: computation lookups pass one, transformation lookups do not.
///

#[derive(Clone, Debug)]
pub struct MethodQuery<'a> {
    pub method_ref: Option<&'a MethodRef>,
    pub convention: Option<&'a str>,
    pub params: &'a [ValueType],
    pub returns: ReturnConstraint,
    pub receivers: ReceiverFilter,
    pub numeric_widening: bool,
}

impl<'a> MethodQuery<'a> {
    #[must_use]
    pub const fn new(params: &'a [ValueType], returns: ReturnConstraint) -> Self {
        Self {
            method_ref: None,
            convention: None,
            params,
            returns,
            receivers: ReceiverFilter::Any,
            numeric_widening: false,
        }
    }

    #[must_use]
    pub const fn method_ref(mut self, method_ref: Option<&'a MethodRef>) -> Self {
        self.method_ref = method_ref;
        self
    }

    #[must_use]
    pub const fn convention(mut self, name: &'a str) -> Self {
        self.convention = Some(name);
        self
    }

    #[must_use]
    pub const fn receivers(mut self, receivers: ReceiverFilter) -> Self {
        self.receivers = receivers;
        self
    }

    #[must_use]
    pub const fn numeric_widening(mut self, enabled: bool) -> Self {
        self.numeric_widening = enabled;
        self
    }

    // The explicit name wins over the convention.
    fn target_name(&self) -> Option<&'a str> {
        self.method_ref
            .and_then(MethodRef::name)
            .or(self.convention)
    }

    fn matches(&self, provider: &ProviderDescriptor, method: &MethodSignature) -> bool {
        let receiver_fits = match self.receivers {
            ReceiverFilter::Any => provider.can_invoke(method),
            ReceiverFilter::StatelessOnly => method.is_stateless(),
            ReceiverFilter::InstanceOnly => !method.is_stateless(),
        };

        receiver_fits
            && method.params.as_slice() == self.params
            && self.returns.accepts(&method.returns, self.numeric_widening)
    }
}

/// Resolve one computation or transformation method, first match wins.
///
/// With a provider override only that provider is searched; otherwise every
/// provider is scanned in declaration order, and within a provider its methods
/// in declaration order. The first method whose name, exact parameter list,
/// return type, and receiver all fit is returned with its invocation strategy.
pub fn resolve_method(
    providers: &ProviderRegistry,
    query: &MethodQuery<'_>,
) -> Result<ResolvedMethod, MethodError> {
    let name = query.target_name().ok_or(MethodError::NameRequired)?;

    let scope: Vec<&ProviderDescriptor> = match query.method_ref.and_then(MethodRef::provider) {
        Some(id) => {
            let provider = providers
                .get(id)
                .ok_or_else(|| MethodError::ProviderNotRegistered {
                    provider: id.clone(),
                    available: providers.ids(),
                })?;
            vec![provider]
        }
        None => providers.iter().collect(),
    };

    let mut candidates = Vec::new();
    for provider in &scope {
        for method in provider.methods_named(name) {
            if query.matches(provider, method) {
                tracing::trace!(
                    provider = %provider.id,
                    method = %method,
                    "method matched"
                );

                return Ok(ResolvedMethod {
                    provider: provider.id.clone(),
                    signature: method.clone(),
                    invocation: invocation_for(provider, method),
                });
            }

            candidates.push(Candidate {
                provider: provider.id.clone(),
                signature: method.clone(),
            });
        }
        tracing::trace!(provider = %provider.id, name, "no match in provider");
    }

    Err(MethodError::NotFound {
        expected: ExpectedSignature {
            name: name.to_string(),
            params: query.params.to_vec(),
            returns: query.returns.clone(),
        },
        searched: scope.iter().map(|provider| provider.id.clone()).collect(),
        candidates,
    })
}

// Stateless methods are called directly whatever the provider's mode;
// instance methods follow the provider's lookup strategy.
fn invocation_for(provider: &ProviderDescriptor, method: &MethodSignature) -> Invocation {
    if method.is_stateless() {
        return Invocation::Stateless;
    }

    match &provider.mode {
        InvocationMode::InstanceByName(name) => Invocation::InstanceByName(name.clone()),
        InvocationMode::InstanceByType | InvocationMode::Stateless => {
            Invocation::InstanceByType(provider.id.clone())
        }
    }
}
