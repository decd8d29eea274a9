//! Clients based on DNS-SD lookups.

use crate::{
    fqdn::{Fqdn, MalformedName},
    resolver::DnsSdResolver,
    ServiceInstance, SrvRecord,
};
use futures_util::future::{join, join_all};
use std::fmt::{self, Display};

mod filter;
pub use filter::{not_one_of, Filter, KeepAll, NotOneOf};

/// Service instance selection policies.
pub mod policy;

/// DNS record types queried during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// Enumerates the instances of a service type.
    Ptr,
    /// Locates an instance.
    Srv,
    /// Describes an instance.
    Txt,
}

impl Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordType::Ptr => "PTR",
            RecordType::Srv => "SRV",
            RecordType::Txt => "TXT",
        })
    }
}

/// Errors encountered by a [`DnsSdClient`].
#[derive(Debug, thiserror::Error)]
pub enum Error<Lookup: std::error::Error + 'static> {
    /// A name does not have the DNS-SD shape the operation requires
    #[error(transparent)]
    MalformedName(#[from] MalformedName),
    /// The resolver could not enumerate the instances of a service type
    #[error("{record_type} lookup for {name:?} failed")]
    Lookup {
        /// Queried record type
        record_type: RecordType,
        /// Queried name
        name: String,
        /// Resolver error
        #[source]
        source: Lookup,
    },
    /// An instance could not be resolved
    #[error("service instance {instance:?} could not be resolved")]
    InstanceResolutionFailed {
        /// Name of the instance
        instance: String,
        /// Why it could not be resolved
        #[source]
        cause: InstanceError<Lookup>,
    },
    /// Discovery found no instances to select from
    #[error("no instance of {service_type:?} available")]
    NoInstanceAvailable {
        /// Service type that was discovered
        service_type: String,
    },
}

impl<Lookup: std::error::Error + 'static> Error<Lookup> {
    /// Why an instance could not be resolved, for
    /// [`Error::InstanceResolutionFailed`].
    pub fn instance_error(&self) -> Option<&InstanceError<Lookup>> {
        match self {
            Error::InstanceResolutionFailed { cause, .. } => Some(cause),
            _ => None,
        }
    }

    fn resolving(instance: &str, cause: InstanceError<Lookup>) -> Self {
        Error::InstanceResolutionFailed {
            instance: instance.to_string(),
            cause,
        }
    }
}

/// Why a single service instance could not be resolved.
#[derive(Debug, thiserror::Error)]
pub enum InstanceError<Lookup: std::error::Error + 'static> {
    /// The instance name does not have the DNS-SD shape
    #[error(transparent)]
    MalformedName(#[from] MalformedName),
    /// The resolver could not answer a query
    #[error("{record_type} lookup for {name:?} failed")]
    Lookup {
        /// Queried record type
        record_type: RecordType,
        /// Queried name
        name: String,
        /// Resolver error
        #[source]
        source: Lookup,
    },
    /// The instance has no records of a type it needs
    #[error("no {record_type} record for {name:?}")]
    RecordNotFound {
        /// Queried record type
        record_type: RecordType,
        /// Queried name
        name: String,
    },
    /// The instance has more than the one SRV or TXT record DNS-SD allows
    #[error("more than 1 {record_type} record for {name:?} ({count} found)")]
    AmbiguousRecord {
        /// Queried record type
        record_type: RecordType,
        /// Queried name
        name: String,
        /// Number of records found
        count: usize,
    },
    /// The SRV record says the service is not offered there: port 0 or target `.`
    #[error("SRV record for {name:?} marks the service unavailable (target {target:?}, port {port})")]
    Unavailable {
        /// Queried name
        name: String,
        /// SRV target
        target: String,
        /// SRV port
        port: u16,
    },
}

/// Client for discovering and selecting instances of DNS-SD services.
///
/// # Usage
///
/// After being created by [`DnsSdClient::new`] or
/// [`DnsSdClient::new_with_resolver`], a client can resolve single instances
/// with [`resolve_instance`], list the instances of a service type with
/// [`discover`], or pick one of them with [`select_instance`].
///
/// ## DNS Resolvers
///
/// PTR, SRV and TXT queries are answered by a client's [`DnsSdResolver`],
/// which can be set with [`DnsSdClient::resolver`].
///
/// ## Instance Selection Policies
///
/// Which instance is selected is determined by a client's [`Policy`],
/// and can be set with [`DnsSdClient::policy`].
///
/// [`resolve_instance`]: DnsSdClient::resolve_instance()
/// [`discover`]: DnsSdClient::discover()
/// [`select_instance`]: DnsSdClient::select_instance()
/// [`Policy`]: policy::Policy
#[derive(Debug, Default)]
pub struct DnsSdClient<Resolver, Policy: policy::Policy = policy::Rfc2782> {
    resolver: Resolver,
    policy: Policy,
}

impl<Resolver: Default, Policy: policy::Policy + Default> DnsSdClient<Resolver, Policy> {
    /// Creates a new client with a default resolver.
    pub fn new() -> Self {
        Self::new_with_resolver(Resolver::default())
    }
}

impl<Resolver, Policy: policy::Policy + Default> DnsSdClient<Resolver, Policy> {
    /// Creates a new client that queries `resolver`.
    pub fn new_with_resolver(resolver: Resolver) -> Self {
        Self {
            resolver,
            policy: Default::default(),
        }
    }
}

impl<Resolver: DnsSdResolver, Policy: policy::Policy> DnsSdClient<Resolver, Policy> {
    /// Resolves the SRV and TXT records of the instance named `instance`.
    ///
    /// Both queries are in flight at once. The instance must have exactly one
    /// SRV and exactly one TXT record, and the SRV record must not mark the
    /// service unavailable; any other answer, or a failed query, is reported
    /// as [`Error::InstanceResolutionFailed`].
    pub async fn resolve_instance(
        &self,
        instance: &str,
    ) -> Result<ServiceInstance, Error<Resolver::Error>> {
        let name = Fqdn::parse(instance)?;
        if !name.is_instance() {
            return Err(MalformedName::new(instance, "not a service instance name").into());
        }
        self.lookup_instance(&name)
            .await
            .map_err(|cause| Error::resolving(instance, cause))
    }

    async fn lookup_instance(
        &self,
        name: &Fqdn<'_>,
    ) -> Result<ServiceInstance, InstanceError<Resolver::Error>> {
        let (srv, txt) = join(
            self.resolver.get_srv_records(name.name()),
            self.resolver.get_txt_records(name.name()),
        )
        .await;
        let srv = exactly_one(name.name(), RecordType::Srv, srv);
        let txt = exactly_one(name.name(), RecordType::Txt, txt);
        let (srv, txt) = (srv?, txt?);

        let target = srv.target().to_string();
        if srv.port() == 0 || target.trim_end_matches('.').is_empty() {
            return Err(InstanceError::Unavailable {
                name: name.name().to_string(),
                target,
                port: srv.port(),
            });
        }

        Ok(ServiceInstance::new(name, &srv, txt))
    }

    /// Resolves an instance named in a PTR answer, attributing every failure,
    /// including a malformed name, to that instance.
    async fn resolve_candidate(
        &self,
        instance: &str,
    ) -> Result<ServiceInstance, Error<Resolver::Error>> {
        let resolved = match Fqdn::parse(instance) {
            Ok(name) if name.is_instance() => self.lookup_instance(&name).await,
            Ok(_) => Err(MalformedName::new(instance, "not a service instance name").into()),
            Err(e) => Err(e.into()),
        };

        match resolved {
            Ok(resolved) => {
                #[cfg(feature = "log")]
                tracing::trace!(
                    instance,
                    host = resolved.host(),
                    port = resolved.port(),
                    "Resolved service instance"
                );
                Ok(resolved)
            }
            Err(cause) => {
                #[cfg(feature = "log")]
                tracing::debug!(instance, error = %cause, "Failed to resolve service instance");
                Err(Error::resolving(instance, cause))
            }
        }
    }

    /// Discovers every instance of `service_type`.
    ///
    /// `service_type` may be qualified by a subtype
    /// (`_<subtype>._sub._<type>._<proto>.<domain>`). A service type without
    /// any instances yields an empty list.
    pub async fn discover(
        &self,
        service_type: &str,
    ) -> Result<Vec<ServiceInstance>, Error<Resolver::Error>> {
        self.discover_filtered(service_type, KeepAll).await
    }

    /// Discovers the instances of `service_type` that `filter` keeps.
    ///
    /// Instances are filtered by name before they are resolved, then all of
    /// them are resolved concurrently. If any of them fails to resolve, the
    /// whole discovery fails with the first failure in PTR answer order.
    /// Instances are returned in PTR answer order.
    pub async fn discover_filtered(
        &self,
        service_type: &str,
        filter: impl Filter,
    ) -> Result<Vec<ServiceInstance>, Error<Resolver::Error>> {
        if Fqdn::parse(service_type)?.is_instance() {
            return Err(MalformedName::new(service_type, "not a service type name").into());
        }

        let candidates = self
            .resolver
            .get_ptr_records(service_type)
            .await
            .map_err(|source| Error::Lookup {
                record_type: RecordType::Ptr,
                name: service_type.to_string(),
                source,
            })?;
        #[cfg(feature = "log")]
        tracing::trace!(service_type, found = candidates.len(), "Enumerated service instances");

        let candidates: Vec<String> = candidates
            .into_iter()
            .filter(|candidate| filter.keep(candidate))
            .collect();

        let resolved = join_all(
            candidates
                .iter()
                .map(|candidate| self.resolve_candidate(candidate)),
        )
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

        #[cfg(feature = "log")]
        tracing::debug!(
            service_type,
            resolved = resolved.len(),
            "Discovered service instances"
        );

        Ok(resolved)
    }

    /// Discovers the instances of `service_type` and selects one of them with
    /// the client's [`Policy`](policy::Policy).
    pub async fn select_instance(
        &self,
        service_type: &str,
    ) -> Result<ServiceInstance, Error<Resolver::Error>> {
        self.select_instance_filtered(service_type, KeepAll).await
    }

    /// Discovers the instances of `service_type` that `filter` keeps and
    /// selects one of them with the client's [`Policy`](policy::Policy).
    pub async fn select_instance_filtered(
        &self,
        service_type: &str,
        filter: impl Filter,
    ) -> Result<ServiceInstance, Error<Resolver::Error>> {
        let mut instances = self.discover_filtered(service_type, filter).await?;
        let selected = self
            .policy
            .select(&instances, &mut rand::rng())
            .ok_or_else(|| Error::NoInstanceAvailable {
                service_type: service_type.to_string(),
            })?;

        let instance = instances.swap_remove(selected);
        #[cfg(feature = "log")]
        tracing::debug!(
            service_type,
            instance = instance.instance(),
            "Selected service instance"
        );
        Ok(instance)
    }

    /// Discovers the instances of `service_type` that `filter` keeps, in the
    /// order they should be tried: lowest priority first, then weighted
    /// random order within a priority.
    pub async fn ordered_instances(
        &self,
        service_type: &str,
        filter: impl Filter,
    ) -> Result<Vec<ServiceInstance>, Error<Resolver::Error>> {
        let instances = self.discover_filtered(service_type, filter).await?;
        let order = self.policy.order(&instances, &mut rand::rng());
        let mut slots: Vec<Option<ServiceInstance>> = instances.into_iter().map(Some).collect();
        Ok(order
            .into_iter()
            .filter_map(|idx| slots.get_mut(idx).and_then(Option::take))
            .collect())
    }
}

fn exactly_one<T, E: std::error::Error + 'static>(
    name: &str,
    record_type: RecordType,
    answer: Result<Vec<T>, E>,
) -> Result<T, InstanceError<E>> {
    let mut records = answer.map_err(|source| InstanceError::Lookup {
        record_type,
        name: name.to_string(),
        source,
    })?;
    match records.len() {
        0 => Err(InstanceError::RecordNotFound {
            record_type,
            name: name.to_string(),
        }),
        1 => records.pop().ok_or_else(|| InstanceError::RecordNotFound {
            record_type,
            name: name.to_string(),
        }),
        count => Err(InstanceError::AmbiguousRecord {
            record_type,
            name: name.to_string(),
            count,
        }),
    }
}

impl<Resolver, Policy: policy::Policy> DnsSdClient<Resolver, Policy> {
    /// Sets the resolver of the client.
    pub fn resolver<R>(self, resolver: R) -> DnsSdClient<R, Policy> {
        DnsSdClient {
            resolver,
            policy: self.policy,
        }
    }

    /// Sets the policy of the client.
    pub fn policy<P: policy::Policy>(self, policy: P) -> DnsSdClient<Resolver, P> {
        DnsSdClient {
            policy,
            resolver: self.resolver,
        }
    }
}
