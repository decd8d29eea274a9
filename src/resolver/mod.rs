//! DNS-SD resolvers.

use crate::record::SrvRecord;
use async_trait::async_trait;

#[cfg(feature = "hickory")]
pub mod hickory;

#[cfg(test)]
pub(crate) mod zone;

/// Represents the ability to answer the PTR, SRV and TXT queries DNS-SD
/// discovery is built on.
///
/// A name that does not exist, or that has no records of the queried type,
/// is answered with an empty list rather than an error. Errors are reserved
/// for lookups that could not be answered at all.
#[async_trait]
pub trait DnsSdResolver: Send + Sync {
    /// SRV record representation produced by the resolver.
    type Record: SrvRecord + Send;

    /// Errors encountered during resolution.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Gets the names a PTR query for `name` points to, i.e. the instances
    /// of a service type.
    async fn get_ptr_records(&self, name: &str) -> Result<Vec<String>, Self::Error>;

    /// Gets the SRV records of `name`.
    async fn get_srv_records(&self, name: &str) -> Result<Vec<Self::Record>, Self::Error>;

    /// Gets the TXT records of `name`, each as its list of character-strings.
    async fn get_txt_records(&self, name: &str) -> Result<Vec<Vec<String>>, Self::Error>;
}
