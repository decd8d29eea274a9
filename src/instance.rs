//! Resolved service instances.

use std::collections::BTreeMap;

use http::uri::Scheme;
use url::Url;

use crate::{fqdn::Fqdn, SrvRecord};

/// A service instance, built from the SRV and TXT records of its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInstance {
    service_type: String,
    instance: String,
    host: String,
    port: u16,
    priority: u16,
    weight: u16,
    details: BTreeMap<String, String>,
}

impl ServiceInstance {
    /// Builds an instance from its parsed name, its SRV record and the
    /// character-strings of its TXT record.
    pub(crate) fn new<R, S>(name: &Fqdn<'_>, srv: &R, txt: impl IntoIterator<Item = S>) -> Self
    where
        R: SrvRecord,
        S: AsRef<str>,
    {
        Self {
            service_type: format!(
                "_{}._{}.{}",
                name.service_type(),
                name.protocol(),
                name.domain()
            ),
            instance: name.name().to_string(),
            host: srv.target().to_string(),
            port: srv.port(),
            priority: srv.priority(),
            weight: srv.weight(),
            details: parse_details(txt),
        }
    }

    /// The service type this is an instance of, as `_<type>._<proto>.<domain>`.
    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    /// The full instance name.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Host the instance runs on.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port the instance listens on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// SRV priority; lower is preferred.
    pub fn priority(&self) -> u16 {
        self.priority
    }

    /// SRV weight, relative to the other instances with the same priority.
    pub fn weight(&self) -> u16 {
        self.weight
    }

    /// Key/value pairs from the TXT record.
    pub fn details(&self) -> &BTreeMap<String, String> {
        &self.details
    }

    /// Looks up one TXT key.
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }

    /// The instance's address as a URL with the given scheme.
    pub fn url(&self, scheme: Scheme) -> Result<Url, url::ParseError> {
        self.parse(scheme)
    }
}

impl SrvRecord for ServiceInstance {
    type Target = str;

    fn target(&self) -> &Self::Target {
        &self.host
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn priority(&self) -> u16 {
        self.priority
    }

    fn weight(&self) -> u16 {
        self.weight
    }
}

/// Folds TXT character-strings into a map. A string is split on its first
/// `=`; one without `=` is a key with an empty value. Later keys overwrite
/// earlier ones. Empty strings and empty keys carry nothing and are skipped.
pub(crate) fn parse_details<S: AsRef<str>>(
    segments: impl IntoIterator<Item = S>,
) -> BTreeMap<String, String> {
    segments
        .into_iter()
        .fold(BTreeMap::new(), |mut details, segment| {
            let (key, value) = segment
                .as_ref()
                .split_once('=')
                .unwrap_or((segment.as_ref(), ""));
            if !key.is_empty() {
                details.insert(key.to_string(), value.to_string());
            }
            details
        })
}
