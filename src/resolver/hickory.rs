//! DNS-SD resolver backed by [`hickory_resolver`].

use super::DnsSdResolver;
use crate::SrvRecord;
use async_trait::async_trait;
use hickory_resolver::{
    name_server::ConnectionProvider,
    proto::rr::{rdata::SRV, RData, RecordType},
    Name, ResolveError, Resolver,
};

/// Builds a [`Name`] label by label, so instance names containing spaces or
/// other characters that are not valid in host names survive intact.
fn to_name(name: &str) -> Result<Name, ResolveError> {
    let labels = name
        .strip_suffix('.')
        .unwrap_or(name)
        .split('.')
        .map(str::as_bytes);
    Ok(Name::from_labels(labels)?)
}

/// The inverse of [`to_name`]: joins the raw labels without escaping, so the
/// result can be queried again and matches the name as it was published.
fn from_name(name: &Name) -> String {
    name.iter()
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(".")
}

/// Turns "this name has no such records" into an empty answer.
fn or_empty<T>(result: Result<Vec<T>, ResolveError>) -> Result<Vec<T>, ResolveError> {
    match result {
        Err(e) if e.is_no_records_found() || e.is_nx_domain() => {
            #[cfg(feature = "log")]
            tracing::trace!(%e, "No records found");
            Ok(Vec::new())
        }
        other => other,
    }
}

#[async_trait]
impl<P> DnsSdResolver for Resolver<P>
where
    P: ConnectionProvider,
{
    type Record = SRV;
    type Error = ResolveError;

    async fn get_ptr_records(&self, name: &str) -> Result<Vec<String>, Self::Error> {
        let lookup = self.lookup(to_name(name)?, RecordType::PTR).await;
        or_empty(lookup.map(|lookup| {
            lookup
                .iter()
                .filter_map(|rdata| match rdata {
                    RData::PTR(ptr) => Some(from_name(&ptr.0)),
                    _ => None,
                })
                .collect()
        }))
    }

    async fn get_srv_records(&self, name: &str) -> Result<Vec<Self::Record>, Self::Error> {
        let lookup = self.srv_lookup(to_name(name)?).await;
        or_empty(lookup.map(|lookup| lookup.into_iter().collect()))
    }

    async fn get_txt_records(&self, name: &str) -> Result<Vec<Vec<String>>, Self::Error> {
        let lookup = self.txt_lookup(to_name(name)?).await;
        or_empty(lookup.map(|lookup| {
            lookup
                .iter()
                .map(|txt| {
                    txt.txt_data()
                        .iter()
                        .map(|segment| String::from_utf8_lossy(segment).into_owned())
                        .collect()
                })
                .collect()
        }))
    }
}

impl SrvRecord for SRV {
    type Target = Name;

    fn target(&self) -> &Self::Target {
        self.target()
    }

    fn port(&self) -> u16 {
        self.port()
    }

    fn priority(&self) -> u16 {
        self.priority()
    }

    fn weight(&self) -> u16 {
        self.weight()
    }
}
