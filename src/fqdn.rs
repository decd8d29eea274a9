//! Parsing of DNS-SD shaped names.
//!
//! A service type is named `_<type>._<proto>.<domain>`, optionally qualified
//! by a subtype as `_<subtype>._sub._<type>._<proto>.<domain>`. An instance
//! of that service is named `<instance>._<type>._<proto>.<domain>`.
//!
//! Every component handed out by this module is a slice of the input, so
//! putting the components back together reproduces the input byte for byte.

use std::fmt::{self, Display};

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;
const SUBTYPE_MARKER: &str = "_sub";

/// Produced when a name does not have the DNS-SD shape an operation requires.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed DNS-SD name {name:?}: {reason}")]
pub struct MalformedName {
    /// The offending name.
    pub name: String,
    /// What is wrong with it.
    pub reason: &'static str,
}

impl MalformedName {
    pub(crate) fn new(name: &str, reason: &'static str) -> Self {
        Self {
            name: name.to_string(),
            reason,
        }
    }
}

/// Transport protocol label of a DNS-SD name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// `_tcp`
    Tcp,
    /// `_udp`
    Udp,
}

impl Protocol {
    /// The protocol without its leading underscore, i.e. `tcp` or `udp`.
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "_tcp" => Some(Protocol::Tcp),
            "_udp" => Some(Protocol::Udp),
            _ => None,
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Components of a service type or service instance name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fqdn<'a> {
    name: &'a str,
    service: &'a str,
    service_type: &'a str,
    protocol: Protocol,
    domain: &'a str,
    subtype: Option<&'a str>,
    instance: Option<&'a str>,
}

impl<'a> Fqdn<'a> {
    /// Splits `name` into its DNS-SD components.
    ///
    /// The protocol label is the *last* `_tcp` or `_udp` label of the name;
    /// the label before it is the service type and everything after it is
    /// the domain. Whatever precedes the service type is either a subtype
    /// qualifier (`_<subtype>._sub`) or an instance name.
    pub fn parse(name: &'a str) -> Result<Self, MalformedName> {
        let labels: Vec<&str> = name.split('.').collect();
        let (proto_idx, protocol) = labels
            .iter()
            .enumerate()
            .rev()
            .find_map(|(idx, label)| Protocol::from_label(label).map(|p| (idx, p)))
            .ok_or_else(|| MalformedName::new(name, "no _tcp or _udp label"))?;
        if proto_idx == 0 {
            return Err(MalformedName::new(
                name,
                "no service type label before the protocol label",
            ));
        }

        let type_label = labels[proto_idx - 1];
        let service_type = type_label
            .strip_prefix('_')
            .filter(|t| is_service_type_label(t))
            .ok_or_else(|| MalformedName::new(name, "service type label is not `_<type>`"))?;

        // Byte offsets: every label before the type label is followed by a dot.
        let prefix_len: usize = labels[..proto_idx - 1].iter().map(|l| l.len() + 1).sum();
        let domain_start = prefix_len + type_label.len() + 1 + labels[proto_idx].len() + 1;
        let domain = name
            .get(domain_start..)
            .ok_or_else(|| MalformedName::new(name, "missing domain"))?;
        validate_domain(name, domain)?;

        let service = &name[prefix_len..];
        let (subtype, instance) = match prefix_len {
            0 => (None, None),
            len => split_prefix(name, &name[..len - 1])?,
        };

        Ok(Self {
            name,
            service,
            service_type,
            protocol,
            domain,
            subtype,
            instance,
        })
    }

    /// The full name this was parsed from.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The `_<type>._<proto>.<domain>` part of the name.
    pub fn service(&self) -> &'a str {
        self.service
    }

    /// The service type, without its leading underscore.
    pub fn service_type(&self) -> &'a str {
        self.service_type
    }

    /// The transport protocol.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Everything after the protocol label.
    pub fn domain(&self) -> &'a str {
        self.domain
    }

    /// The subtype qualifier, without its leading underscore.
    pub fn subtype(&self) -> Option<&'a str> {
        self.subtype
    }

    /// Everything before `._<type>._<proto>.<domain>`, for instance names.
    pub fn instance(&self) -> Option<&'a str> {
        self.instance
    }

    /// Whether this names a service instance rather than a service type.
    pub fn is_instance(&self) -> bool {
        self.instance.is_some()
    }
}

impl Display for Fqdn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn split_prefix<'a>(
    name: &str,
    prefix: &'a str,
) -> Result<(Option<&'a str>, Option<&'a str>), MalformedName> {
    if let Some(qualifier) = prefix
        .strip_suffix(SUBTYPE_MARKER)
        .and_then(|p| p.strip_suffix('.'))
        .filter(|p| p.starts_with('_'))
    {
        let subtype = &qualifier[1..];
        if subtype.is_empty() || subtype.contains('.') {
            return Err(MalformedName::new(name, "subtype must be a single `_<subtype>` label"));
        }
        return Ok((Some(subtype), None));
    }

    if prefix
        .split('.')
        .any(|label| label.is_empty() || label.chars().any(char::is_control))
    {
        return Err(MalformedName::new(name, "empty or invalid instance label"));
    }
    Ok((None, Some(prefix)))
}

fn is_service_type_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() < MAX_LABEL_LEN
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

fn validate_domain(name: &str, domain: &str) -> Result<(), MalformedName> {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    if domain.is_empty() {
        return Err(MalformedName::new(name, "missing domain"));
    }
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(MalformedName::new(name, "domain is too long"));
    }
    for label in domain.split('.') {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return Err(MalformedName::new(name, "domain label is empty or too long"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(MalformedName::new(name, "domain label starts or ends with a hyphen"));
        }
        if !label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(MalformedName::new(name, "domain label contains invalid characters"));
        }
    }
    Ok(())
}

/// Returns the domain of a service type or instance name.
pub fn domain(fqdn: &str) -> Result<&str, MalformedName> {
    Fqdn::parse(fqdn).map(|f| f.domain())
}

/// Returns the protocol of a service type or instance name.
pub fn protocol(fqdn: &str) -> Result<Protocol, MalformedName> {
    Fqdn::parse(fqdn).map(|f| f.protocol())
}

/// Returns the service type of a service type or instance name, without the
/// leading underscore.
pub fn service_type(fqdn: &str) -> Result<&str, MalformedName> {
    Fqdn::parse(fqdn).map(|f| f.service_type())
}

/// Returns the instance part of an instance name, or `None` for a service
/// type name.
pub fn instance(fqdn: &str) -> Result<Option<&str>, MalformedName> {
    Fqdn::parse(fqdn).map(|f| f.instance())
}

/// Whether `fqdn` is a well-formed (possibly subtype-qualified) service type name.
pub fn is_service_type(fqdn: &str) -> bool {
    Fqdn::parse(fqdn).is_ok_and(|f| !f.is_instance())
}

/// Whether `fqdn` is a well-formed service instance name.
pub fn is_service_instance(fqdn: &str) -> bool {
    Fqdn::parse(fqdn).is_ok_and(|f| f.is_instance())
}
