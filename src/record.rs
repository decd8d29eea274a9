//! SRV records.

use std::fmt::Display;

use http::uri::Scheme;
use url::Url;

/// Representation of types that contain the fields of a SRV record.
pub trait SrvRecord {
    /// Type representing the SRV record's target. Must implement `Display` so
    /// it can be used to create a `Url`.
    type Target: Display + ?Sized;

    /// Gets a SRV record's target.
    fn target(&self) -> &Self::Target;

    /// Gets a SRV record's port.
    fn port(&self) -> u16;

    /// Gets a SRV record's priority.
    fn priority(&self) -> u16;

    /// Gets a SRV record's weight.
    fn weight(&self) -> u16;

    /// Parses a SRV record into a URL with a given scheme (e.g. https)
    fn parse(&self, scheme: Scheme) -> Result<Url, url::ParseError> {
        // Parse a placeholder URL and then set each part, so that a target
        // like `foo.com:123/bar` can't smuggle in its own port or path.
        let mut url = Url::parse("http://example.com")?;
        url.set_scheme(scheme.as_str())
            .map_err(|_| url::ParseError::RelativeUrlWithoutBase)?;
        let target = self.target().to_string();
        url.set_host(Some(target.trim_end_matches('.')))?;
        url.set_port(Some(self.port()))
            .map_err(|_| url::ParseError::SetHostOnCannotBeABaseUrl)?;

        Ok(url)
    }
}

impl<T: SrvRecord + ?Sized> SrvRecord for &T {
    type Target = T::Target;

    fn target(&self) -> &Self::Target {
        (**self).target()
    }

    fn port(&self) -> u16 {
        (**self).port()
    }

    fn priority(&self) -> u16 {
        (**self).priority()
    }

    fn weight(&self) -> u16 {
        (**self).weight()
    }
}

/// A plain SRV record, for resolvers that have no record type of their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SrvData {
    /// Host name of the target.
    pub target: String,
    /// Port the service listens on.
    pub port: u16,
    /// Priority; lower is preferred.
    pub priority: u16,
    /// Relative weight within a priority.
    pub weight: u16,
}

impl SrvRecord for SrvData {
    type Target = str;

    fn target(&self) -> &Self::Target {
        &self.target
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
