#![deny(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

/*!
Rust client for discovering services advertised with DNS-based Service
Discovery.

# Introduction

DNS-SD, as defined in [RFC 6763](https://tools.ietf.org/html/rfc6763),
publishes the instances of a service type with three kinds of records:

```text
_http._tcp.example.com.               60 IN PTR web 1._http._tcp.example.com.
_http._tcp.example.com.               60 IN PTR web 2._http._tcp.example.com.
web 1._http._tcp.example.com.         60 IN SRV 1 30 443 test1.example.com.
web 1._http._tcp.example.com.         60 IN TXT "path=/api" "tls"
web 2._http._tcp.example.com.         60 IN SRV 1 70 443 test2.example.com.
web 2._http._tcp.example.com.         60 IN TXT "path=/api" "tls"
```

The PTR records of the service type `_http._tcp.example.com` name its
instances. Every instance has exactly one SRV record, locating it, and exactly
one TXT record of `key=value` strings, describing it.

[`DnsSdClient::resolve_instance`] turns one instance name into a
[`ServiceInstance`]. [`DnsSdClient::discover`] enumerates and resolves every
instance of a service type, optionally narrowed by a [`Filter`] such as
[`not_one_of`]. [`DnsSdClient::select_instance`] picks one of the discovered
instances the way [RFC 2782](https://tools.ietf.org/html/rfc2782) intends:
among the instances with the lowest priority, each is chosen with a
probability proportional to its weight. In the example above, `web 1` would be
chosen 30% of the time and `web 2` 70% of the time.

Names are taken apart by the [`fqdn`] module.

# Alternative Resolvers and Selection Policies

The queries are answered by a [`DnsSdResolver`] and the selection is made by a
[`Policy`]; both can be replaced by implementing those traits.

The provided resolver backends are enabled by the following features:

- `hickory` (via [`hickory_resolver::Resolver`])

[`DnsSdResolver`]: resolver::DnsSdResolver
[`Policy`]: policy::Policy
[`Filter`]: client::Filter
[`not_one_of`]: client::not_one_of
*/

pub mod client;
pub use client::{not_one_of, policy, DnsSdClient, Error, InstanceError, RecordType};

pub mod fqdn;

mod instance;
pub use instance::ServiceInstance;

mod record;
pub use record::{SrvData, SrvRecord};

pub mod resolver;
