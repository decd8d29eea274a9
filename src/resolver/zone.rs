//! In-memory zone for exercising discovery without a network.

use super::DnsSdResolver;
use crate::record::SrvData;
use async_trait::async_trait;
use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

pub(crate) const POSTFIX: &str = "._tcp.dns-sd-lookup.toryt.org";

#[derive(Debug, thiserror::Error)]
#[error("server failure for {0}")]
pub(crate) struct ServFail(pub String);

/// A zone keyed by lower-cased owner name, so lookups are case-insensitive.
#[derive(Debug, Default)]
pub(crate) struct Zone {
    ptr: HashMap<String, Vec<String>>,
    srv: HashMap<String, Vec<SrvData>>,
    txt: HashMap<String, Vec<Vec<String>>>,
    failing: HashSet<String>,
    queries: Mutex<Vec<String>>,
}

impl Zone {
    pub fn ptr(mut self, service: &str, instance: &str) -> Self {
        self.ptr
            .entry(service.to_ascii_lowercase())
            .or_default()
            .push(instance.to_string());
        self
    }

    pub fn srv(self, instance: &str, priority: u16, weight: u16) -> Self {
        let host = format!("host{}.example.com", self.srv.len());
        self.srv_at(instance, &host, 443, priority, weight)
    }

    pub fn srv_at(
        mut self,
        instance: &str,
        target: &str,
        port: u16,
        priority: u16,
        weight: u16,
    ) -> Self {
        self.srv
            .entry(instance.to_ascii_lowercase())
            .or_default()
            .push(SrvData {
                target: target.to_string(),
                port,
                priority,
                weight,
            });
        self
    }

    pub fn txt(mut self, instance: &str, segments: &[&str]) -> Self {
        self.txt
            .entry(instance.to_ascii_lowercase())
            .or_default()
            .push(segments.iter().map(|s| s.to_string()).collect());
        self
    }

    /// A complete instance: PTR from its type, one SRV and one TXT record.
    pub fn instance(self, service: &str, instance: &str, priority: u16, weight: u16) -> Self {
        let name = format!("{instance}.{service}");
        self.ptr(service, &name)
            .srv(&name, priority, weight)
            .txt(&name, &["txtvers=1", &format!("name={instance}")])
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_ascii_lowercase());
        self
    }

    /// Every name queried so far, prefixed by its record type.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    fn answer<T: Clone>(
        &self,
        kind: &str,
        records: &HashMap<String, Vec<T>>,
        name: &str,
    ) -> Result<Vec<T>, ServFail> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(format!("{kind} {name}"));
        }
        let key = name.to_ascii_lowercase();
        if self.failing.contains(&key) {
            return Err(ServFail(name.to_string()));
        }
        Ok(records.get(&key).cloned().unwrap_or_default())
    }

    /// The zone the selection and discovery tests run against.
    pub fn fixture() -> Self {
        let t = |name: &str| format!("_{name}{POSTFIX}");
        let zone = Zone::default()
            .instance(&t("t1i-no-sub"), "Instance 1", 0, 0)
            // two TXT records
            .instance(&t("t2i-2-txt"), "Instance 2", 0, 0)
            .txt(&format!("Instance 2.{}", t("t2i-2-txt")), &["second=txt"])
            // two SRV records
            .instance(&t("t3i-2-srv"), "Instance 3", 0, 0)
            .srv(&format!("Instance 3.{}", t("t3i-2-srv")), 0, 0)
            // both
            .instance(&t("t4i-2-txt-srv"), "Instance 4", 0, 0)
            .srv(&format!("Instance 4.{}", t("t4i-2-txt-srv")), 0, 0)
            .txt(&format!("Instance 4.{}", t("t4i-2-txt-srv")), &["second=txt"])
            // missing TXT
            .ptr(&t("t5i-no-txt"), &format!("Instance 5.{}", t("t5i-no-txt")))
            .srv(&format!("Instance 5.{}", t("t5i-no-txt")), 0, 0)
            // missing SRV
            .ptr(&t("t6i-no-srv"), &format!("Instance 6.{}", t("t6i-no-srv")))
            .txt(&format!("Instance 6.{}", t("t6i-no-srv")), &["txtvers=1"])
            // subtype enumeration points at an instance of the plain type
            .instance(&t("t7i-sub"), "Instance 7", 0, 0)
            .ptr(
                &format!("_subtype._sub.{}", t("t7i-sub")),
                &format!("Instance 7.{}", t("t7i-sub")),
            );

        let five = t("t8i-5inst");
        let zone = [("8a", 1, 0), ("8b", 2, 5), ("8c", 3, 30), ("8d", 3, 70), ("8e", 4, 100)]
            .into_iter()
            .fold(zone, |zone, (suffix, priority, weight)| {
                zone.instance(&five, &format!("Instance {suffix}"), priority, weight)
            });

        let twelve = t("t9i-12inst");
        (1..=12).fold(zone, |zone, n| {
            zone.instance(&twelve, &format!("Instance 9-{n}"), 0, 10)
        })
    }
}

#[async_trait]
impl DnsSdResolver for Zone {
    type Record = SrvData;
    type Error = ServFail;

    async fn get_ptr_records(&self, name: &str) -> Result<Vec<String>, Self::Error> {
        self.answer("PTR", &self.ptr, name)
    }

    async fn get_srv_records(&self, name: &str) -> Result<Vec<Self::Record>, Self::Error> {
        self.answer("SRV", &self.srv, name)
    }

    async fn get_txt_records(&self, name: &str) -> Result<Vec<Vec<String>>, Self::Error> {
        self.answer("TXT", &self.txt, name)
    }
}
