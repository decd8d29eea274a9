/// Decides which discovered instances are worth resolving.
///
/// Filters see the instance name from the PTR answer and run before any SRV
/// or TXT query is made for it.
pub trait Filter {
    /// Whether the instance named `instance` should be kept.
    fn keep(&self, instance: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Filter for F {
    fn keep(&self, instance: &str) -> bool {
        self(instance)
    }
}

/// Keeps every instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAll;

impl Filter for KeepAll {
    fn keep(&self, _instance: &str) -> bool {
        true
    }
}

/// Keeps instances that are not in an exclusion list. See [`not_one_of`].
#[derive(Debug, Clone, Default)]
pub struct NotOneOf {
    excluded: Vec<String>,
}

impl Filter for NotOneOf {
    fn keep(&self, instance: &str) -> bool {
        !self
            .excluded
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(instance))
    }
}

/// Creates a filter that drops every instance named in `excluded`.
///
/// Names are compared case-insensitively, as DNS does.
pub fn not_one_of<I>(excluded: I) -> NotOneOf
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    NotOneOf {
        excluded: excluded.into_iter().map(Into::into).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANDIDATE: &str = "candidate instance._type._tcp.dns-sd-lookup.toryt.org";

    #[test]
    fn empty_exclusions_keep_everything() {
        assert!(not_one_of(Vec::<String>::new()).keep(CANDIDATE));
        assert!(KeepAll.keep(CANDIDATE));
    }

    #[test]
    fn keeps_names_not_listed() {
        let filter = not_one_of([
            "death instance 1._type._tcp.dns-sd-lookup.toryt.org",
            "death instance 2._type._tcp.dns-sd-lookup.toryt.org",
        ]);
        assert!(filter.keep(CANDIDATE));
    }

    #[test]
    fn drops_listed_names_ignoring_case() {
        let filter = not_one_of([
            "death instance 1._type._tcp.dns-sd-lookup.toryt.org",
            "Candidate Instance._type._TCP.dns-sd-lookup.toryt.org",
        ]);
        assert!(!filter.keep(CANDIDATE));
    }

    #[test]
    fn closures_are_filters() {
        let filter = |name: &str| name.starts_with("candidate");
        assert!(filter.keep(CANDIDATE));
        assert!(!filter.keep("other._type._tcp.example.com"));
    }
}
