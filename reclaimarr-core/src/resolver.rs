use std::collections::HashMap;

use tracing::debug;

/// Cross-system identity resolution: map a media-server title to the
/// matching library-manager id.
///
/// Title joins across three independent systems are inherently fragile
/// (duplicates, punctuation and case drift), so the strategy sits behind
/// this trait rather than being baked into the snapshot builder.
pub trait TitleResolver: Send + Sync {
    fn resolve(&self, title: &str) -> Option<i64>;

    /// Whether the resolver actually holds manager data. When this is
    /// false a miss means "manager unavailable", not "confirmed not
    /// monitored", and callers should log the two cases differently.
    fn has_data(&self) -> bool;
}

/// Exact, case-sensitive title matching over a prefetched manager index.
#[derive(Debug, Default)]
pub struct ExactTitleResolver {
    ids: HashMap<String, i64>,
    populated: bool,
}

impl ExactTitleResolver {
    pub fn new(entries: impl IntoIterator<Item = (String, i64)>) -> Self {
        let ids: HashMap<String, i64> = entries.into_iter().collect();
        let populated = !ids.is_empty();
        Self { ids, populated }
    }

    /// Resolver for when the manager could not be queried at all.
    pub fn unavailable() -> Self {
        Self::default()
    }
}

impl TitleResolver for ExactTitleResolver {
    fn resolve(&self, title: &str) -> Option<i64> {
        let id = self.ids.get(title).copied();
        if id.is_none() && self.populated {
            debug!("Title '{title}' has no manager entry (not monitored)");
        }
        id
    }

    fn has_data(&self) -> bool {
        self.populated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_are_exact_and_case_sensitive() {
        let resolver =
            ExactTitleResolver::new([("The Wire".to_string(), 4), ("Oz".to_string(), 9)]);

        assert_eq!(resolver.resolve("The Wire"), Some(4));
        assert_eq!(resolver.resolve("the wire"), None);
        assert_eq!(resolver.resolve("The Wire "), None);
        assert!(resolver.has_data());
    }

    #[test]
    fn unavailable_resolver_reports_no_data() {
        let resolver = ExactTitleResolver::unavailable();
        assert_eq!(resolver.resolve("Anything"), None);
        assert!(!resolver.has_data());
    }
}
