use std::collections::BTreeSet;

use crate::notifier::config::RoleRangeConfig;

/// Groups that receive notifications.
///
/// Inclusion mode: exactly the configured list.
/// Exclusion mode: every group seen in traffic, minus the configured list.
#[derive(Debug, Clone)]
pub struct RoleRange {
    exclude_mode: bool,
    configured: BTreeSet<String>,
    groups: BTreeSet<String>,
}

impl RoleRange {
    pub fn new(config: &RoleRangeConfig) -> Self {
        let configured: BTreeSet<String> = config.group_list.iter().cloned().collect();
        let groups = if config.exclude_mode {
            BTreeSet::new()
        } else {
            configured.clone()
        };

        Self {
            exclude_mode: config.exclude_mode,
            configured,
            groups,
        }
    }

    /// Record a group seen in traffic. Returns true if it was newly added.
    pub fn observe(&mut self, group_id: &str) -> bool {
        if !self.exclude_mode || self.configured.contains(group_id) {
            return false;
        }
        self.groups.insert(group_id.to_string())
    }

    pub fn contains(&self, group_id: &str) -> bool {
        self.groups.contains(group_id)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(exclude_mode: bool, groups: &[&str]) -> RoleRangeConfig {
        RoleRangeConfig {
            exclude_mode,
            group_list: groups.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn inclusion_mode_is_static() {
        let mut range = RoleRange::new(&config(false, &["1", "2"]));
        assert_eq!(range.iter().collect::<Vec<_>>(), vec!["1", "2"]);

        assert!(!range.observe("3"));
        assert!(!range.contains("3"));
        assert_eq!(range.len(), 2);
    }

    #[test]
    fn exclusion_mode_grows_from_traffic() {
        let mut range = RoleRange::new(&config(true, &["blocked"]));
        assert!(range.is_empty());

        assert!(range.observe("10"));
        assert!(!range.observe("10"));
        assert!(!range.observe("blocked"));

        assert!(range.contains("10"));
        assert!(!range.contains("blocked"));
        assert_eq!(range.len(), 1);
    }
}
