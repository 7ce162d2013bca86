//! Assignment order resolution
//!
//! Collapses an unordered set of [`AssignmentRule`]s into exactly one
//! permission per user and per group. Rules are scanned from the highest
//! priority down and the first rule to name a principal decides its
//! permission. Rules sharing a priority keep their declaration order, so the
//! earlier rule wins.

use crate::permission::Permission;
use crate::types::{AssignmentRule, PrincipalKind};
use indexmap::IndexMap;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Principal names in first-seen order, each mapped to one permission
///
/// A lowercase index backs the case-insensitive lookups groups need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedAssignments {
    permissions: IndexMap<String, Permission>,
    folded: HashMap<String, String>,
}

impl OrderedAssignments {
    /// Assign `permission` unless the principal already has one
    pub fn insert_if_absent(&mut self, name: &str, permission: Permission) {
        if self.permissions.contains_key(name) {
            return;
        }
        self.permissions.insert(name.to_string(), permission);
        self.folded
            .entry(name.to_lowercase())
            .or_insert_with(|| name.to_string());
    }

    pub fn get(&self, name: &str) -> Option<Permission> {
        self.permissions.get(name).copied()
    }

    /// Permission of the principal whose name matches ignoring case
    pub fn get_ignore_case(&self, name: &str) -> Option<Permission> {
        self.folded
            .get(&name.to_lowercase())
            .and_then(|configured| self.get(configured))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.permissions.contains_key(name)
    }

    /// Case-insensitive membership, used for group names the server may
    /// report with different capitalisation
    pub fn contains_ignore_case(&self, name: &str) -> bool {
        self.folded.contains_key(&name.to_lowercase())
    }

    /// Names in first-seen order
    pub fn names(&self) -> Vec<&str> {
        self.permissions.keys().map(String::as_str).collect()
    }

    /// `(name, permission)` pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Permission)> + '_ {
        self.permissions
            .iter()
            .map(|(name, permission)| (name.as_str(), *permission))
    }

    /// Names present here but absent from `other`, in this sequence's order
    pub fn missing_from<'a>(&'a self, other: &Self) -> Vec<&'a str> {
        self.permissions
            .keys()
            .filter(|name| !other.contains(name))
            .map(String::as_str)
            .collect()
    }

    /// Like [`missing_from`](Self::missing_from), comparing names ignoring case
    pub fn missing_from_ignore_case<'a>(&'a self, other: &Self) -> Vec<&'a str> {
        self.permissions
            .keys()
            .filter(|name| !other.contains_ignore_case(name))
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

/// Effective permission per user and per group for one assignment set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentOrder {
    pub users: OrderedAssignments,
    pub groups: OrderedAssignments,
}

impl AssignmentOrder {
    /// Resolve rules into one permission per principal
    ///
    /// Total over any input: duplicate names inside a rule and empty rules
    /// are tolerated.
    pub fn resolve(rules: &[AssignmentRule]) -> Self {
        let mut ranked: Vec<&AssignmentRule> = rules.iter().collect();
        // stable: equal priorities keep declaration order
        ranked.sort_by_key(|rule| Reverse(rule.priority));

        let mut order = Self::default();
        for rule in ranked {
            for user in &rule.users {
                order.users.insert_if_absent(user, rule.permission);
            }
            for group in &rule.groups {
                order.groups.insert_if_absent(group, rule.permission);
            }
        }
        order
    }

    /// Assignments of one principal kind
    pub fn side(&self, kind: PrincipalKind) -> &OrderedAssignments {
        match kind {
            PrincipalKind::User => &self.users,
            PrincipalKind::Group => &self.groups,
        }
    }

    pub fn user_permission(&self, name: &str) -> Option<Permission> {
        self.users.get(name)
    }

    pub fn group_permission(&self, name: &str) -> Option<Permission> {
        self.groups.get(name)
    }

    /// Check if no principal is managed
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::Permission::{ProjectAdmin, ProjectRead, ProjectWrite};

    fn rule(permission: Permission, priority: i64, users: &[&str]) -> AssignmentRule {
        AssignmentRule::new(permission, priority).with_users(users.iter().copied())
    }

    #[test]
    fn test_higher_priority_wins() {
        let rules = vec![
            rule(ProjectRead, 1, &["a"]),
            rule(ProjectAdmin, 5, &["a"]),
        ];
        let order = AssignmentOrder::resolve(&rules);
        assert_eq!(order.user_permission("a"), Some(ProjectAdmin));
        assert_eq!(order.users.len(), 1);
    }

    #[test]
    fn test_priority_wins_regardless_of_declaration_order() {
        let rules = vec![
            rule(ProjectAdmin, 5, &["a"]),
            rule(ProjectRead, 1, &["a"]),
        ];
        let order = AssignmentOrder::resolve(&rules);
        assert_eq!(order.user_permission("a"), Some(ProjectAdmin));
    }

    #[test]
    fn test_priority_tie_is_single_valued() {
        let rules = vec![
            rule(ProjectRead, 1, &["a", "b"]),
            rule(ProjectWrite, 1, &["a"]),
        ];
        let order = AssignmentOrder::resolve(&rules);

        let a = order.user_permission("a").unwrap();
        assert!(a == ProjectRead || a == ProjectWrite);
        assert_eq!(order.users.names().iter().filter(|n| **n == "a").count(), 1);
        // no rule is dropped on a tie: b is still managed
        assert_eq!(order.user_permission("b"), Some(ProjectRead));
    }

    #[test]
    fn test_priority_tie_prefers_earlier_declaration() {
        let rules = vec![
            rule(ProjectWrite, 1, &["a"]),
            rule(ProjectRead, 1, &["a"]),
        ];
        assert_eq!(
            AssignmentOrder::resolve(&rules).user_permission("a"),
            Some(ProjectWrite)
        );
    }

    #[test]
    fn test_first_seen_order_follows_priority_scan() {
        let rules = vec![
            rule(ProjectRead, 1, &["carol", "alice"]),
            rule(ProjectAdmin, 10, &["bob"]),
            rule(ProjectWrite, 5, &["alice", "dave"]),
        ];
        let order = AssignmentOrder::resolve(&rules);
        assert_eq!(order.users.names(), ["bob", "alice", "dave", "carol"]);
        let pairs: Vec<_> = order.users.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("bob", ProjectAdmin),
                ("alice", ProjectWrite),
                ("dave", ProjectWrite),
                ("carol", ProjectRead),
            ]
        );
    }

    #[test]
    fn test_groups_resolve_independently_of_users() {
        let rules = vec![
            AssignmentRule::new(ProjectRead, 1)
                .with_users(["devs"])
                .with_groups(["devs"]),
            AssignmentRule::new(ProjectAdmin, 2).with_groups(["devs"]),
        ];
        let order = AssignmentOrder::resolve(&rules);
        assert_eq!(order.user_permission("devs"), Some(ProjectRead));
        assert_eq!(order.group_permission("devs"), Some(ProjectAdmin));
    }

    #[test]
    fn test_duplicate_principal_within_rule() {
        let order = AssignmentOrder::resolve(&[rule(ProjectRead, 1, &["a", "a"])]);
        assert_eq!(order.users.names(), ["a"]);
    }

    #[test]
    fn test_empty_input() {
        let order = AssignmentOrder::resolve(&[]);
        assert!(order.is_empty());
        assert_eq!(order.user_permission("anyone"), None);
    }

    #[test]
    fn test_missing_from_and_case_insensitive_lookup() {
        let before = AssignmentOrder::resolve(&[AssignmentRule::new(ProjectRead, 1)
            .with_groups(["Developers", "ops", "qa"])]);
        let after =
            AssignmentOrder::resolve(&[AssignmentRule::new(ProjectRead, 1).with_groups(["ops"])]);
        assert_eq!(before.groups.missing_from(&after.groups), ["Developers", "qa"]);
        assert!(before.groups.contains_ignore_case("developers"));
        assert!(!before.groups.contains("developers"));
    }

    #[test]
    fn test_case_only_rename_is_not_missing() {
        let before =
            AssignmentOrder::resolve(&[AssignmentRule::new(ProjectRead, 1).with_groups(["devs"])]);
        let after =
            AssignmentOrder::resolve(&[AssignmentRule::new(ProjectWrite, 1).with_groups(["DEVS"])]);

        assert_eq!(before.groups.missing_from(&after.groups), ["devs"]);
        assert!(before.groups.missing_from_ignore_case(&after.groups).is_empty());
        assert_eq!(before.groups.get_ignore_case("Devs"), Some(ProjectRead));
        assert_eq!(before.groups.get("Devs"), None);
    }
}
