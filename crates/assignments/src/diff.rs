//! Summaries of issued or planned mutations

use crate::types::{Mutation, MutationAction};

/// Mutation counts by effect
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationSummary {
    /// Principals granted a permission they did not have before
    pub grants: usize,
    /// Principals whose permission changed (or was re-sent)
    pub changes: usize,
    /// Principals whose permissions were removed
    pub revokes: usize,
}

impl MutationSummary {
    /// Create a summary from a list of mutations
    pub fn from_mutations(mutations: &[Mutation]) -> Self {
        let mut summary = Self::default();
        for mutation in mutations {
            summary.add(mutation);
        }
        summary
    }

    /// Count one mutation
    pub fn add(&mut self, mutation: &Mutation) {
        match mutation.action {
            MutationAction::Grant { previous: None, .. } => self.grants += 1,
            MutationAction::Grant {
                previous: Some(_), ..
            } => self.changes += 1,
            MutationAction::Revoke => self.revokes += 1,
        }
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: &MutationSummary) {
        self.grants += other.grants;
        self.changes += other.changes;
        self.revokes += other.revokes;
    }

    /// Total number of mutations
    pub fn total(&self) -> usize {
        self.grants + self.changes + self.revokes
    }

    /// Check if there are any mutations
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}
