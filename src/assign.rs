//! Joining county identifiers with cluster labels

use std::collections::BTreeMap;

use crate::error::{PipelineError, Result};

/// Final county → group mapping handed to the rendering layer.
///
/// Keys are 5-character FIPS strings; values are dense 1-based group labels
/// in 1..=K. Iteration order is sorted by FIPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    groups: BTreeMap<String, usize>,
}

impl ClusterAssignment {
    /// Group label for a county, if present.
    pub fn group_of(&self, fips: &str) -> Option<usize> {
        self.groups.get(fips).copied()
    }

    /// Number of counties in the assignment.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the assignment is empty.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over (FIPS, group) pairs in FIPS order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.groups.iter().map(|(fips, &group)| (fips.as_str(), group))
    }

    /// Number of counties per group label.
    pub fn group_sizes(&self) -> BTreeMap<usize, usize> {
        let mut sizes = BTreeMap::new();
        for &group in self.groups.values() {
            *sizes.entry(group).or_insert(0) += 1;
        }
        sizes
    }
}

/// Join FIPS identifiers (in input order) with 0-based hard labels.
///
/// Labels are shifted to base 1 for the output mapping. A length mismatch
/// means an upstream component broke an invariant and is fatal, not
/// recoverable.
pub fn assemble_groups(fips: &[String], labels: &[usize]) -> Result<ClusterAssignment> {
    if fips.len() != labels.len() {
        return Err(PipelineError::AssemblyMismatch {
            identifiers: fips.len(),
            labels: labels.len(),
        });
    }

    let groups = fips
        .iter()
        .zip(labels.iter())
        .map(|(code, &label)| (code.clone(), label + 1))
        .collect();

    Ok(ClusterAssignment { groups })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_one_based_labels() {
        let fips = vec!["24001".to_owned(), "24003".to_owned(), "24005".to_owned()];
        let labels = vec![0, 1, 0];
        let assignment = assemble_groups(&fips, &labels).unwrap();

        assert_eq!(assignment.len(), 3);
        assert_eq!(assignment.group_of("24001"), Some(1));
        assert_eq!(assignment.group_of("24003"), Some(2));
        assert_eq!(assignment.group_of("24005"), Some(1));
        assert_eq!(assignment.group_of("99999"), None);
    }

    #[test]
    fn test_assemble_length_mismatch_is_fatal() {
        let fips = vec!["24001".to_owned(), "24003".to_owned()];
        let labels = vec![0];
        let err = assemble_groups(&fips, &labels).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::AssemblyMismatch {
                identifiers: 2,
                labels: 1
            }
        ));
    }

    #[test]
    fn test_group_sizes() {
        let fips = vec!["24001".to_owned(), "24003".to_owned(), "24005".to_owned()];
        let labels = vec![0, 1, 0];
        let assignment = assemble_groups(&fips, &labels).unwrap();

        let sizes = assignment.group_sizes();
        assert_eq!(sizes.get(&1), Some(&2));
        assert_eq!(sizes.get(&2), Some(&1));
    }
}
