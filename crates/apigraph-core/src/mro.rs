//! Method resolution order via C3 linearization.
//!
//! The hierarchy is keyed by qualified class name. Bases that are not in the
//! hierarchy (classes from other distributions, `object`) are dropped from the
//! linearization, since the model holds nothing to resolve against them.
//!
//! ```ignore
//! let mut hierarchy = HashMap::new();
//! hierarchy.insert("m.D".to_string(), vec!["m.B".to_string(), "m.C".to_string()]);
//! hierarchy.insert("m.B".to_string(), vec!["m.A".to_string()]);
//! hierarchy.insert("m.C".to_string(), vec!["m.A".to_string()]);
//! hierarchy.insert("m.A".to_string(), vec![]);
//!
//! let mro = compute_mro("m.D", &hierarchy)?;
//! assert_eq!(mro, vec!["m.D", "m.B", "m.C", "m.A"]);
//! ```

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::error::ApiError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MroError {
    /// No consistent linearization exists, or the hierarchy is cyclic.
    #[error("cannot compute a consistent method resolution order for '{class_name}'")]
    InconsistentHierarchy { class_name: String },

    #[error("class not found: {class_id}")]
    ClassNotFound { class_id: String },
}

pub type MroResult<T> = Result<T, MroError>;

impl From<MroError> for ApiError {
    fn from(err: MroError) -> Self {
        match err {
            MroError::InconsistentHierarchy { .. } => ApiError::invariant(err.to_string()),
            MroError::ClassNotFound { class_id } => ApiError::invalid_args(format!(
                "class not found: {}",
                class_id
            )),
        }
    }
}

/// Compute the C3 linearization of `class_name`, starting with the class itself.
pub fn compute_mro(
    class_name: &str,
    hierarchy: &HashMap<String, Vec<String>>,
) -> MroResult<Vec<String>> {
    let mut visiting = HashSet::new();
    linearize(class_name, hierarchy, &mut visiting)
}

fn linearize(
    class_name: &str,
    hierarchy: &HashMap<String, Vec<String>>,
    visiting: &mut HashSet<String>,
) -> MroResult<Vec<String>> {
    if !visiting.insert(class_name.to_string()) {
        return Err(MroError::InconsistentHierarchy {
            class_name: class_name.to_string(),
        });
    }

    let bases: Vec<&String> = hierarchy
        .get(class_name)
        .map(|bases| bases.iter().filter(|b| hierarchy.contains_key(*b)).collect())
        .unwrap_or_default();

    let mut seqs: Vec<Vec<String>> = Vec::with_capacity(bases.len() + 1);
    for base in &bases {
        seqs.push(linearize(base, hierarchy, visiting)?);
    }
    seqs.push(bases.iter().map(|b| (*b).clone()).collect());

    visiting.remove(class_name);

    let mut mro = vec![class_name.to_string()];
    match merge(&mut seqs) {
        Some(merged) => {
            mro.extend(merged);
            Ok(mro)
        }
        None => Err(MroError::InconsistentHierarchy {
            class_name: class_name.to_string(),
        }),
    }
}

/// C3 merge: repeatedly take the first head that appears in no tail.
fn merge(seqs: &mut Vec<Vec<String>>) -> Option<Vec<String>> {
    let mut result = Vec::new();

    loop {
        seqs.retain(|seq| !seq.is_empty());
        if seqs.is_empty() {
            return Some(result);
        }

        let candidate = seqs
            .iter()
            .map(|seq| &seq[0])
            .find(|head| !seqs.iter().any(|s| s[1..].contains(head)))?
            .clone();

        for seq in seqs.iter_mut() {
            if seq.first() == Some(&candidate) {
                seq.remove(0);
            }
        }
        result.push(candidate);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn hierarchy(entries: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(name, bases)| {
                (
                    name.to_string(),
                    bases.iter().map(|b| b.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn diamond() {
        let h = hierarchy(&[
            ("m.A", &[]),
            ("m.B", &["m.A"]),
            ("m.C", &["m.A"]),
            ("m.D", &["m.B", "m.C"]),
        ]);
        assert_eq!(compute_mro("m.D", &h).unwrap(), vec!["m.D", "m.B", "m.C", "m.A"]);
    }

    #[test]
    fn external_bases_are_dropped() {
        let h = hierarchy(&[("m.A", &["builtins.object"]), ("m.B", &["m.A", "ext.Mixin"])]);
        assert_eq!(compute_mro("m.B", &h).unwrap(), vec!["m.B", "m.A"]);
    }

    #[test]
    fn inconsistent_order_is_rejected() {
        let h = hierarchy(&[
            ("m.A", &[]),
            ("m.B", &["m.A"]),
            ("m.C", &["m.A", "m.B"]),
        ]);
        assert!(matches!(
            compute_mro("m.C", &h),
            Err(MroError::InconsistentHierarchy { .. })
        ));
    }

    #[test]
    fn cycles_are_rejected() {
        let h = hierarchy(&[("m.A", &["m.B"]), ("m.B", &["m.A"])]);
        assert!(compute_mro("m.A", &h).is_err());
    }
}
