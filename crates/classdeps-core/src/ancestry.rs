//! Super-class chain queries over a [`Catalog`]

use crate::catalog::Catalog;
use std::collections::{BTreeSet, HashSet};

/// Every catalog class whose super-class chain passes through `ancestor`.
///
/// The chain is followed through the catalog only: it stops at the first super
/// name the catalog does not know, at a class without a super class, and at a
/// class already seen on the same walk. `ancestor` itself is never included.
/// Interfaces are not followed.
pub fn descendants_of(ancestor: &str, catalog: &Catalog) -> BTreeSet<String> {
    catalog
        .iter()
        .filter(|(name, _)| *name != ancestor)
        .filter(|(name, _)| extends(name, ancestor, catalog))
        .map(|(name, _)| name.to_string())
        .collect()
}

/// True when `ancestor` appears among the super classes of `class`.
pub fn extends(class: &str, ancestor: &str, catalog: &Catalog) -> bool {
    let mut visited = HashSet::new();
    let mut current = class;
    visited.insert(current);

    while let Some(super_name) = catalog
        .get(current)
        .and_then(|record| record.super_name.as_deref())
    {
        if super_name == ancestor {
            return true;
        }
        if !visited.insert(super_name) {
            return false;
        }
        current = super_name;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::ClassRecord;
    use pretty_assertions::assert_eq;

    fn class(name: &str, super_name: Option<&str>) -> ClassRecord {
        ClassRecord {
            name: name.to_string(),
            super_name: super_name.map(str::to_string),
            ..Default::default()
        }
    }

    fn hierarchy() -> Catalog {
        Catalog::from_records([
            class("java.lang.Object", None),
            class("a.View", Some("java.lang.Object")),
            class("a.ViewGroup", Some("a.View")),
            class("a.LinearLayout", Some("a.ViewGroup")),
            class("a.Other", Some("java.lang.Object")),
            class("a.Orphan", Some("b.Missing")),
            class("a.OrphanChild", Some("a.Orphan")),
        ])
    }

    #[test]
    fn test_transitive_descendants() {
        let catalog = hierarchy();
        assert_eq!(
            descendants_of("a.View", &catalog),
            BTreeSet::from(["a.LinearLayout".to_string(), "a.ViewGroup".to_string()])
        );
        assert_eq!(
            descendants_of("a.ViewGroup", &catalog),
            BTreeSet::from(["a.LinearLayout".to_string()])
        );
        assert!(descendants_of("a.LinearLayout", &catalog).is_empty());
    }

    #[test]
    fn test_ancestor_outside_catalog() {
        let catalog = hierarchy();
        // The chain reaches the missing name before stopping.
        assert_eq!(
            descendants_of("b.Missing", &catalog),
            BTreeSet::from(["a.Orphan".to_string(), "a.OrphanChild".to_string()])
        );
        assert!(descendants_of("c.Nothing", &catalog).is_empty());
    }

    #[test]
    fn test_ancestor_is_not_its_own_descendant() {
        let catalog = hierarchy();
        let all = descendants_of("java.lang.Object", &catalog);
        assert!(!all.contains("java.lang.Object"));
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_cyclic_chain_terminates() {
        let catalog = Catalog::from_records([
            class("a.A", Some("a.B")),
            class("a.B", Some("a.A")),
            class("a.C", Some("a.A")),
        ]);
        assert_eq!(
            descendants_of("a.A", &catalog),
            BTreeSet::from(["a.B".to_string(), "a.C".to_string()])
        );
        assert!(descendants_of("x.Y", &catalog).is_empty());
        assert!(!extends("a.A", "a.C", &catalog));
    }
}
