//! Coreference chain membership (union-find over reference ids).

use std::collections::BTreeMap;

/// Disjoint sets of references known to denote the same entity, from
/// upstream chain assignment or `same_as` constraints.
#[derive(Debug, Clone, Default)]
pub struct ChainIndex {
    parent: BTreeMap<String, String>,
    /// Members per root, in insertion order.
    members: BTreeMap<String, Vec<String>>,
}

impl ChainIndex {
    pub fn insert(&mut self, ref_id: &str) {
        if self.parent.contains_key(ref_id) {
            return;
        }
        self.parent.insert(ref_id.to_string(), ref_id.to_string());
        self.members
            .insert(ref_id.to_string(), vec![ref_id.to_string()]);
    }

    pub fn find(&self, ref_id: &str) -> Option<String> {
        let mut current = self.parent.get(ref_id)?;
        loop {
            let next = self.parent.get(current)?;
            if next == current {
                return Some(current.clone());
            }
            current = next;
        }
    }

    pub fn same(&self, a: &str, b: &str) -> bool {
        match (self.find(a), self.find(b)) {
            (Some(ra), Some(rb)) => ra == rb,
            _ => false,
        }
    }

    /// Merge two chains. The root whose chain started earlier is kept, so
    /// member order stays stable.
    pub fn union(&mut self, a: &str, b: &str, arrival: &BTreeMap<String, usize>) {
        let (Some(ra), Some(rb)) = (self.find(a), self.find(b)) else {
            return;
        };
        if ra == rb {
            return;
        }
        let rank = |r: &str| arrival.get(r).copied().unwrap_or(usize::MAX);
        let (keep, merge) = if rank(ra.as_str()) <= rank(rb.as_str()) { (ra, rb) } else { (rb, ra) };
        self.parent.insert(merge.clone(), keep.clone());
        let moved = self.members.remove(&merge).unwrap_or_default();
        let list = self.members.entry(keep).or_default();
        list.extend(moved);
        list.sort_by_key(|m| rank(m.as_str()));
    }

    /// Every member of `ref_id`'s chain (including itself), in arrival order.
    pub fn members(&self, ref_id: &str) -> Vec<String> {
        self.find(ref_id)
            .and_then(|root| self.members.get(&root).cloned())
            .unwrap_or_default()
    }
}
