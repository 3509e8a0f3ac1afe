//! Novelty and weight per evidence item.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use credence_core::models::DependencyDescriptor;

/// How much one item contributes to the joint likelihood.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemWeight {
    /// `1 −` the strongest declared dependence of this item on another.
    pub novelty: f64,
    /// 1 for the anchor, the independence coefficient otherwise.
    pub base: f64,
    pub weight: f64,
}

/// Novelty of each item, keyed by evidence id.
///
/// An item loses novelty through its own `depends_on` edges and through
/// every group it belongs to, except when it is that group's leader: the
/// member that comes first in input order. Appending a member to a group
/// therefore never displaces the member that was already leading it.
pub fn novelty(order: &[&str], descriptor: &DependencyDescriptor) -> BTreeMap<String, f64> {
    let mut dependence: BTreeMap<String, f64> =
        order.iter().map(|id| ((*id).to_string(), 0.0)).collect();

    for edge in &descriptor.depends_on {
        if let Some(d) = dependence.get_mut(&edge.evidence_id) {
            *d = d.max(edge.strength);
        }
    }

    let position = |id: &str| order.iter().position(|o| *o == id).unwrap_or(usize::MAX);
    for group in &descriptor.groups {
        let leader = group
            .members
            .iter()
            .min_by_key(|m| position(m.as_str()))
            .cloned();
        for member in &group.members {
            if Some(member) == leader.as_ref() {
                continue;
            }
            if let Some(d) = dependence.get_mut(member) {
                *d = d.max(group.correlation);
            }
        }
    }

    dependence
        .into_iter()
        .map(|(id, d)| (id, 1.0 - d))
        .collect()
}

/// Anchor = item with the largest `novelty × |log LR|`, first in input order on ties.
pub fn anchor<'a>(
    order: &[&'a str],
    novelty: &BTreeMap<String, f64>,
    log_ratios: &BTreeMap<String, f64>,
) -> Option<&'a str> {
    let score = |id: &str| {
        novelty.get(id).copied().unwrap_or(0.0) * log_ratios.get(id).map_or(0.0, |v| v.abs())
    };
    let mut best: Option<(&'a str, f64)> = None;
    for id in order {
        let s = score(*id);
        if best.map_or(true, |(_, bs)| s > bs) {
            best = Some((*id, s));
        }
    }
    best.map(|(id, _)| id)
}

/// Final weights for every item.
pub fn weights(
    order: &[&str],
    log_ratios: &BTreeMap<String, f64>,
    descriptor: &DependencyDescriptor,
) -> BTreeMap<String, ItemWeight> {
    let novelty = novelty(order, descriptor);
    let anchor = anchor(order, &novelty, log_ratios);
    order
        .iter()
        .map(|id| {
            let n = novelty.get(*id).copied().unwrap_or(1.0);
            let base = if Some(*id) == anchor {
                1.0
            } else {
                descriptor.independence_coefficient
            };
            (
                (*id).to_string(),
                ItemWeight {
                    novelty: n,
                    base,
                    weight: base * n,
                },
            )
        })
        .collect()
}
