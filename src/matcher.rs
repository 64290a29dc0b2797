//! Association of a frame's anonymous contacts with the previously active slots.
//!
//! Distances are Euclidean over the enabled position axes, each axis
//! normalized by its calibrated span, so `1.0` is the full width of the
//! device. A pair is only committed when its distance is strictly below the
//! threshold. The assignment is greedy: the globally closest remaining pair
//! is committed first; ties go to the lower slot index, then to the contact
//! that arrived first.

use crate::axis::{AxisTable, MtAxis};
use crate::frame::Contact;
use std::cmp::Ordering;

/// Default plausibility threshold, in normalized device units.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.25;

#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct Assignment {
    /// Indexed by contact arrival order: the slot it continues, or `None` for
    /// a new contact.
    pub continued: Vec<Option<usize>>,
    /// Previously active slots with no contact this frame, ascending.
    pub ended: Vec<usize>,
}

impl Assignment {
    pub fn births(&self) -> impl Iterator<Item = usize> + '_ {
        self.continued
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(contact, _)| contact)
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f64,
    slot: usize,
    contact: usize,
}

impl Candidate {
    fn order(&self, other: &Candidate) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.slot.cmp(&other.slot))
            .then(self.contact.cmp(&other.contact))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ContactMatcher {
    threshold: f64,
}

impl Default for ContactMatcher {
    fn default() -> ContactMatcher {
        ContactMatcher::new(DEFAULT_MATCH_THRESHOLD)
    }
}

impl ContactMatcher {
    pub fn new(threshold: f64) -> ContactMatcher {
        ContactMatcher { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// `active` holds `(slot index, last known values)`, ascending by slot.
    pub fn assign(
        &self,
        axes: &AxisTable,
        active: &[(usize, Contact)],
        contacts: &[Contact],
    ) -> Assignment {
        let mut candidates = vec![];
        for (slot, previous) in active.iter() {
            for (index, contact) in contacts.iter().enumerate() {
                let distance = distance(axes, previous, contact);
                if distance < self.threshold {
                    candidates.push(Candidate {
                        distance,
                        slot: *slot,
                        contact: index,
                    });
                }
            }
        }
        candidates.sort_by(Candidate::order);

        let mut continued = vec![None; contacts.len()];
        let mut taken = vec![];
        for candidate in candidates {
            if continued[candidate.contact].is_none() && !taken.contains(&candidate.slot) {
                continued[candidate.contact] = Some(candidate.slot);
                taken.push(candidate.slot);
            }
        }
        let ended = active
            .iter()
            .map(|(slot, _)| *slot)
            .filter(|slot| !taken.contains(slot))
            .collect();
        Assignment { continued, ended }
    }
}

/// Normalized Euclidean distance over enabled position axes. An axis missing
/// from either side contributes nothing.
pub fn distance(axes: &AxisTable, a: &Contact, b: &Contact) -> f64 {
    axes.enabled_axes()
        .filter(|axis| axis.is_position())
        .filter_map(|axis: MtAxis| {
            let (a, b) = (a.get(axis)?, b.get(axis)?);
            let delta = (i64::from(a) - i64::from(b)) as f64;
            Some(delta / f64::from(axes.info(axis).span()))
        })
        .map(|delta| delta * delta)
        .sum::<f64>()
        .sqrt()
}
