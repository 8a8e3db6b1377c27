//! Canonical slot value extraction.
//!
//! Resolutions are scanned in the order the platform lists them and the
//! first successful one wins. Confidence plays no part.

use crate::envelope::{RequestEnvelope, Slot};

/// Canonical name of the first value of the first successful resolution.
///
/// Returns `None` when nothing resolved, including a successful resolution
/// that carries no usable name.
pub fn canonical_value(slot: &Slot) -> Option<&str> {
    let resolutions = slot.resolutions.as_ref()?;
    resolutions
        .resolutions_per_authority
        .iter()
        .find(|r| r.is_success())
        .and_then(|r| r.values.first())
        .map(|v| v.value.name.as_str())
        .filter(|name| !name.trim().is_empty())
}

/// What a handler can make of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotValue<'a> {
    /// The user never said anything for this slot.
    Missing,
    /// Something was said but did not resolve to a known value.
    Unresolved { spoken: &'a str },
    Resolved {
        canonical: &'a str,
        spoken: Option<&'a str>,
    },
}

impl<'a> SlotValue<'a> {
    pub fn canonical(&self) -> Option<&'a str> {
        match self {
            SlotValue::Resolved { canonical, .. } => Some(canonical),
            _ => None,
        }
    }
}

/// Classify the slot `name` of the envelope's intent.
pub fn resolve_slot<'a>(envelope: &'a RequestEnvelope, name: &str) -> SlotValue<'a> {
    let Some(slot) = envelope.slot(name) else {
        return SlotValue::Missing;
    };
    let spoken = slot.value.as_deref().filter(|v| !v.trim().is_empty());

    match (canonical_value(slot), spoken) {
        (Some(canonical), spoken) => SlotValue::Resolved { canonical, spoken },
        (None, Some(spoken)) => SlotValue::Unresolved { spoken },
        (None, None) => SlotValue::Missing,
    }
}
