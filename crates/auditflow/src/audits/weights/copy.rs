use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::audits::domain::{AuditId, StandardId, StandardWeight};

use super::{WeightEntry, WeightError};

/// Where a copied weight set comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightCopySource {
    /// The most recently created audit on the same template that has any
    /// weights configured, whatever that audit happened to store.
    Template,
    /// An explicitly named earlier audit.
    PreviousAudit,
}

/// Copy request payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeightCopy {
    pub source: WeightCopySource,
    #[serde(default)]
    pub source_audit_id: Option<AuditId>,
    #[serde(default = "default_adjustment_factor")]
    pub adjustment_factor: f64,
}

fn default_adjustment_factor() -> f64 {
    1.0
}

/// Derives a submission for the destination audit from a source weight set.
///
/// Source weights for standards the destination evaluates map over as
/// weight × adjustment factor. Destination standards the source never
/// weighted receive the arithmetic mean of the mapped weights with a note
/// saying so. Standards present only in the source are dropped. A source
/// sharing no standards with the destination cannot seed anything and is
/// rejected.
pub fn map_source(
    source_weights: &[StandardWeight],
    evaluated: &BTreeSet<StandardId>,
    adjustment_factor: f64,
) -> Result<Vec<WeightEntry>, WeightError> {
    let mut mapped: Vec<WeightEntry> = source_weights
        .iter()
        .filter(|weight| evaluated.contains(&weight.standard_id))
        .map(|weight| WeightEntry {
            standard_id: weight.standard_id.clone(),
            weight: weight.weight * adjustment_factor,
            justification: weight.justification.clone(),
        })
        .collect();
    if mapped.is_empty() {
        return Err(WeightError::NoOverlap);
    }

    let mean = mapped.iter().map(|entry| entry.weight).sum::<f64>() / mapped.len() as f64;
    let covered: BTreeSet<&StandardId> =
        mapped.iter().map(|entry| &entry.standard_id).collect();
    let fills: Vec<WeightEntry> = evaluated
        .iter()
        .filter(|id| !covered.contains(id))
        .map(|id| WeightEntry {
            standard_id: id.clone(),
            weight: mean,
            justification: Some(format!("Filled with the copied-set mean of {mean:.2}")),
        })
        .collect();
    mapped.extend(fills);
    Ok(mapped)
}
