use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::audits::domain::{Audit, StandardId, StandardWeight, UserId};
use crate::audits::progress::round_two;
use crate::audits::repository::Standard;

use super::{WeightError, WeightNormalization, WeightSubmission, MAX_WEIGHT};

/// Turns a submission into the replacement weight set for the audit.
///
/// Checks run in a fixed order: every evaluated standard must be covered,
/// every referenced standard must exist in the audit's template and be
/// auditable, then the optional rescale runs, then the normalized values
/// are validated. The caller persists the returned rows as one atomic
/// replacement.
///
/// Extra entries for standards that were never evaluated pass through
/// unchanged; reporting ignores them.
pub fn plan_replacement(
    audit: &Audit,
    submission: WeightSubmission,
    evaluated: &BTreeSet<StandardId>,
    catalog: &[Standard],
    configured_by: &UserId,
    configured_at: DateTime<Utc>,
) -> Result<Vec<StandardWeight>, WeightError> {
    if evaluated.is_empty() {
        return Err(WeightError::NoEvaluations {
            audit_id: audit.id.clone(),
        });
    }

    let offered: BTreeSet<&StandardId> = submission
        .entries
        .iter()
        .map(|entry| &entry.standard_id)
        .collect();
    let missing: Vec<StandardId> = evaluated
        .iter()
        .filter(|id| !offered.contains(id))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(WeightError::MissingStandards {
            standard_ids: missing,
        });
    }

    let catalog_by_id: HashMap<&StandardId, &Standard> =
        catalog.iter().map(|standard| (&standard.id, standard)).collect();
    for entry in &submission.entries {
        match catalog_by_id.get(&entry.standard_id) {
            None => {
                return Err(WeightError::UnknownStandard {
                    standard_id: entry.standard_id.clone(),
                    template_id: audit.template_id.clone(),
                })
            }
            Some(standard) if !standard.auditable => {
                return Err(WeightError::NotAuditable {
                    standard_id: entry.standard_id.clone(),
                })
            }
            Some(_) => {}
        }
    }

    let normalization = submission.normalization;
    let mut entries = submission.entries;
    if normalization == WeightNormalization::Auto {
        let sum: f64 = entries.iter().map(|entry| entry.weight).sum();
        if sum == 0.0 {
            for entry in &mut entries {
                entry.weight = 1.0;
            }
        } else {
            let target = entries.len() as f64;
            for entry in &mut entries {
                entry.weight = entry.weight * target / sum;
            }
        }
    }

    for entry in &entries {
        if entry.weight < 0.0 {
            return Err(WeightError::NegativeWeight {
                standard_id: entry.standard_id.clone(),
            });
        }
    }
    if !entries.iter().any(|entry| entry.weight > 0.0) {
        return Err(WeightError::AllZero);
    }
    let mut seen: BTreeSet<&StandardId> = BTreeSet::new();
    for entry in &entries {
        if !seen.insert(&entry.standard_id) {
            return Err(WeightError::DuplicateStandard {
                standard_id: entry.standard_id.clone(),
            });
        }
    }
    for entry in &entries {
        if entry.weight > MAX_WEIGHT {
            return Err(WeightError::AboveCap {
                standard_id: entry.standard_id.clone(),
            });
        }
    }

    let mut rows = Vec::with_capacity(entries.len());
    for entry in entries {
        let standard =
            catalog_by_id
                .get(&entry.standard_id)
                .ok_or_else(|| WeightError::UnknownStandard {
                    standard_id: entry.standard_id.clone(),
                    template_id: audit.template_id.clone(),
                })?;
        rows.push(StandardWeight {
            audit_id: audit.id.clone(),
            standard_id: entry.standard_id,
            weight: round_two(entry.weight),
            justification: entry.justification,
            category: standard.category.clone(),
            display_order: standard.display_order,
            configured_by: configured_by.clone(),
            configured_at,
        });
    }
    Ok(rows)
}
