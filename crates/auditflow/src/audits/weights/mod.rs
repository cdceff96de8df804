//! Standard-weight configuration for weighted-score reporting.
//!
//! The lead auditor assigns each evaluated standard a relative multiplier
//! while the audit is still in Draft or Planned. Submissions are validated,
//! optionally rescaled so the weights sum to the entry count, and persisted
//! as one atomic replacement of the audit's weight set. Copying derives a
//! submission from another audit's stored weights and then goes through the
//! same pipeline.

mod copy;
mod normalize;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::domain::{AuditId, AuditStatus, StandardId, TemplateId};

pub use copy::{map_source, WeightCopy, WeightCopySource};
pub use normalize::plan_replacement;

/// Upper bound on any single post-normalization weight. Weights are meant
/// to be small relative multipliers (roughly 1.0 to 3.0).
pub const MAX_WEIGHT: f64 = 100.0;

/// One requested weight for one standard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub standard_id: StandardId,
    pub weight: f64,
    pub justification: Option<String>,
}

/// Whether the engine rescales a submission or stores it as given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightNormalization {
    #[default]
    Auto,
    Manual,
}

/// A full weight set offered for one audit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeightSubmission {
    pub entries: Vec<WeightEntry>,
    #[serde(default)]
    pub normalization: WeightNormalization,
}

/// Rejections from weight configuration and copying.
#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    #[error(
        "weights can only be configured while the audit is draft or planned, audit {audit_id} is {}",
        .status.label()
    )]
    NotConfigurable {
        audit_id: AuditId,
        status: AuditStatus,
    },
    #[error("audit {audit_id} has no evaluations yet, plan the audit first")]
    NoEvaluations { audit_id: AuditId },
    #[error(
        "weights are missing for evaluated standards: {}",
        join_ids(.standard_ids)
    )]
    MissingStandards { standard_ids: Vec<StandardId> },
    #[error("standard {standard_id} does not belong to template {template_id}")]
    UnknownStandard {
        standard_id: StandardId,
        template_id: TemplateId,
    },
    #[error("standard {standard_id} is not auditable")]
    NotAuditable { standard_id: StandardId },
    #[error("weight for standard {standard_id} is negative after normalization")]
    NegativeWeight { standard_id: StandardId },
    #[error("at least one weight must be greater than zero")]
    AllZero,
    #[error("duplicate weight entries for standard {standard_id}")]
    DuplicateStandard { standard_id: StandardId },
    #[error("weight for standard {standard_id} exceeds the cap of {MAX_WEIGHT}")]
    AboveCap { standard_id: StandardId },
    #[error("no earlier audit of template {template_id} has weights to copy")]
    NoTemplateSource { template_id: TemplateId },
    #[error("audit {audit_id} has no weights to copy")]
    EmptySource { audit_id: AuditId },
    #[error("source audit id is required when copying from a previous audit")]
    MissingSourceAudit,
    #[error("the source audit shares no evaluated standards with this audit")]
    NoOverlap,
}

fn join_ids(ids: &[StandardId]) -> String {
    ids.iter()
        .map(|id| id.0.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
