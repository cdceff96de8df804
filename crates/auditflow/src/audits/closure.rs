//! Closure gate for the audit lifecycle.
//!
//! Three independent checks, evaluated in a fixed order, must all pass
//! before an audit may move to pending-closure or closed: every active
//! evaluation is completed, every one carries a compliance classification,
//! and every major non-conformity is covered by a live action plan. The
//! statistics computed here are recomputed fresh at every gate, never
//! reused from an earlier request.

use thiserror::Error;

use super::domain::{
    ActionPlan, AuditId, ClosureStatistics, ComplianceStatus, Evaluation, NonConformityCounts,
    StandardId,
};
use super::progress::round_two;

/// Why an audit cannot be closed right now. Carries enough structure for
/// callers to render "why can't I close" detail without parsing messages.
#[derive(Debug, Error, PartialEq)]
pub enum ClosureBlocked {
    #[error("audit {audit_id} has no evaluations, nothing to close")]
    NothingToClose { audit_id: AuditId },
    #[error("audit {audit_id} cannot be closed: {pending} evaluations sin completar")]
    IncompleteEvaluations { audit_id: AuditId, pending: u32 },
    #[error("audit {audit_id} cannot be closed: {unclassified} evaluations sin clasificar")]
    UnclassifiedEvaluations { audit_id: AuditId, unclassified: u32 },
    #[error(
        "audit {audit_id} cannot be closed: major non-conformities on {} lack an approved or in-progress action plan",
        join_ids(.standard_ids)
    )]
    UnremediatedMajorFindings {
        audit_id: AuditId,
        standard_ids: Vec<StandardId>,
    },
}

fn join_ids(ids: &[StandardId]) -> String {
    ids.iter()
        .map(|id| id.0.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Runs the three closure checks against the active evaluation set.
pub fn ensure_closable(
    audit_id: &AuditId,
    evaluations: &[Evaluation],
    plans: &[ActionPlan],
) -> Result<(), ClosureBlocked> {
    if evaluations.is_empty() {
        return Err(ClosureBlocked::NothingToClose {
            audit_id: audit_id.clone(),
        });
    }

    let pending = evaluations
        .iter()
        .filter(|evaluation| !evaluation.is_completed)
        .count() as u32;
    if pending > 0 {
        return Err(ClosureBlocked::IncompleteEvaluations {
            audit_id: audit_id.clone(),
            pending,
        });
    }

    let unclassified = evaluations
        .iter()
        .filter(|evaluation| evaluation.compliance_status.is_none())
        .count() as u32;
    if unclassified > 0 {
        return Err(ClosureBlocked::UnclassifiedEvaluations {
            audit_id: audit_id.clone(),
            unclassified,
        });
    }

    let mut uncovered: Vec<StandardId> = evaluations
        .iter()
        .filter(|evaluation| {
            evaluation.compliance_status == Some(ComplianceStatus::MajorNonConformity)
        })
        .filter(|evaluation| {
            !plans.iter().any(|plan| {
                plan.evaluation_id == evaluation.id && plan.status.covers_major_finding()
            })
        })
        .map(|evaluation| evaluation.standard_id.clone())
        .collect();
    if !uncovered.is_empty() {
        uncovered.sort();
        uncovered.dedup();
        return Err(ClosureBlocked::UnremediatedMajorFindings {
            audit_id: audit_id.clone(),
            standard_ids: uncovered,
        });
    }

    Ok(())
}

/// Computes the closure numbers from the active evaluation set.
///
/// A finding is any evaluation with a non-null classification; the
/// conformity percentage is taken over findings, not over all evaluations.
/// `critical` stays 0, reserved for a severity tier the model does not
/// carry yet.
pub fn statistics(evaluations: &[Evaluation]) -> ClosureStatistics {
    let total_evaluations = evaluations.len() as u32;
    let classified: Vec<ComplianceStatus> = evaluations
        .iter()
        .filter_map(|evaluation| evaluation.compliance_status)
        .collect();
    let total_findings = classified.len() as u32;

    let major = classified
        .iter()
        .filter(|status| **status == ComplianceStatus::MajorNonConformity)
        .count() as u32;
    let minor = classified
        .iter()
        .filter(|status| **status == ComplianceStatus::MinorNonConformity)
        .count() as u32;
    let conforming = classified
        .iter()
        .filter(|status| **status == ComplianceStatus::Conforming)
        .count() as u32;

    let conformities_percentage = if total_findings == 0 {
        0.0
    } else {
        round_two(f64::from(conforming) / f64::from(total_findings) * 100.0)
    };

    ClosureStatistics {
        total_evaluations,
        total_findings,
        non_conformities: NonConformityCounts {
            critical: 0,
            major,
            minor,
        },
        conformities_percentage,
        requires_follow_up: major + minor > 0,
    }
}
