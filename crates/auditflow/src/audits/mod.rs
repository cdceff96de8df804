//! Compliance-audit management: lifecycle state machine, closure gate,
//! standard weighting, and progress aggregation around the Audit aggregate.

pub(crate) mod closure;
pub mod domain;
pub(crate) mod progress;
pub mod repository;
pub mod router;
pub mod service;
pub(crate) mod weights;

#[cfg(test)]
mod tests;

pub use closure::ClosureBlocked;
pub use domain::{
    ActionPlan, ActionPlanId, ActionPlanStatus, Audit, AuditAction, AuditId, AuditStatus,
    AuditType, CancellationRecord, ClosureStatistics, ClosureSummary, ComplianceStatus,
    Evaluation, EvaluationId, MaturityLevel, NonConformityCounts, OrganizationId, StandardId,
    StandardWeight, TemplateId, UserId,
};
pub use progress::{measure, ProgressSnapshot};
pub use repository::{
    AuditNotice, AuditNotifier, AuditRepository, AuditStatusView, DirectoryError, NotifyError,
    RepositoryError, Standard, StandardsDirectory, UserDirectory,
};
pub use router::audit_router;
pub use service::{
    AuditService, AuditServiceError, AuditValidationError, CancelAudit, CloseAudit, CreateAudit,
    EvaluationAssessment, PlanAudit,
};
pub use weights::{
    WeightCopy, WeightCopySource, WeightEntry, WeightError, WeightNormalization,
    WeightSubmission, MAX_WEIGHT,
};
