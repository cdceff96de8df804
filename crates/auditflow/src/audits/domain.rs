use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for audit engagements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditId(pub String);

/// Identifier wrapper for per-standard evaluations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationId(pub String);

/// Identifier wrapper for remediation action plans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionPlanId(pub String);

/// Identifier wrapper for template standards (clauses/controls).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StandardId(pub String);

/// Identifier wrapper for audit templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub String);

/// Identifier wrapper for commissioning organizations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationId(pub String);

/// Identifier wrapper for directory users (auditors, approvers).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for AuditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for StandardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle states an audit moves through, one guarded command at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Draft,
    Planned,
    InProgress,
    PendingClosure,
    Closed,
    Cancelled,
}

impl AuditStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AuditStatus::Draft => "draft",
            AuditStatus::Planned => "planned",
            AuditStatus::InProgress => "in_progress",
            AuditStatus::PendingClosure => "pending_closure",
            AuditStatus::Closed => "closed",
            AuditStatus::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, AuditStatus::Closed | AuditStatus::Cancelled)
    }
}

/// Commands accepted by the lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Plan,
    Start,
    RequestClosure,
    ApproveClosure,
    Close,
    Cancel,
}

impl AuditAction {
    pub const fn label(self) -> &'static str {
        match self {
            AuditAction::Plan => "plan",
            AuditAction::Start => "start",
            AuditAction::RequestClosure => "request closure",
            AuditAction::ApproveClosure => "approve closure",
            AuditAction::Close => "close",
            AuditAction::Cancel => "cancel",
        }
    }

    /// The transition table. Every state check in the engine goes through
    /// this single match so no handler can grow its own edge.
    pub fn allowed_from(self) -> &'static [AuditStatus] {
        match self {
            AuditAction::Plan => &[AuditStatus::Draft],
            AuditAction::Start => &[AuditStatus::Planned],
            AuditAction::RequestClosure => &[AuditStatus::InProgress],
            AuditAction::ApproveClosure | AuditAction::Close => &[AuditStatus::PendingClosure],
            AuditAction::Cancel => &[
                AuditStatus::Draft,
                AuditStatus::Planned,
                AuditStatus::InProgress,
                AuditStatus::PendingClosure,
            ],
        }
    }

    pub fn permits(self, status: AuditStatus) -> bool {
        self.allowed_from().contains(&status)
    }
}

/// Engagement flavor; FollowUp audits inherit non-conformities from a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditType {
    Initial,
    FollowUp,
    Recertification,
}

impl AuditType {
    pub const fn label(self) -> &'static str {
        match self {
            AuditType::Initial => "initial",
            AuditType::FollowUp => "follow_up",
            AuditType::Recertification => "recertification",
        }
    }
}

/// Outcome classification an evaluator assigns to a standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Conforming,
    MinorNonConformity,
    MajorNonConformity,
    Observation,
    NotApplicable,
}

impl ComplianceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ComplianceStatus::Conforming => "conforming",
            ComplianceStatus::MinorNonConformity => "minor_non_conformity",
            ComplianceStatus::MajorNonConformity => "major_non_conformity",
            ComplianceStatus::Observation => "observation",
            ComplianceStatus::NotApplicable => "not_applicable",
        }
    }

    pub const fn is_non_conformity(self) -> bool {
        matches!(
            self,
            ComplianceStatus::MinorNonConformity | ComplianceStatus::MajorNonConformity
        )
    }
}

/// Remediation plan states. The audit core consults these, it never drives
/// them; the plan workflow lives outside the lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPlanStatus {
    Draft,
    PendingApproval,
    Approved,
    Rejected,
    InProgress,
    Completed,
    Verified,
    Closed,
    Overdue,
}

impl ActionPlanStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ActionPlanStatus::Draft => "draft",
            ActionPlanStatus::PendingApproval => "pending_approval",
            ActionPlanStatus::Approved => "approved",
            ActionPlanStatus::Rejected => "rejected",
            ActionPlanStatus::InProgress => "in_progress",
            ActionPlanStatus::Completed => "completed",
            ActionPlanStatus::Verified => "verified",
            ActionPlanStatus::Closed => "closed",
            ActionPlanStatus::Overdue => "overdue",
        }
    }

    /// Whether this plan satisfies the closure gate for a major finding.
    pub const fn covers_major_finding(self) -> bool {
        matches!(self, ActionPlanStatus::Approved | ActionPlanStatus::InProgress)
    }
}

/// Predefined score/text bundle selectable for an evaluation. Assigning one
/// copies both fields onto the evaluation before progress recomputes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaturityLevel {
    pub label: String,
    pub score: f64,
}

/// Assessment of one standard within one audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub audit_id: AuditId,
    pub standard_id: StandardId,
    pub maturity_level: Option<MaturityLevel>,
    pub compliance_status: Option<ComplianceStatus>,
    pub score: f64,
    pub is_completed: bool,
    pub previous_evaluation_id: Option<EvaluationId>,
    pub is_active: bool,
}

/// Remediation commitment tied to one evaluation's finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub id: ActionPlanId,
    pub audit_id: AuditId,
    pub evaluation_id: EvaluationId,
    pub description: String,
    pub status: ActionPlanStatus,
    pub due_date: Option<NaiveDate>,
    pub responsible_id: Option<UserId>,
}

/// Per-audit, per-standard scoring multiplier used for weighted reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardWeight {
    pub audit_id: AuditId,
    pub standard_id: StandardId,
    pub weight: f64,
    pub justification: Option<String>,
    pub category: Option<String>,
    pub display_order: u32,
    pub configured_by: UserId,
    pub configured_at: DateTime<Utc>,
}

/// Severity buckets for non-conformity counts. `critical` is reserved for a
/// future tier and is always 0; only major and minor classifications exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonConformityCounts {
    pub critical: u32,
    pub major: u32,
    pub minor: u32,
}

/// Snapshot of the closure numbers computed from the active evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureStatistics {
    pub total_evaluations: u32,
    pub total_findings: u32,
    pub non_conformities: NonConformityCounts,
    pub conformities_percentage: f64,
    pub requires_follow_up: bool,
}

/// Closure metadata stored on the aggregate. Provisional at request time
/// (closed_at = requested-at), overwritten with fresh numbers at Close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureSummary {
    pub closed_at: DateTime<Utc>,
    pub closed_by: UserId,
    pub statistics: ClosureStatistics,
    pub report_reference: Option<String>,
}

/// Audit-trail record written when an audit is cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationRecord {
    pub cancelled_at: DateTime<Utc>,
    pub cancelled_by: UserId,
    pub reason: String,
    pub previous_status: AuditStatus,
}

/// The audit aggregate root. All lifecycle, weight, and progress writes go
/// through a version-checked read-modify-write on this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub id: AuditId,
    pub name: String,
    pub audit_type: AuditType,
    pub status: AuditStatus,
    pub template_id: TemplateId,
    pub framework: String,
    pub organization_id: OrganizationId,
    pub lead_auditor_id: UserId,
    pub team_member_ids: Vec<UserId>,
    pub scope: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: f64,
    pub total_score: f64,
    pub closure: Option<ClosureSummary>,
    pub closure_approved_at: Option<DateTime<Utc>>,
    pub closure_approved_by: Option<UserId>,
    pub cancellation: Option<CancellationRecord>,
    pub created_at: DateTime<Utc>,
    pub deleted: bool,
    pub version: u64,
}

impl Audit {
    pub fn is_lead(&self, user: &UserId) -> bool {
        &self.lead_auditor_id == user
    }
}
