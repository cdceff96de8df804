use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::domain::{
    ActionPlan, Audit, AuditId, AuditStatus, AuditType, Evaluation, EvaluationId, StandardId,
    StandardWeight, TemplateId, UserId,
};

/// Storage failures surfaced by [`AuditRepository`] adapters.
#[derive(Debug, Error, PartialEq)]
pub enum RepositoryError {
    #[error("audit {0} already exists")]
    Conflict(AuditId),
    #[error("audit {0} does not exist")]
    Missing(AuditId),
    #[error("audit {0} was modified concurrently")]
    StaleVersion(AuditId),
    #[error("evaluation {0} does not exist")]
    MissingEvaluation(EvaluationId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence port for audits and their dependent rows.
///
/// `update` is the optimistic-concurrency gate: callers bump
/// [`Audit::version`] before calling, and adapters must reject the write
/// with [`RepositoryError::StaleVersion`] unless the incoming version is
/// exactly one ahead of the stored one.
pub trait AuditRepository: Send + Sync {
    fn insert(&self, audit: &Audit) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AuditId) -> Result<Option<Audit>, RepositoryError>;
    fn update(&self, audit: &Audit) -> Result<(), RepositoryError>;
    /// All non-deleted audits created from the given template, any status.
    fn audits_by_template(&self, template: &TemplateId) -> Result<Vec<Audit>, RepositoryError>;

    fn insert_evaluations(&self, evaluations: &[Evaluation]) -> Result<(), RepositoryError>;
    fn evaluations_for(&self, audit: &AuditId) -> Result<Vec<Evaluation>, RepositoryError>;
    fn fetch_evaluation(&self, id: &EvaluationId)
        -> Result<Option<Evaluation>, RepositoryError>;
    fn update_evaluation(&self, evaluation: &Evaluation) -> Result<(), RepositoryError>;

    fn action_plans_for(&self, audit: &AuditId) -> Result<Vec<ActionPlan>, RepositoryError>;

    fn weights_for(&self, audit: &AuditId) -> Result<Vec<StandardWeight>, RepositoryError>;
    /// Replaces the full weight set for the audit in one step. Adapters must
    /// not leave a partial set behind on failure.
    fn replace_weights(
        &self,
        audit: &AuditId,
        weights: &[StandardWeight],
    ) -> Result<(), RepositoryError>;
}

/// Lookup failures from the user and standards directories.
#[derive(Debug, Error, PartialEq)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Read-only port over the identity directory.
pub trait UserDirectory: Send + Sync {
    fn exists(&self, user: &UserId) -> Result<bool, DirectoryError>;
}

/// Catalog entry for one standard (clause/control) of a template. Standards
/// not marked auditable stay in the catalog for display but never receive
/// evaluations or weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standard {
    pub id: StandardId,
    pub template_id: TemplateId,
    pub name: String,
    pub category: Option<String>,
    pub display_order: u32,
    pub auditable: bool,
}

/// Read-only port over the template catalog.
pub trait StandardsDirectory: Send + Sync {
    /// Standards belonging to a template, in display order. An unknown
    /// template simply yields an empty set.
    fn template_standards(&self, template: &TemplateId) -> Result<Vec<Standard>, DirectoryError>;
}

/// Delivery failure from the notification channel.
#[derive(Debug, Error, PartialEq)]
pub enum NotifyError {
    #[error("notification channel unavailable: {0}")]
    Unavailable(String),
}

/// Event handed to the notification port when an audit reaches a terminal
/// state. Details carry flat display strings so channel adapters never need
/// the domain model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditNotice {
    pub topic: String,
    pub audit_id: AuditId,
    pub details: BTreeMap<String, String>,
}

impl AuditNotice {
    pub fn closed(audit: &Audit) -> Self {
        let mut details = BTreeMap::new();
        details.insert("name".to_string(), audit.name.clone());
        details.insert("lead_auditor".to_string(), audit.lead_auditor_id.to_string());
        if let Some(summary) = &audit.closure {
            details.insert(
                "conformities_percentage".to_string(),
                format!("{:.2}", summary.statistics.conformities_percentage),
            );
            details.insert(
                "requires_follow_up".to_string(),
                summary.statistics.requires_follow_up.to_string(),
            );
        }
        Self {
            topic: "audit_closed".to_string(),
            audit_id: audit.id.clone(),
            details,
        }
    }

    pub fn cancelled(audit: &Audit, reason: &str) -> Self {
        let mut details = BTreeMap::new();
        details.insert("name".to_string(), audit.name.clone());
        details.insert("reason".to_string(), reason.to_string());
        if let Some(record) = &audit.cancellation {
            details.insert(
                "previous_status".to_string(),
                record.previous_status.label().to_string(),
            );
        }
        Self {
            topic: "audit_cancelled".to_string(),
            audit_id: audit.id.clone(),
            details,
        }
    }
}

/// Outbound port for terminal-state announcements.
pub trait AuditNotifier: Send + Sync {
    fn publish(&self, notice: AuditNotice) -> Result<(), NotifyError>;
}

/// Compact read model returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditStatusView {
    pub id: AuditId,
    pub name: String,
    pub status: AuditStatus,
    pub audit_type: AuditType,
    pub lead_auditor_id: UserId,
    pub progress: f64,
    pub total_score: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Audit {
    pub fn status_view(&self) -> AuditStatusView {
        AuditStatusView {
            id: self.id.clone(),
            name: self.name.clone(),
            status: self.status,
            audit_type: self.audit_type,
            lead_auditor_id: self.lead_auditor_id.clone(),
            progress: self.progress,
            total_score: self.total_score,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}
