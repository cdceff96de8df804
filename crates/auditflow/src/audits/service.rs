//! The audit lifecycle engine.
//!
//! One service method per command. Every method re-fetches the aggregate,
//! checks state and actor against the transition table, applies the
//! mutation, and persists through the version-checked repository write, so
//! two concurrent commands on the same audit can never both succeed.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::closure::{self, ClosureBlocked};
use super::domain::{
    Audit, AuditAction, AuditId, AuditStatus, AuditType, CancellationRecord, ClosureSummary,
    ComplianceStatus, Evaluation, EvaluationId, MaturityLevel, OrganizationId, StandardId,
    StandardWeight, TemplateId, UserId,
};
use super::progress;
use super::repository::{
    AuditNotice, AuditNotifier, AuditRepository, DirectoryError, NotifyError, RepositoryError,
    StandardsDirectory, UserDirectory,
};
use super::weights::{
    self, WeightCopy, WeightCopySource, WeightError, WeightNormalization, WeightSubmission,
};

/// Registration payload for a new Draft audit.
#[derive(Debug, Clone)]
pub struct CreateAudit {
    pub name: String,
    pub audit_type: AuditType,
    pub template_id: TemplateId,
    pub framework: String,
    pub organization_id: OrganizationId,
    pub lead_auditor_id: UserId,
}

/// Planning payload. The caller must be the lead auditor this command
/// designates; `source_audit_id` seeds a FollowUp audit with the source's
/// open non-conformities instead of the full template.
#[derive(Debug, Clone)]
pub struct PlanAudit {
    pub lead_auditor_id: UserId,
    pub team_member_ids: Vec<UserId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub scope: String,
    pub organization_id: Option<OrganizationId>,
    pub source_audit_id: Option<AuditId>,
}

#[derive(Debug, Clone, Default)]
pub struct CloseAudit {
    pub report_reference: Option<String>,
}

/// Cancellation payload. `elevated` is set by the boundary when the caller
/// holds a role that may cancel audits it does not lead.
#[derive(Debug, Clone)]
pub struct CancelAudit {
    pub reason: String,
    pub elevated: bool,
}

/// Assessment payload for one evaluation. Assigning a maturity level copies
/// its predefined score onto the evaluation; an explicit score, when also
/// given, wins over the copied one.
#[derive(Debug, Clone, Default)]
pub struct EvaluationAssessment {
    pub maturity_level: Option<MaturityLevel>,
    pub compliance_status: Option<ComplianceStatus>,
    pub score: Option<f64>,
    pub completed: bool,
}

/// Input problems the caller can fix and resubmit.
#[derive(Debug, Error, PartialEq)]
pub enum AuditValidationError {
    #[error("audit name must not be blank")]
    BlankName,
    #[error("framework must not be blank")]
    BlankFramework,
    #[error("scope must not be blank")]
    BlankScope,
    #[error("start date {start} must fall before end date {end}")]
    DateRange { start: NaiveDate, end: NaiveDate },
    #[error("user {0} is not in the directory")]
    UnknownUser(UserId),
    #[error("the team needs at least one member besides the lead auditor")]
    TeamTooSmall,
    #[error("template {0} has no auditable standards")]
    EmptyTemplate(TemplateId),
    #[error("source audit {0} has no non-conformities to follow up")]
    NoFindingsToInherit(AuditId),
    #[error("cancellation reason must not be blank")]
    BlankReason,
    #[error("closure of audit {0} has not been approved")]
    ClosureNotApproved(AuditId),
    #[error("evaluations can only be recorded while audit {0} is in progress")]
    NotInProgress(AuditId),
}

/// Everything a lifecycle, weight, or assessment call can fail with.
#[derive(Debug, Error, PartialEq)]
pub enum AuditServiceError {
    #[error("audit {0} does not exist")]
    AuditNotFound(AuditId),
    #[error("evaluation {0} does not exist")]
    EvaluationNotFound(EvaluationId),
    #[error("user {user} is not the lead auditor of audit {audit}")]
    NotLeadAuditor { audit: AuditId, user: UserId },
    #[error("user {user} is not on the team of audit {audit}")]
    NotOnTeam { audit: AuditId, user: UserId },
    #[error(
        "cannot {} audit {} while {}, requires {}",
        .action.label(),
        .audit,
        .current.label(),
        .required
    )]
    InvalidTransition {
        audit: AuditId,
        action: AuditAction,
        current: AuditStatus,
        required: String,
    },
    #[error(transparent)]
    Validation(#[from] AuditValidationError),
    #[error(transparent)]
    ClosureBlocked(#[from] ClosureBlocked),
    #[error(transparent)]
    Weights(#[from] WeightError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

fn next_audit_id() -> AuditId {
    static SEQUENCE: AtomicU64 = AtomicU64::new(1);
    AuditId(format!("audit-{:06}", SEQUENCE.fetch_add(1, Ordering::Relaxed)))
}

fn next_evaluation_id() -> EvaluationId {
    static SEQUENCE: AtomicU64 = AtomicU64::new(1);
    EvaluationId(format!("eval-{:06}", SEQUENCE.fetch_add(1, Ordering::Relaxed)))
}

/// Core service wired to its four ports.
pub struct AuditService<R, U, S, N> {
    repository: Arc<R>,
    users: Arc<U>,
    standards: Arc<S>,
    notifier: Arc<N>,
}

impl<R, U, S, N> AuditService<R, U, S, N>
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    pub fn new(repository: Arc<R>, users: Arc<U>, standards: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            repository,
            users,
            standards,
            notifier,
        }
    }

    /// Registers a new audit in Draft.
    pub fn create(
        &self,
        actor: &UserId,
        command: CreateAudit,
    ) -> Result<Audit, AuditServiceError> {
        if command.name.trim().is_empty() {
            return Err(AuditValidationError::BlankName.into());
        }
        if command.framework.trim().is_empty() {
            return Err(AuditValidationError::BlankFramework.into());
        }
        self.ensure_known_user(&command.lead_auditor_id)?;

        let audit = Audit {
            id: next_audit_id(),
            name: command.name,
            audit_type: command.audit_type,
            status: AuditStatus::Draft,
            template_id: command.template_id,
            framework: command.framework,
            organization_id: command.organization_id,
            lead_auditor_id: command.lead_auditor_id,
            team_member_ids: Vec::new(),
            scope: None,
            start_date: None,
            end_date: None,
            progress: 0.0,
            total_score: 0.0,
            closure: None,
            closure_approved_at: None,
            closure_approved_by: None,
            cancellation: None,
            created_at: Utc::now(),
            deleted: false,
            version: 1,
        };
        self.repository.insert(&audit)?;
        info!(audit = %audit.id, actor = %actor, "audit registered");
        Ok(audit)
    }

    pub fn get(&self, id: &AuditId) -> Result<Audit, AuditServiceError> {
        self.load(id)
    }

    pub fn evaluations(&self, id: &AuditId) -> Result<Vec<Evaluation>, AuditServiceError> {
        self.load(id)?;
        self.active_evaluations(id)
    }

    pub fn weights(&self, id: &AuditId) -> Result<Vec<StandardWeight>, AuditServiceError> {
        self.load(id)?;
        Ok(self.repository.weights_for(id)?)
    }

    /// Soft delete. The record stays behind for traceability but every
    /// subsequent lookup reports it as missing.
    pub fn delete(&self, id: &AuditId, actor: &UserId) -> Result<(), AuditServiceError> {
        let mut audit = self.load(id)?;
        audit.deleted = true;
        self.persist(audit)?;
        info!(audit = %id, actor = %actor, "audit deleted");
        Ok(())
    }

    /// Draft → Planned. Assigns the audit team and schedule and generates
    /// the evaluation set the rest of the lifecycle works against.
    pub fn plan(
        &self,
        id: &AuditId,
        actor: &UserId,
        command: PlanAudit,
    ) -> Result<Audit, AuditServiceError> {
        let mut audit = self.load(id)?;
        guard(&audit, AuditAction::Plan)?;
        if actor != &command.lead_auditor_id {
            return Err(AuditServiceError::NotLeadAuditor {
                audit: audit.id.clone(),
                user: actor.clone(),
            });
        }
        if command.start_date >= command.end_date {
            return Err(AuditValidationError::DateRange {
                start: command.start_date,
                end: command.end_date,
            }
            .into());
        }
        if command.scope.trim().is_empty() {
            return Err(AuditValidationError::BlankScope.into());
        }
        self.ensure_known_user(&command.lead_auditor_id)?;
        if !command
            .team_member_ids
            .iter()
            .any(|member| member != &command.lead_auditor_id)
        {
            return Err(AuditValidationError::TeamTooSmall.into());
        }
        for member in &command.team_member_ids {
            self.ensure_known_user(member)?;
        }

        let evaluations = self.generate_evaluations(&audit, command.source_audit_id.as_ref())?;

        let draft = audit.clone();
        audit.status = AuditStatus::Planned;
        audit.lead_auditor_id = command.lead_auditor_id;
        audit.team_member_ids = command.team_member_ids;
        audit.scope = Some(command.scope);
        audit.start_date = Some(command.start_date);
        audit.end_date = Some(command.end_date);
        if let Some(organization_id) = command.organization_id {
            audit.organization_id = organization_id;
        }
        let audit = self.persist(audit)?;
        // A failed batch insert must not leave a planned audit with no
        // evaluations behind it. The insert failure is the root cause and
        // stays the surfaced error even when the rollback write also fails.
        if let Err(error) = self.repository.insert_evaluations(&evaluations) {
            let mut restored = draft;
            restored.version = audit.version + 1;
            if let Err(rollback) = self.repository.update(&restored) {
                warn!(audit = %audit.id, %rollback, "plan rollback write failed");
            }
            return Err(error.into());
        }
        info!(
            audit = %audit.id,
            evaluations = evaluations.len(),
            "audit planned"
        );
        Ok(audit)
    }

    /// Planned → InProgress. Nothing changes beyond the status flip.
    pub fn start(&self, id: &AuditId, actor: &UserId) -> Result<Audit, AuditServiceError> {
        let mut audit = self.load(id)?;
        guard(&audit, AuditAction::Start)?;
        ensure_lead(&audit, actor)?;
        audit.status = AuditStatus::InProgress;
        let audit = self.persist(audit)?;
        info!(audit = %audit.id, "audit started");
        Ok(audit)
    }

    /// InProgress → PendingClosure, gated on the three closure checks.
    /// Statistics are stored provisionally; `closed_at` means requested-at
    /// until Close overwrites the whole summary.
    pub fn request_closure(
        &self,
        id: &AuditId,
        actor: &UserId,
    ) -> Result<Audit, AuditServiceError> {
        let mut audit = self.load(id)?;
        guard(&audit, AuditAction::RequestClosure)?;
        ensure_lead(&audit, actor)?;

        let evaluations = self.active_evaluations(id)?;
        let plans = self.repository.action_plans_for(id)?;
        closure::ensure_closable(&audit.id, &evaluations, &plans)?;

        audit.closure = Some(ClosureSummary {
            closed_at: Utc::now(),
            closed_by: actor.clone(),
            statistics: closure::statistics(&evaluations),
            report_reference: None,
        });
        audit.status = AuditStatus::PendingClosure;
        let audit = self.persist(audit)?;
        info!(audit = %audit.id, "closure requested");
        Ok(audit)
    }

    /// Stamps the human checkpoint between validation and irreversible
    /// closure. Status stays PendingClosure.
    pub fn approve_closure(
        &self,
        id: &AuditId,
        actor: &UserId,
    ) -> Result<Audit, AuditServiceError> {
        let mut audit = self.load(id)?;
        guard(&audit, AuditAction::ApproveClosure)?;
        ensure_lead(&audit, actor)?;
        audit.closure_approved_at = Some(Utc::now());
        audit.closure_approved_by = Some(actor.clone());
        let audit = self.persist(audit)?;
        info!(audit = %audit.id, "closure approved");
        Ok(audit)
    }

    /// PendingClosure → Closed. Requires a prior approval stamp, re-runs
    /// the closure checks against current state, and recomputes statistics
    /// fresh rather than trusting the ones stored at request time.
    pub fn close(
        &self,
        id: &AuditId,
        actor: &UserId,
        command: CloseAudit,
    ) -> Result<Audit, AuditServiceError> {
        let mut audit = self.load(id)?;
        guard(&audit, AuditAction::Close)?;
        ensure_lead(&audit, actor)?;
        if audit.closure_approved_at.is_none() {
            return Err(AuditValidationError::ClosureNotApproved(audit.id.clone()).into());
        }

        let evaluations = self.active_evaluations(id)?;
        let plans = self.repository.action_plans_for(id)?;
        closure::ensure_closable(&audit.id, &evaluations, &plans)?;

        let now = Utc::now();
        audit.closure = Some(ClosureSummary {
            closed_at: now,
            closed_by: actor.clone(),
            statistics: closure::statistics(&evaluations),
            report_reference: command.report_reference,
        });
        if audit.end_date.is_none() {
            audit.end_date = Some(now.date_naive());
        }
        audit.status = AuditStatus::Closed;
        let audit = self.persist(audit)?;
        info!(audit = %audit.id, "audit closed");
        self.notifier.publish(AuditNotice::closed(&audit))?;
        Ok(audit)
    }

    /// Any non-terminal state → Cancelled, recording the prior status.
    pub fn cancel(
        &self,
        id: &AuditId,
        actor: &UserId,
        command: CancelAudit,
    ) -> Result<Audit, AuditServiceError> {
        let mut audit = self.load(id)?;
        guard(&audit, AuditAction::Cancel)?;
        if !command.elevated {
            ensure_lead(&audit, actor)?;
        }
        if command.reason.trim().is_empty() {
            return Err(AuditValidationError::BlankReason.into());
        }

        audit.cancellation = Some(CancellationRecord {
            cancelled_at: Utc::now(),
            cancelled_by: actor.clone(),
            reason: command.reason.clone(),
            previous_status: audit.status,
        });
        // Closure metadata belongs to PendingClosure and Closed only; a
        // cancellation interrupting a pending closure discards it.
        audit.closure = None;
        audit.closure_approved_at = None;
        audit.closure_approved_by = None;
        audit.status = AuditStatus::Cancelled;
        let audit = self.persist(audit)?;
        info!(audit = %audit.id, "audit cancelled");
        self.notifier
            .publish(AuditNotice::cancelled(&audit, &command.reason))?;
        Ok(audit)
    }

    /// Validates, normalizes, and atomically replaces the audit's weight
    /// set. Only the lead may configure, and only before execution starts.
    pub fn configure_weights(
        &self,
        id: &AuditId,
        actor: &UserId,
        submission: WeightSubmission,
    ) -> Result<Vec<StandardWeight>, AuditServiceError> {
        let audit = self.load(id)?;
        self.replace_weights_for(audit, actor, submission)
    }

    /// Derives a submission from another audit's stored weights and pushes
    /// it through the same pipeline as a direct configuration. The mapped
    /// values are stored as-is (manual mode) so the adjustment factor
    /// survives persistence.
    pub fn copy_weights(
        &self,
        id: &AuditId,
        actor: &UserId,
        command: WeightCopy,
    ) -> Result<Vec<StandardWeight>, AuditServiceError> {
        let audit = self.load(id)?;
        let source_weights = self.resolve_source_weights(&audit, &command)?;
        let evaluated = self.evaluated_standards(id)?;
        if evaluated.is_empty() {
            return Err(WeightError::NoEvaluations {
                audit_id: audit.id.clone(),
            }
            .into());
        }
        let entries =
            weights::map_source(&source_weights, &evaluated, command.adjustment_factor)?;
        self.replace_weights_for(
            audit,
            actor,
            WeightSubmission {
                entries,
                normalization: WeightNormalization::Manual,
            },
        )
    }

    /// Recomputes the denormalized progress and score from the current
    /// evaluation set and writes them back onto the aggregate.
    pub fn update_progress(
        &self,
        id: &AuditId,
        actor: &UserId,
    ) -> Result<Audit, AuditServiceError> {
        let mut audit = self.load(id)?;
        let evaluations = self.active_evaluations(id)?;
        let snapshot = progress::measure(&evaluations);
        audit.progress = snapshot.progress;
        audit.total_score = snapshot.total_score;
        let audit = self.persist(audit)?;
        debug!(
            audit = %audit.id,
            actor = %actor,
            progress = audit.progress,
            total_score = audit.total_score,
            "progress refreshed"
        );
        Ok(audit)
    }

    /// Records one evaluation's assessment and refreshes the aggregate
    /// metrics in the same unit of work.
    pub fn record_assessment(
        &self,
        id: &AuditId,
        evaluation_id: &EvaluationId,
        actor: &UserId,
        command: EvaluationAssessment,
    ) -> Result<Evaluation, AuditServiceError> {
        let mut audit = self.load(id)?;
        if audit.status != AuditStatus::InProgress {
            return Err(AuditValidationError::NotInProgress(audit.id.clone()).into());
        }
        if !audit.is_lead(actor) && !audit.team_member_ids.contains(actor) {
            return Err(AuditServiceError::NotOnTeam {
                audit: audit.id.clone(),
                user: actor.clone(),
            });
        }

        let mut evaluation = self
            .repository
            .fetch_evaluation(evaluation_id)?
            .filter(|evaluation| evaluation.audit_id == audit.id && evaluation.is_active)
            .ok_or_else(|| AuditServiceError::EvaluationNotFound(evaluation_id.clone()))?;

        if let Some(level) = command.maturity_level {
            evaluation.score = level.score;
            evaluation.maturity_level = Some(level);
        }
        if let Some(score) = command.score {
            evaluation.score = score;
        }
        if let Some(status) = command.compliance_status {
            evaluation.compliance_status = Some(status);
        }
        if command.completed {
            evaluation.is_completed = true;
        }
        self.repository.update_evaluation(&evaluation)?;

        let evaluations = self.active_evaluations(id)?;
        let snapshot = progress::measure(&evaluations);
        audit.progress = snapshot.progress;
        audit.total_score = snapshot.total_score;
        self.persist(audit)?;
        debug!(
            audit = %id,
            evaluation = %evaluation.id,
            actor = %actor,
            "assessment recorded"
        );
        Ok(evaluation)
    }

    fn load(&self, id: &AuditId) -> Result<Audit, AuditServiceError> {
        match self.repository.fetch(id)? {
            Some(audit) if !audit.deleted => Ok(audit),
            _ => Err(AuditServiceError::AuditNotFound(id.clone())),
        }
    }

    fn persist(&self, mut audit: Audit) -> Result<Audit, AuditServiceError> {
        audit.version += 1;
        self.repository.update(&audit)?;
        Ok(audit)
    }

    fn ensure_known_user(&self, user: &UserId) -> Result<(), AuditServiceError> {
        if self.users.exists(user)? {
            Ok(())
        } else {
            Err(AuditValidationError::UnknownUser(user.clone()).into())
        }
    }

    fn active_evaluations(&self, id: &AuditId) -> Result<Vec<Evaluation>, AuditServiceError> {
        let mut evaluations = self.repository.evaluations_for(id)?;
        evaluations.retain(|evaluation| evaluation.is_active);
        Ok(evaluations)
    }

    fn evaluated_standards(&self, id: &AuditId) -> Result<BTreeSet<StandardId>, AuditServiceError> {
        Ok(self
            .active_evaluations(id)?
            .into_iter()
            .map(|evaluation| evaluation.standard_id)
            .collect())
    }

    /// One evaluation per auditable template standard, or, for a FollowUp
    /// audit given a source, one per open non-conformity of the source,
    /// linked back to the evaluation it follows up.
    fn generate_evaluations(
        &self,
        audit: &Audit,
        source_audit_id: Option<&AuditId>,
    ) -> Result<Vec<Evaluation>, AuditServiceError> {
        if audit.audit_type == AuditType::FollowUp {
            if let Some(source_id) = source_audit_id {
                let source = self.load(source_id)?;
                let inherited: Vec<Evaluation> = self
                    .active_evaluations(&source.id)?
                    .into_iter()
                    .filter(|evaluation| {
                        evaluation
                            .compliance_status
                            .is_some_and(ComplianceStatus::is_non_conformity)
                    })
                    .map(|evaluation| Evaluation {
                        id: next_evaluation_id(),
                        audit_id: audit.id.clone(),
                        standard_id: evaluation.standard_id.clone(),
                        maturity_level: None,
                        compliance_status: None,
                        score: 0.0,
                        is_completed: false,
                        previous_evaluation_id: Some(evaluation.id.clone()),
                        is_active: true,
                    })
                    .collect();
                if inherited.is_empty() {
                    return Err(
                        AuditValidationError::NoFindingsToInherit(source.id.clone()).into()
                    );
                }
                return Ok(inherited);
            }
        }

        let standards = self.standards.template_standards(&audit.template_id)?;
        let generated: Vec<Evaluation> = standards
            .into_iter()
            .filter(|standard| standard.auditable)
            .map(|standard| Evaluation {
                id: next_evaluation_id(),
                audit_id: audit.id.clone(),
                standard_id: standard.id,
                maturity_level: None,
                compliance_status: None,
                score: 0.0,
                is_completed: false,
                previous_evaluation_id: None,
                is_active: true,
            })
            .collect();
        if generated.is_empty() {
            return Err(AuditValidationError::EmptyTemplate(audit.template_id.clone()).into());
        }
        Ok(generated)
    }

    fn replace_weights_for(
        &self,
        audit: Audit,
        actor: &UserId,
        submission: WeightSubmission,
    ) -> Result<Vec<StandardWeight>, AuditServiceError> {
        ensure_lead(&audit, actor)?;
        if !matches!(audit.status, AuditStatus::Draft | AuditStatus::Planned) {
            return Err(WeightError::NotConfigurable {
                audit_id: audit.id.clone(),
                status: audit.status,
            }
            .into());
        }

        let evaluated = self.evaluated_standards(&audit.id)?;
        let catalog = self.standards.template_standards(&audit.template_id)?;
        let rows = weights::plan_replacement(
            &audit,
            submission,
            &evaluated,
            &catalog,
            actor,
            Utc::now(),
        )?;

        let id = audit.id.clone();
        self.persist(audit)?;
        self.repository.replace_weights(&id, &rows)?;
        info!(audit = %id, entries = rows.len(), "weights replaced");
        Ok(rows)
    }

    /// Source lookup for a copy. Template mode walks the template's audits
    /// newest-first and takes the first one holding any weights, whatever
    /// that audit stored; previous-audit mode uses the explicit id.
    fn resolve_source_weights(
        &self,
        audit: &Audit,
        command: &WeightCopy,
    ) -> Result<Vec<StandardWeight>, AuditServiceError> {
        match command.source {
            WeightCopySource::Template => {
                let mut candidates = self.repository.audits_by_template(&audit.template_id)?;
                candidates.retain(|candidate| !candidate.deleted && candidate.id != audit.id);
                candidates.sort_by(|a, b| {
                    b.created_at
                        .cmp(&a.created_at)
                        .then_with(|| b.id.0.cmp(&a.id.0))
                });
                for candidate in candidates {
                    let weights = self.repository.weights_for(&candidate.id)?;
                    if !weights.is_empty() {
                        return Ok(weights);
                    }
                }
                Err(WeightError::NoTemplateSource {
                    template_id: audit.template_id.clone(),
                }
                .into())
            }
            WeightCopySource::PreviousAudit => {
                let source_id = command
                    .source_audit_id
                    .as_ref()
                    .ok_or(WeightError::MissingSourceAudit)?;
                let source = self.load(source_id)?;
                let weights = self.repository.weights_for(&source.id)?;
                if weights.is_empty() {
                    return Err(WeightError::EmptySource {
                        audit_id: source.id.clone(),
                    }
                    .into());
                }
                Ok(weights)
            }
        }
    }
}

fn guard(audit: &Audit, action: AuditAction) -> Result<(), AuditServiceError> {
    if action.permits(audit.status) {
        return Ok(());
    }
    let required = action
        .allowed_from()
        .iter()
        .map(|status| status.label())
        .collect::<Vec<_>>()
        .join(" or ");
    Err(AuditServiceError::InvalidTransition {
        audit: audit.id.clone(),
        action,
        current: audit.status,
        required,
    })
}

fn ensure_lead(audit: &Audit, actor: &UserId) -> Result<(), AuditServiceError> {
    if audit.is_lead(actor) {
        return Ok(());
    }
    Err(AuditServiceError::NotLeadAuditor {
        audit: audit.id.clone(),
        user: actor.clone(),
    })
}
