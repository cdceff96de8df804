use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::audits::domain::{
    ActionPlan, ActionPlanId, ActionPlanStatus, Audit, AuditId, AuditStatus, AuditType,
    ComplianceStatus, Evaluation, EvaluationId, OrganizationId, StandardId, StandardWeight,
    TemplateId, UserId,
};
use crate::audits::repository::{
    AuditNotice, AuditNotifier, AuditRepository, DirectoryError, NotifyError, RepositoryError,
    Standard, StandardsDirectory, UserDirectory,
};
use crate::audits::service::{AuditService, CreateAudit, EvaluationAssessment, PlanAudit};
use crate::audits::weights::WeightEntry;

pub(super) fn lead() -> UserId {
    UserId("lead-1".to_string())
}

pub(super) fn auditor() -> UserId {
    UserId("aud-2".to_string())
}

pub(super) fn reviewer() -> UserId {
    UserId("aud-3".to_string())
}

pub(super) fn other_lead() -> UserId {
    UserId("lead-9".to_string())
}

pub(super) fn template() -> TemplateId {
    TemplateId("tpl-iso27001".to_string())
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Catalog served by the standards directory fake: three auditable Annex A
/// controls plus a context clause that never receives evaluations.
pub(super) fn standards_catalog() -> Vec<Standard> {
    vec![
        Standard {
            id: StandardId("cl.4".to_string()),
            template_id: template(),
            name: "Context of the organization".to_string(),
            category: None,
            display_order: 0,
            auditable: false,
        },
        Standard {
            id: StandardId("A.5.1".to_string()),
            template_id: template(),
            name: "Policies for information security".to_string(),
            category: Some("Organizational".to_string()),
            display_order: 1,
            auditable: true,
        },
        Standard {
            id: StandardId("A.6.3".to_string()),
            template_id: template(),
            name: "Information security awareness and training".to_string(),
            category: Some("People".to_string()),
            display_order: 2,
            auditable: true,
        },
        Standard {
            id: StandardId("A.8.8".to_string()),
            template_id: template(),
            name: "Management of technical vulnerabilities".to_string(),
            category: Some("Technological".to_string()),
            display_order: 3,
            auditable: true,
        },
    ]
}

pub(super) fn create_command() -> CreateAudit {
    CreateAudit {
        name: "ISMS surveillance audit".to_string(),
        audit_type: AuditType::Initial,
        template_id: template(),
        framework: "ISO 27001:2022".to_string(),
        organization_id: OrganizationId("org-acme".to_string()),
        lead_auditor_id: lead(),
    }
}

pub(super) fn plan_command() -> PlanAudit {
    PlanAudit {
        lead_auditor_id: lead(),
        team_member_ids: vec![auditor(), reviewer()],
        start_date: date(2026, 3, 2),
        end_date: date(2026, 3, 20),
        scope: "Information security controls for the Des Moines platform".to_string(),
        organization_id: None,
        source_audit_id: None,
    }
}

/// Aggregate record built directly, for seeding states the service would
/// otherwise have to walk to.
pub(super) fn audit_record(id: &str, status: AuditStatus) -> Audit {
    Audit {
        id: AuditId(id.to_string()),
        name: "ISMS surveillance audit".to_string(),
        audit_type: AuditType::Initial,
        status,
        template_id: template(),
        framework: "ISO 27001:2022".to_string(),
        organization_id: OrganizationId("org-acme".to_string()),
        lead_auditor_id: lead(),
        team_member_ids: vec![auditor(), reviewer()],
        scope: Some("Information security controls for the Des Moines platform".to_string()),
        start_date: Some(date(2026, 3, 2)),
        end_date: Some(date(2026, 3, 20)),
        progress: 0.0,
        total_score: 0.0,
        closure: None,
        closure_approved_at: None,
        closure_approved_by: None,
        cancellation: None,
        created_at: Utc::now(),
        deleted: false,
        version: 1,
    }
}

pub(super) fn subject() -> AuditId {
    AuditId("audit-under-test".to_string())
}

pub(super) fn evaluation(suffix: &str, standard: &str) -> Evaluation {
    Evaluation {
        id: EvaluationId(format!("eval-{suffix}")),
        audit_id: subject(),
        standard_id: StandardId(standard.to_string()),
        maturity_level: None,
        compliance_status: None,
        score: 0.0,
        is_completed: false,
        previous_evaluation_id: None,
        is_active: true,
    }
}

pub(super) fn assessed(
    suffix: &str,
    standard: &str,
    status: ComplianceStatus,
    score: f64,
) -> Evaluation {
    let mut evaluation = evaluation(suffix, standard);
    evaluation.compliance_status = Some(status);
    evaluation.score = score;
    evaluation.is_completed = true;
    evaluation
}

pub(super) fn action_plan(
    suffix: &str,
    audit: &AuditId,
    evaluation_id: &EvaluationId,
    status: ActionPlanStatus,
) -> ActionPlan {
    ActionPlan {
        id: ActionPlanId(format!("plan-{suffix}")),
        audit_id: audit.clone(),
        evaluation_id: evaluation_id.clone(),
        description: "Patch management remediation".to_string(),
        status,
        due_date: Some(date(2026, 4, 30)),
        responsible_id: Some(auditor()),
    }
}

pub(super) fn entry(standard: &str, weight: f64) -> WeightEntry {
    WeightEntry {
        standard_id: StandardId(standard.to_string()),
        weight,
        justification: None,
    }
}

pub(super) type MemoryService =
    AuditService<MemoryRepository, MemoryUsers, MemoryStandards, MemoryNotifier>;

pub(super) fn build_service() -> (MemoryService, Arc<MemoryRepository>, Arc<MemoryNotifier>) {
    let repository = Arc::new(MemoryRepository::default());
    let users = Arc::new(MemoryUsers::known(&["lead-1", "aud-2", "aud-3", "lead-9"]));
    let standards = Arc::new(MemoryStandards::with_catalog());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = AuditService::new(repository.clone(), users, standards, notifier.clone());
    (service, repository, notifier)
}

pub(super) fn draft_audit(service: &MemoryService) -> Audit {
    service
        .create(&lead(), create_command())
        .expect("audit registered")
}

pub(super) fn planned_audit(service: &MemoryService) -> Audit {
    let audit = draft_audit(service);
    service
        .plan(&audit.id, &lead(), plan_command())
        .expect("audit planned")
}

pub(super) fn started_audit(service: &MemoryService) -> Audit {
    let audit = planned_audit(service);
    service.start(&audit.id, &lead()).expect("audit started")
}

/// Completes and classifies every evaluation of the audit with one status.
pub(super) fn assess_all(service: &MemoryService, audit_id: &AuditId, status: ComplianceStatus) {
    for evaluation in service.evaluations(audit_id).expect("evaluations listed") {
        service
            .record_assessment(
                audit_id,
                &evaluation.id,
                &lead(),
                EvaluationAssessment {
                    maturity_level: None,
                    compliance_status: Some(status),
                    score: Some(4.0),
                    completed: true,
                },
            )
            .expect("assessment recorded");
    }
}

pub(super) fn closable_audit(service: &MemoryService) -> Audit {
    let audit = started_audit(service);
    assess_all(service, &audit.id, ComplianceStatus::Conforming);
    service.get(&audit.id).expect("audit reloaded")
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) audits: Arc<Mutex<HashMap<AuditId, Audit>>>,
    pub(super) evaluations: Arc<Mutex<HashMap<EvaluationId, Evaluation>>>,
    pub(super) plans: Arc<Mutex<Vec<ActionPlan>>>,
    pub(super) weights: Arc<Mutex<HashMap<AuditId, Vec<StandardWeight>>>>,
}

impl MemoryRepository {
    pub(super) fn add_plan(&self, plan: ActionPlan) {
        self.plans.lock().expect("plan mutex poisoned").push(plan);
    }
}

impl AuditRepository for MemoryRepository {
    fn insert(&self, audit: &Audit) -> Result<(), RepositoryError> {
        let mut guard = self.audits.lock().expect("audit mutex poisoned");
        if guard.contains_key(&audit.id) {
            return Err(RepositoryError::Conflict(audit.id.clone()));
        }
        guard.insert(audit.id.clone(), audit.clone());
        Ok(())
    }

    fn fetch(&self, id: &AuditId) -> Result<Option<Audit>, RepositoryError> {
        let guard = self.audits.lock().expect("audit mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update(&self, audit: &Audit) -> Result<(), RepositoryError> {
        let mut guard = self.audits.lock().expect("audit mutex poisoned");
        match guard.get(&audit.id) {
            None => Err(RepositoryError::Missing(audit.id.clone())),
            Some(stored) if audit.version != stored.version + 1 => {
                Err(RepositoryError::StaleVersion(audit.id.clone()))
            }
            Some(_) => {
                guard.insert(audit.id.clone(), audit.clone());
                Ok(())
            }
        }
    }

    fn audits_by_template(&self, template: &TemplateId) -> Result<Vec<Audit>, RepositoryError> {
        let guard = self.audits.lock().expect("audit mutex poisoned");
        Ok(guard
            .values()
            .filter(|audit| &audit.template_id == template && !audit.deleted)
            .cloned()
            .collect())
    }

    fn insert_evaluations(&self, evaluations: &[Evaluation]) -> Result<(), RepositoryError> {
        let mut guard = self.evaluations.lock().expect("evaluation mutex poisoned");
        for evaluation in evaluations {
            guard.insert(evaluation.id.clone(), evaluation.clone());
        }
        Ok(())
    }

    fn evaluations_for(&self, audit: &AuditId) -> Result<Vec<Evaluation>, RepositoryError> {
        let guard = self.evaluations.lock().expect("evaluation mutex poisoned");
        let mut evaluations: Vec<Evaluation> = guard
            .values()
            .filter(|evaluation| &evaluation.audit_id == audit)
            .cloned()
            .collect();
        evaluations.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(evaluations)
    }

    fn fetch_evaluation(
        &self,
        id: &EvaluationId,
    ) -> Result<Option<Evaluation>, RepositoryError> {
        let guard = self.evaluations.lock().expect("evaluation mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_evaluation(&self, evaluation: &Evaluation) -> Result<(), RepositoryError> {
        let mut guard = self.evaluations.lock().expect("evaluation mutex poisoned");
        if !guard.contains_key(&evaluation.id) {
            return Err(RepositoryError::MissingEvaluation(evaluation.id.clone()));
        }
        guard.insert(evaluation.id.clone(), evaluation.clone());
        Ok(())
    }

    fn action_plans_for(&self, audit: &AuditId) -> Result<Vec<ActionPlan>, RepositoryError> {
        let guard = self.plans.lock().expect("plan mutex poisoned");
        Ok(guard
            .iter()
            .filter(|plan| &plan.audit_id == audit)
            .cloned()
            .collect())
    }

    fn weights_for(&self, audit: &AuditId) -> Result<Vec<StandardWeight>, RepositoryError> {
        let guard = self.weights.lock().expect("weight mutex poisoned");
        Ok(guard.get(audit).cloned().unwrap_or_default())
    }

    fn replace_weights(
        &self,
        audit: &AuditId,
        weights: &[StandardWeight],
    ) -> Result<(), RepositoryError> {
        let mut guard = self.weights.lock().expect("weight mutex poisoned");
        guard.insert(audit.clone(), weights.to_vec());
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryUsers {
    known: Vec<UserId>,
}

impl MemoryUsers {
    pub(super) fn known(ids: &[&str]) -> Self {
        Self {
            known: ids.iter().map(|id| UserId(id.to_string())).collect(),
        }
    }
}

impl UserDirectory for MemoryUsers {
    fn exists(&self, user: &UserId) -> Result<bool, DirectoryError> {
        Ok(self.known.contains(user))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryStandards {
    standards: Vec<Standard>,
}

impl MemoryStandards {
    pub(super) fn with_catalog() -> Self {
        Self {
            standards: standards_catalog(),
        }
    }
}

impl StandardsDirectory for MemoryStandards {
    fn template_standards(&self, template: &TemplateId) -> Result<Vec<Standard>, DirectoryError> {
        Ok(self
            .standards
            .iter()
            .filter(|standard| &standard.template_id == template)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    notices: Arc<Mutex<Vec<AuditNotice>>>,
}

impl MemoryNotifier {
    pub(super) fn notices(&self) -> Vec<AuditNotice> {
        self.notices.lock().expect("notice mutex poisoned").clone()
    }
}

impl AuditNotifier for MemoryNotifier {
    fn publish(&self, notice: AuditNotice) -> Result<(), NotifyError> {
        self.notices
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl AuditNotifier for FailingNotifier {
    fn publish(&self, _notice: AuditNotice) -> Result<(), NotifyError> {
        Err(NotifyError::Unavailable("channel offline".to_string()))
    }
}

/// Simulates losing every optimistic write race: reads come from the inner
/// store, inserts collide, and updates always see a newer version.
pub(super) struct ConflictRepository {
    pub(super) inner: MemoryRepository,
}

impl AuditRepository for ConflictRepository {
    fn insert(&self, audit: &Audit) -> Result<(), RepositoryError> {
        Err(RepositoryError::Conflict(audit.id.clone()))
    }

    fn fetch(&self, id: &AuditId) -> Result<Option<Audit>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn update(&self, audit: &Audit) -> Result<(), RepositoryError> {
        Err(RepositoryError::StaleVersion(audit.id.clone()))
    }

    fn audits_by_template(&self, template: &TemplateId) -> Result<Vec<Audit>, RepositoryError> {
        self.inner.audits_by_template(template)
    }

    fn insert_evaluations(&self, evaluations: &[Evaluation]) -> Result<(), RepositoryError> {
        self.inner.insert_evaluations(evaluations)
    }

    fn evaluations_for(&self, audit: &AuditId) -> Result<Vec<Evaluation>, RepositoryError> {
        self.inner.evaluations_for(audit)
    }

    fn fetch_evaluation(
        &self,
        id: &EvaluationId,
    ) -> Result<Option<Evaluation>, RepositoryError> {
        self.inner.fetch_evaluation(id)
    }

    fn update_evaluation(&self, evaluation: &Evaluation) -> Result<(), RepositoryError> {
        self.inner.update_evaluation(evaluation)
    }

    fn action_plans_for(&self, audit: &AuditId) -> Result<Vec<ActionPlan>, RepositoryError> {
        self.inner.action_plans_for(audit)
    }

    fn weights_for(&self, audit: &AuditId) -> Result<Vec<StandardWeight>, RepositoryError> {
        self.inner.weights_for(audit)
    }

    fn replace_weights(
        &self,
        audit: &AuditId,
        weights: &[StandardWeight],
    ) -> Result<(), RepositoryError> {
        self.inner.replace_weights(audit, weights)
    }
}

pub(super) struct UnavailableRepository;

impl UnavailableRepository {
    fn offline<T>() -> Result<T, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl AuditRepository for UnavailableRepository {
    fn insert(&self, _audit: &Audit) -> Result<(), RepositoryError> {
        Self::offline()
    }

    fn fetch(&self, _id: &AuditId) -> Result<Option<Audit>, RepositoryError> {
        Self::offline()
    }

    fn update(&self, _audit: &Audit) -> Result<(), RepositoryError> {
        Self::offline()
    }

    fn audits_by_template(&self, _template: &TemplateId) -> Result<Vec<Audit>, RepositoryError> {
        Self::offline()
    }

    fn insert_evaluations(&self, _evaluations: &[Evaluation]) -> Result<(), RepositoryError> {
        Self::offline()
    }

    fn evaluations_for(&self, _audit: &AuditId) -> Result<Vec<Evaluation>, RepositoryError> {
        Self::offline()
    }

    fn fetch_evaluation(
        &self,
        _id: &EvaluationId,
    ) -> Result<Option<Evaluation>, RepositoryError> {
        Self::offline()
    }

    fn update_evaluation(&self, _evaluation: &Evaluation) -> Result<(), RepositoryError> {
        Self::offline()
    }

    fn action_plans_for(&self, _audit: &AuditId) -> Result<Vec<ActionPlan>, RepositoryError> {
        Self::offline()
    }

    fn weights_for(&self, _audit: &AuditId) -> Result<Vec<StandardWeight>, RepositoryError> {
        Self::offline()
    }

    fn replace_weights(
        &self,
        _audit: &AuditId,
        _weights: &[StandardWeight],
    ) -> Result<(), RepositoryError> {
        Self::offline()
    }
}

/// Reads and audit writes reach the inner store; every evaluation batch
/// insert fails as if the store dropped mid-plan.
pub(super) struct EvaluationOutageRepository {
    pub(super) inner: MemoryRepository,
}

impl AuditRepository for EvaluationOutageRepository {
    fn insert(&self, audit: &Audit) -> Result<(), RepositoryError> {
        self.inner.insert(audit)
    }

    fn fetch(&self, id: &AuditId) -> Result<Option<Audit>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn update(&self, audit: &Audit) -> Result<(), RepositoryError> {
        self.inner.update(audit)
    }

    fn audits_by_template(&self, template: &TemplateId) -> Result<Vec<Audit>, RepositoryError> {
        self.inner.audits_by_template(template)
    }

    fn insert_evaluations(&self, _evaluations: &[Evaluation]) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable(
            "evaluation store offline".to_string(),
        ))
    }

    fn evaluations_for(&self, audit: &AuditId) -> Result<Vec<Evaluation>, RepositoryError> {
        self.inner.evaluations_for(audit)
    }

    fn fetch_evaluation(
        &self,
        id: &EvaluationId,
    ) -> Result<Option<Evaluation>, RepositoryError> {
        self.inner.fetch_evaluation(id)
    }

    fn update_evaluation(&self, evaluation: &Evaluation) -> Result<(), RepositoryError> {
        self.inner.update_evaluation(evaluation)
    }

    fn action_plans_for(&self, audit: &AuditId) -> Result<Vec<ActionPlan>, RepositoryError> {
        self.inner.action_plans_for(audit)
    }

    fn weights_for(&self, audit: &AuditId) -> Result<Vec<StandardWeight>, RepositoryError> {
        self.inner.weights_for(audit)
    }

    fn replace_weights(
        &self,
        audit: &AuditId,
        weights: &[StandardWeight],
    ) -> Result<(), RepositoryError> {
        self.inner.replace_weights(audit, weights)
    }
}

/// Worst case for plan's compensation: the planning write lands, the
/// evaluation batch insert fails, and the rollback write fails too.
pub(super) struct RollbackOutageRepository {
    pub(super) inner: MemoryRepository,
    updates: AtomicU32,
}

impl RollbackOutageRepository {
    pub(super) fn new() -> Self {
        Self {
            inner: MemoryRepository::default(),
            updates: AtomicU32::new(0),
        }
    }
}

impl AuditRepository for RollbackOutageRepository {
    fn insert(&self, audit: &Audit) -> Result<(), RepositoryError> {
        self.inner.insert(audit)
    }

    fn fetch(&self, id: &AuditId) -> Result<Option<Audit>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn update(&self, audit: &Audit) -> Result<(), RepositoryError> {
        if self.updates.fetch_add(1, Ordering::SeqCst) == 0 {
            self.inner.update(audit)
        } else {
            Err(RepositoryError::Unavailable("rollback write lost".to_string()))
        }
    }

    fn audits_by_template(&self, template: &TemplateId) -> Result<Vec<Audit>, RepositoryError> {
        self.inner.audits_by_template(template)
    }

    fn insert_evaluations(&self, _evaluations: &[Evaluation]) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable(
            "evaluation store offline".to_string(),
        ))
    }

    fn evaluations_for(&self, audit: &AuditId) -> Result<Vec<Evaluation>, RepositoryError> {
        self.inner.evaluations_for(audit)
    }

    fn fetch_evaluation(
        &self,
        id: &EvaluationId,
    ) -> Result<Option<Evaluation>, RepositoryError> {
        self.inner.fetch_evaluation(id)
    }

    fn update_evaluation(&self, evaluation: &Evaluation) -> Result<(), RepositoryError> {
        self.inner.update_evaluation(evaluation)
    }

    fn action_plans_for(&self, audit: &AuditId) -> Result<Vec<ActionPlan>, RepositoryError> {
        self.inner.action_plans_for(audit)
    }

    fn weights_for(&self, audit: &AuditId) -> Result<Vec<StandardWeight>, RepositoryError> {
        self.inner.weights_for(audit)
    }

    fn replace_weights(
        &self,
        audit: &AuditId,
        weights: &[StandardWeight],
    ) -> Result<(), RepositoryError> {
        self.inner.replace_weights(audit, weights)
    }
}

pub(super) fn audit_router_with_service(service: MemoryService) -> axum::Router {
    crate::audits::audit_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
