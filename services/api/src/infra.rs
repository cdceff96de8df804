use auditflow::audits::{
    ActionPlan, Audit, AuditId, AuditNotice, AuditNotifier, AuditRepository, DirectoryError,
    Evaluation, EvaluationId, NotifyError, RepositoryError, Standard, StandardId,
    StandardWeight, StandardsDirectory, TemplateId, UserDirectory, UserId,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Template and directory entries the service boots with. The seeded catalog
/// stands in for the standards service until the real one is wired up.
pub(crate) const SEEDED_TEMPLATE: &str = "tpl-iso9001";
pub(crate) const SEEDED_USERS: &[&str] =
    &["u-elena.ruiz", "u-marco.pena", "u-alba.ferrer", "u-david.soto"];

pub(crate) fn seeded_users() -> SeededUserDirectory {
    SeededUserDirectory {
        known: SEEDED_USERS.iter().map(|id| UserId(id.to_string())).collect(),
    }
}

pub(crate) fn seeded_standards() -> SeededStandardsDirectory {
    let template = TemplateId(SEEDED_TEMPLATE.to_string());
    let clause = |id: &str, name: &str, category: Option<&str>, order: u32, auditable: bool| {
        Standard {
            id: StandardId(id.to_string()),
            template_id: template.clone(),
            name: name.to_string(),
            category: category.map(str::to_string),
            display_order: order,
            auditable,
        }
    };
    SeededStandardsDirectory {
        standards: vec![
            clause("4.1", "Understanding the organization and its context", None, 0, false),
            clause("7.2", "Competence", Some("Support"), 1, true),
            clause(
                "8.5.1",
                "Control of production and service provision",
                Some("Operation"),
                2,
                true,
            ),
            clause(
                "9.1",
                "Monitoring, measurement, analysis and evaluation",
                Some("Performance evaluation"),
                3,
                true,
            ),
            clause(
                "10.2",
                "Nonconformity and corrective action",
                Some("Improvement"),
                4,
                true,
            ),
        ],
    }
}

/// In-memory audit store. Writes honor the optimistic contract of the
/// repository port: `update` only lands when the incoming version is exactly
/// one ahead of the stored record.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAuditRepository {
    audits: Arc<Mutex<HashMap<AuditId, Audit>>>,
    evaluations: Arc<Mutex<HashMap<EvaluationId, Evaluation>>>,
    plans: Arc<Mutex<Vec<ActionPlan>>>,
    weights: Arc<Mutex<HashMap<AuditId, Vec<StandardWeight>>>>,
}

impl InMemoryAuditRepository {
    /// Plan workflow endpoints live outside this service; the demo seeds
    /// remediation records through this side door.
    pub(crate) fn add_action_plan(&self, plan: ActionPlan) {
        self.plans.lock().expect("plan mutex poisoned").push(plan);
    }
}

impl AuditRepository for InMemoryAuditRepository {
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
pub(crate) struct SeededUserDirectory {
    known: Vec<UserId>,
}

impl UserDirectory for SeededUserDirectory {
    fn exists(&self, user: &UserId) -> Result<bool, DirectoryError> {
        Ok(self.known.contains(user))
    }
}

#[derive(Default, Clone)]
pub(crate) struct SeededStandardsDirectory {
    standards: Vec<Standard>,
}

impl StandardsDirectory for SeededStandardsDirectory {
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
pub(crate) struct InMemoryAuditNotifier {
    notices: Arc<Mutex<Vec<AuditNotice>>>,
}

impl InMemoryAuditNotifier {
    pub(crate) fn notices(&self) -> Vec<AuditNotice> {
        self.notices.lock().expect("notice mutex poisoned").clone()
    }
}

impl AuditNotifier for InMemoryAuditNotifier {
    fn publish(&self, notice: AuditNotice) -> Result<(), NotifyError> {
        self.notices
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
