use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::closure::ClosureBlocked;
use super::domain::{
    AuditId, AuditType, ComplianceStatus, EvaluationId, MaturityLevel, OrganizationId, TemplateId,
    UserId,
};
use super::repository::{
    AuditNotifier, AuditRepository, RepositoryError, StandardsDirectory, UserDirectory,
};
use super::service::{
    AuditService, AuditServiceError, CancelAudit, CloseAudit, CreateAudit, EvaluationAssessment,
    PlanAudit,
};
use super::weights::{
    WeightCopy, WeightCopySource, WeightEntry, WeightNormalization, WeightSubmission,
};

/// Router builder exposing the audit lifecycle, weight, and progress
/// endpoints. The acting user travels in the request payload; role checks
/// beyond "is the lead auditor" belong to upstream middleware.
pub fn audit_router<R, U, S, N>(service: Arc<AuditService<R, U, S, N>>) -> Router
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    Router::new()
        .route("/api/v1/audits", post(create_handler::<R, U, S, N>))
        .route(
            "/api/v1/audits/:audit_id",
            get(summary_handler::<R, U, S, N>).delete(delete_handler::<R, U, S, N>),
        )
        .route(
            "/api/v1/audits/:audit_id/plan",
            post(plan_handler::<R, U, S, N>),
        )
        .route(
            "/api/v1/audits/:audit_id/start",
            post(start_handler::<R, U, S, N>),
        )
        .route(
            "/api/v1/audits/:audit_id/request-closure",
            post(request_closure_handler::<R, U, S, N>),
        )
        .route(
            "/api/v1/audits/:audit_id/approve-closure",
            post(approve_closure_handler::<R, U, S, N>),
        )
        .route(
            "/api/v1/audits/:audit_id/close",
            post(close_handler::<R, U, S, N>),
        )
        .route(
            "/api/v1/audits/:audit_id/cancel",
            post(cancel_handler::<R, U, S, N>),
        )
        .route(
            "/api/v1/audits/:audit_id/weights",
            get(weights_handler::<R, U, S, N>).post(configure_weights_handler::<R, U, S, N>),
        )
        .route(
            "/api/v1/audits/:audit_id/weights/copy",
            post(copy_weights_handler::<R, U, S, N>),
        )
        .route(
            "/api/v1/audits/:audit_id/progress",
            post(progress_handler::<R, U, S, N>),
        )
        .route(
            "/api/v1/audits/:audit_id/evaluations",
            get(evaluations_handler::<R, U, S, N>),
        )
        .route(
            "/api/v1/audits/:audit_id/evaluations/:evaluation_id/assessment",
            post(assessment_handler::<R, U, S, N>),
        )
        .with_state(service)
}

#[derive(Deserialize)]
pub(crate) struct ActorBody {
    actor: UserId,
}

#[derive(Deserialize)]
pub(crate) struct CreateBody {
    actor: UserId,
    name: String,
    audit_type: AuditType,
    template_id: TemplateId,
    framework: String,
    organization_id: OrganizationId,
    lead_auditor_id: UserId,
}

#[derive(Deserialize)]
pub(crate) struct PlanBody {
    actor: UserId,
    lead_auditor_id: UserId,
    team_member_ids: Vec<UserId>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    scope: String,
    #[serde(default)]
    organization_id: Option<OrganizationId>,
    #[serde(default)]
    source_audit_id: Option<AuditId>,
}

#[derive(Deserialize)]
pub(crate) struct CloseBody {
    actor: UserId,
    #[serde(default)]
    report_reference: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct CancelBody {
    actor: UserId,
    reason: String,
    #[serde(default)]
    elevated: bool,
}

#[derive(Deserialize)]
pub(crate) struct WeightsBody {
    actor: UserId,
    entries: Vec<WeightEntry>,
    #[serde(default)]
    normalization: WeightNormalization,
}

#[derive(Deserialize)]
pub(crate) struct CopyBody {
    actor: UserId,
    source: WeightCopySource,
    #[serde(default)]
    source_audit_id: Option<AuditId>,
    #[serde(default = "default_adjustment_factor")]
    adjustment_factor: f64,
}

fn default_adjustment_factor() -> f64 {
    1.0
}

#[derive(Deserialize)]
pub(crate) struct AssessmentBody {
    actor: UserId,
    #[serde(default)]
    maturity_level: Option<MaturityLevel>,
    #[serde(default)]
    compliance_status: Option<ComplianceStatus>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    completed: bool,
}

pub(crate) async fn create_handler<R, U, S, N>(
    State(service): State<Arc<AuditService<R, U, S, N>>>,
    axum::Json(body): axum::Json<CreateBody>,
) -> Response
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    let command = CreateAudit {
        name: body.name,
        audit_type: body.audit_type,
        template_id: body.template_id,
        framework: body.framework,
        organization_id: body.organization_id,
        lead_auditor_id: body.lead_auditor_id,
    };
    match service.create(&body.actor, command) {
        Ok(audit) => (StatusCode::CREATED, axum::Json(audit)).into_response(),
        Err(error) => failure(&error),
    }
}

pub(crate) async fn summary_handler<R, U, S, N>(
    State(service): State<Arc<AuditService<R, U, S, N>>>,
    Path(audit_id): Path<String>,
) -> Response
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    match service.get(&AuditId(audit_id)) {
        Ok(audit) => (StatusCode::OK, axum::Json(audit.status_view())).into_response(),
        Err(error) => failure(&error),
    }
}

pub(crate) async fn delete_handler<R, U, S, N>(
    State(service): State<Arc<AuditService<R, U, S, N>>>,
    Path(audit_id): Path<String>,
    axum::Json(body): axum::Json<ActorBody>,
) -> Response
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    match service.delete(&AuditId(audit_id), &body.actor) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => failure(&error),
    }
}

pub(crate) async fn plan_handler<R, U, S, N>(
    State(service): State<Arc<AuditService<R, U, S, N>>>,
    Path(audit_id): Path<String>,
    axum::Json(body): axum::Json<PlanBody>,
) -> Response
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    let command = PlanAudit {
        lead_auditor_id: body.lead_auditor_id,
        team_member_ids: body.team_member_ids,
        start_date: body.start_date,
        end_date: body.end_date,
        scope: body.scope,
        organization_id: body.organization_id,
        source_audit_id: body.source_audit_id,
    };
    match service.plan(&AuditId(audit_id), &body.actor, command) {
        Ok(audit) => (StatusCode::OK, axum::Json(audit)).into_response(),
        Err(error) => failure(&error),
    }
}

pub(crate) async fn start_handler<R, U, S, N>(
    State(service): State<Arc<AuditService<R, U, S, N>>>,
    Path(audit_id): Path<String>,
    axum::Json(body): axum::Json<ActorBody>,
) -> Response
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    match service.start(&AuditId(audit_id), &body.actor) {
        Ok(audit) => (StatusCode::OK, axum::Json(audit)).into_response(),
        Err(error) => failure(&error),
    }
}

pub(crate) async fn request_closure_handler<R, U, S, N>(
    State(service): State<Arc<AuditService<R, U, S, N>>>,
    Path(audit_id): Path<String>,
    axum::Json(body): axum::Json<ActorBody>,
) -> Response
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    match service.request_closure(&AuditId(audit_id), &body.actor) {
        Ok(audit) => (StatusCode::OK, axum::Json(audit)).into_response(),
        Err(error) => failure(&error),
    }
}

pub(crate) async fn approve_closure_handler<R, U, S, N>(
    State(service): State<Arc<AuditService<R, U, S, N>>>,
    Path(audit_id): Path<String>,
    axum::Json(body): axum::Json<ActorBody>,
) -> Response
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    match service.approve_closure(&AuditId(audit_id), &body.actor) {
        Ok(audit) => (StatusCode::OK, axum::Json(audit)).into_response(),
        Err(error) => failure(&error),
    }
}

pub(crate) async fn close_handler<R, U, S, N>(
    State(service): State<Arc<AuditService<R, U, S, N>>>,
    Path(audit_id): Path<String>,
    axum::Json(body): axum::Json<CloseBody>,
) -> Response
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    let command = CloseAudit {
        report_reference: body.report_reference,
    };
    match service.close(&AuditId(audit_id), &body.actor, command) {
        Ok(audit) => (StatusCode::OK, axum::Json(audit)).into_response(),
        Err(error) => failure(&error),
    }
}

pub(crate) async fn cancel_handler<R, U, S, N>(
    State(service): State<Arc<AuditService<R, U, S, N>>>,
    Path(audit_id): Path<String>,
    axum::Json(body): axum::Json<CancelBody>,
) -> Response
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    let command = CancelAudit {
        reason: body.reason,
        elevated: body.elevated,
    };
    match service.cancel(&AuditId(audit_id), &body.actor, command) {
        Ok(audit) => (StatusCode::OK, axum::Json(audit)).into_response(),
        Err(error) => failure(&error),
    }
}

pub(crate) async fn weights_handler<R, U, S, N>(
    State(service): State<Arc<AuditService<R, U, S, N>>>,
    Path(audit_id): Path<String>,
) -> Response
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    match service.weights(&AuditId(audit_id)) {
        Ok(weights) => (StatusCode::OK, axum::Json(weights)).into_response(),
        Err(error) => failure(&error),
    }
}

pub(crate) async fn configure_weights_handler<R, U, S, N>(
    State(service): State<Arc<AuditService<R, U, S, N>>>,
    Path(audit_id): Path<String>,
    axum::Json(body): axum::Json<WeightsBody>,
) -> Response
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    let submission = WeightSubmission {
        entries: body.entries,
        normalization: body.normalization,
    };
    match service.configure_weights(&AuditId(audit_id), &body.actor, submission) {
        Ok(weights) => (StatusCode::OK, axum::Json(weights)).into_response(),
        Err(error) => failure(&error),
    }
}

pub(crate) async fn copy_weights_handler<R, U, S, N>(
    State(service): State<Arc<AuditService<R, U, S, N>>>,
    Path(audit_id): Path<String>,
    axum::Json(body): axum::Json<CopyBody>,
) -> Response
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    let command = WeightCopy {
        source: body.source,
        source_audit_id: body.source_audit_id,
        adjustment_factor: body.adjustment_factor,
    };
    match service.copy_weights(&AuditId(audit_id), &body.actor, command) {
        Ok(weights) => (StatusCode::OK, axum::Json(weights)).into_response(),
        Err(error) => failure(&error),
    }
}

pub(crate) async fn progress_handler<R, U, S, N>(
    State(service): State<Arc<AuditService<R, U, S, N>>>,
    Path(audit_id): Path<String>,
    axum::Json(body): axum::Json<ActorBody>,
) -> Response
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    match service.update_progress(&AuditId(audit_id), &body.actor) {
        Ok(audit) => (StatusCode::OK, axum::Json(audit)).into_response(),
        Err(error) => failure(&error),
    }
}

pub(crate) async fn evaluations_handler<R, U, S, N>(
    State(service): State<Arc<AuditService<R, U, S, N>>>,
    Path(audit_id): Path<String>,
) -> Response
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    match service.evaluations(&AuditId(audit_id)) {
        Ok(evaluations) => (StatusCode::OK, axum::Json(evaluations)).into_response(),
        Err(error) => failure(&error),
    }
}

pub(crate) async fn assessment_handler<R, U, S, N>(
    State(service): State<Arc<AuditService<R, U, S, N>>>,
    Path((audit_id, evaluation_id)): Path<(String, String)>,
    axum::Json(body): axum::Json<AssessmentBody>,
) -> Response
where
    R: AuditRepository + 'static,
    U: UserDirectory + 'static,
    S: StandardsDirectory + 'static,
    N: AuditNotifier + 'static,
{
    let command = EvaluationAssessment {
        maturity_level: body.maturity_level,
        compliance_status: body.compliance_status,
        score: body.score,
        completed: body.completed,
    };
    match service.record_assessment(
        &AuditId(audit_id),
        &EvaluationId(evaluation_id),
        &body.actor,
        command,
    ) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Err(error) => failure(&error),
    }
}

/// Maps the service taxonomy onto status codes. Closure blockers carry a
/// structured detail object so clients can render the specific obstacle.
fn failure(error: &AuditServiceError) -> Response {
    match error {
        AuditServiceError::AuditNotFound(_) | AuditServiceError::EvaluationNotFound(_) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        AuditServiceError::NotLeadAuditor { .. } | AuditServiceError::NotOnTeam { .. } => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::FORBIDDEN, axum::Json(payload)).into_response()
        }
        AuditServiceError::InvalidTransition { .. } => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        AuditServiceError::ClosureBlocked(blocked) => {
            let payload = json!({
                "error": blocked.to_string(),
                "detail": closure_detail(blocked),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        AuditServiceError::Validation(_) | AuditServiceError::Weights(_) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        AuditServiceError::Repository(RepositoryError::Conflict(_))
        | AuditServiceError::Repository(RepositoryError::StaleVersion(_)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        AuditServiceError::Repository(RepositoryError::Missing(_))
        | AuditServiceError::Repository(RepositoryError::MissingEvaluation(_)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        AuditServiceError::Repository(RepositoryError::Unavailable(_))
        | AuditServiceError::Directory(_)
        | AuditServiceError::Notify(_) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}

fn closure_detail(blocked: &ClosureBlocked) -> serde_json::Value {
    match blocked {
        ClosureBlocked::NothingToClose { .. } => json!({
            "reason": "nothing_to_close",
        }),
        ClosureBlocked::IncompleteEvaluations { pending, .. } => json!({
            "reason": "incomplete_evaluations",
            "pending": pending,
        }),
        ClosureBlocked::UnclassifiedEvaluations { unclassified, .. } => json!({
            "reason": "unclassified_evaluations",
            "unclassified": unclassified,
        }),
        ClosureBlocked::UnremediatedMajorFindings { standard_ids, .. } => json!({
            "reason": "unremediated_major_findings",
            "standard_ids": standard_ids,
        }),
    }
}
