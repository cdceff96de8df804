use crate::infra::{
    seeded_standards, seeded_users, InMemoryAuditNotifier, InMemoryAuditRepository,
    SEEDED_TEMPLATE, SEEDED_USERS,
};
use auditflow::audits::{
    ActionPlan, ActionPlanId, ActionPlanStatus, AuditService, AuditType, CloseAudit,
    ComplianceStatus, CreateAudit, EvaluationAssessment, OrganizationId, PlanAudit, TemplateId,
    UserId, WeightCopy, WeightCopySource, WeightEntry, WeightNormalization, WeightSubmission,
};
use auditflow::error::AppError;
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Scheduled start date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start_date: Option<NaiveDate>,
    /// Scheduled end date (YYYY-MM-DD). Defaults to start_date + 14 days.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) end_date: Option<NaiveDate>,
    /// Record every evaluation as conforming and skip the remediation portion.
    #[arg(long)]
    pub(crate) all_conforming: bool,
}

/// Walks one audit through the whole lifecycle against in-memory ports,
/// printing what an operator would see at each step.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        start_date,
        end_date,
        all_conforming,
    } = args;

    let start = start_date.unwrap_or_else(|| Local::now().date_naive());
    let end = end_date.unwrap_or(start + Duration::days(14));

    let repository = Arc::new(InMemoryAuditRepository::default());
    let notifier = Arc::new(InMemoryAuditNotifier::default());
    let service = AuditService::new(
        repository.clone(),
        Arc::new(seeded_users()),
        Arc::new(seeded_standards()),
        notifier.clone(),
    );

    let lead = UserId(SEEDED_USERS[0].to_string());
    let team = vec![
        UserId(SEEDED_USERS[1].to_string()),
        UserId(SEEDED_USERS[2].to_string()),
    ];

    println!("Audit lifecycle demo");

    let audit = service.create(
        &lead,
        CreateAudit {
            name: "QMS recertification audit".to_string(),
            audit_type: AuditType::Recertification,
            template_id: TemplateId(SEEDED_TEMPLATE.to_string()),
            framework: "ISO 9001:2015".to_string(),
            organization_id: OrganizationId("org-meridian".to_string()),
            lead_auditor_id: lead.clone(),
        },
    )?;
    println!("- Registered {} ({})", audit.id, audit.status.label());

    let audit = service.plan(
        &audit.id,
        &lead,
        PlanAudit {
            lead_auditor_id: lead.clone(),
            team_member_ids: team.clone(),
            start_date: start,
            end_date: end,
            scope: "Production and quality management processes at the Valencia plant"
                .to_string(),
            organization_id: None,
            source_audit_id: None,
        },
    )?;
    let evaluations = service.evaluations(&audit.id)?;
    println!(
        "- Planned {} -> {} evaluations, window {} -> {}",
        audit.id,
        evaluations.len(),
        start,
        end
    );

    let multipliers = [3.0, 1.0, 2.0, 1.5];
    let entries = evaluations
        .iter()
        .enumerate()
        .map(|(index, evaluation)| WeightEntry {
            standard_id: evaluation.standard_id.clone(),
            weight: multipliers[index % multipliers.len()],
            justification: None,
        })
        .collect();
    let weights = service.configure_weights(
        &audit.id,
        &lead,
        WeightSubmission {
            entries,
            normalization: WeightNormalization::Auto,
        },
    )?;
    println!("- Configured {} weights (auto-normalized):", weights.len());
    for weight in &weights {
        println!("    {} -> {:.3}", weight.standard_id, weight.weight);
    }

    let audit = service.start(&audit.id, &lead)?;
    println!("- Started ({})", audit.status.label());

    let outcomes: Vec<(ComplianceStatus, f64)> = if all_conforming {
        evaluations
            .iter()
            .map(|_| (ComplianceStatus::Conforming, 4.5))
            .collect()
    } else {
        vec![
            (ComplianceStatus::Conforming, 4.5),
            (ComplianceStatus::MinorNonConformity, 2.5),
            (ComplianceStatus::MajorNonConformity, 1.0),
            (ComplianceStatus::Conforming, 4.0),
        ]
    };

    // Everything but the last evaluation, so the closure gate has something
    // to reject.
    for (evaluation, (status, score)) in evaluations.iter().zip(&outcomes).take(outcomes.len() - 1)
    {
        service.record_assessment(
            &audit.id,
            &evaluation.id,
            &lead,
            EvaluationAssessment {
                maturity_level: None,
                compliance_status: Some(*status),
                score: Some(*score),
                completed: true,
            },
        )?;
    }

    match service.request_closure(&audit.id, &lead) {
        Err(err) => println!("- Early closure attempt rejected: {err}"),
        Ok(_) => println!("- Early closure attempt unexpectedly succeeded"),
    }

    let (last_evaluation, (last_status, last_score)) = evaluations
        .iter()
        .zip(&outcomes)
        .last()
        .expect("seeded template yields evaluations");
    service.record_assessment(
        &audit.id,
        &last_evaluation.id,
        &lead,
        EvaluationAssessment {
            maturity_level: None,
            compliance_status: Some(*last_status),
            score: Some(*last_score),
            completed: true,
        },
    )?;

    if !all_conforming {
        let major = evaluations
            .iter()
            .zip(&outcomes)
            .find(|(_, (status, _))| *status == ComplianceStatus::MajorNonConformity)
            .map(|(evaluation, _)| evaluation)
            .expect("scripted outcomes include a major finding");
        repository.add_action_plan(ActionPlan {
            id: ActionPlanId("plan-demo-1".to_string()),
            audit_id: audit.id.clone(),
            evaluation_id: major.id.clone(),
            description: "Corrective action for production control gaps".to_string(),
            status: ActionPlanStatus::Approved,
            due_date: Some(end + Duration::days(30)),
            responsible_id: Some(team[0].clone()),
        });
        println!("- Approved remediation plan covers the major finding");
    }

    let audit = service.update_progress(&audit.id, &lead)?;
    println!(
        "- Progress {:.2}% | average score {:.2}",
        audit.progress, audit.total_score
    );

    let audit = service.request_closure(&audit.id, &lead)?;
    if let Some(summary) = &audit.closure {
        let stats = &summary.statistics;
        println!(
            "- Closure requested: {} evaluations, {} findings, {} major / {} minor",
            stats.total_evaluations,
            stats.total_findings,
            stats.non_conformities.major,
            stats.non_conformities.minor
        );
        println!(
            "    conformity {:.2}% | follow-up required: {}",
            stats.conformities_percentage, stats.requires_follow_up
        );
    }

    service.approve_closure(&audit.id, &lead)?;
    println!("- Closure approved by {}", lead);

    let audit = service.close(
        &audit.id,
        &lead,
        CloseAudit {
            report_reference: Some("rpt-2026-001".to_string()),
        },
    )?;
    println!("- Closed ({})", audit.status.label());
    match serde_json::to_string_pretty(&audit.closure) {
        Ok(json) => println!("  Closure summary:\n{json}"),
        Err(err) => println!("  Closure summary unavailable: {err}"),
    }

    let notices = notifier.notices();
    if notices.is_empty() {
        println!("- Notifications: none dispatched");
    } else {
        println!("- Notifications:");
        for notice in notices {
            println!("    {} -> {}", notice.topic, notice.audit_id);
        }
    }

    if all_conforming {
        return Ok(());
    }

    println!("\nFollow-up audit demo");
    let follow_up = service.create(
        &lead,
        CreateAudit {
            name: "QMS follow-up audit".to_string(),
            audit_type: AuditType::FollowUp,
            template_id: TemplateId(SEEDED_TEMPLATE.to_string()),
            framework: "ISO 9001:2015".to_string(),
            organization_id: OrganizationId("org-meridian".to_string()),
            lead_auditor_id: lead.clone(),
        },
    )?;
    let follow_start = end + Duration::days(30);
    let follow_up = service.plan(
        &follow_up.id,
        &lead,
        PlanAudit {
            lead_auditor_id: lead.clone(),
            team_member_ids: team,
            start_date: follow_start,
            end_date: follow_start + Duration::days(5),
            scope: "Verification of corrective actions from the recertification audit"
                .to_string(),
            organization_id: None,
            source_audit_id: Some(audit.id.clone()),
        },
    )?;
    let inherited = service.evaluations(&follow_up.id)?;
    println!(
        "- Planned {} inheriting {} open findings from {}",
        follow_up.id,
        inherited.len(),
        audit.id
    );

    let copied = service.copy_weights(
        &follow_up.id,
        &lead,
        WeightCopy {
            source: WeightCopySource::Template,
            source_audit_id: None,
            adjustment_factor: 1.5,
        },
    )?;
    println!("- Copied weights from the template's latest configured audit (x1.5):");
    for weight in &copied {
        println!("    {} -> {:.3}", weight.standard_id, weight.weight);
    }

    Ok(())
}
