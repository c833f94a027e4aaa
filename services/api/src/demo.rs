use crate::infra::{narrative_composer, parse_instant, InMemoryScoreRepository};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use credit_oracle::config::{AppConfig, NarrativeConfig};
use credit_oracle::error::AppError;
use credit_oracle::scoring::{
    ApplicationFeatures, CreditScoringService, ScoringOrchestrator, ScoringRequest, ScoringResult,
    Transaction,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Path to a JSON scoring request, or `-` to read from stdin
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Score as of this instant (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub(crate) as_of: Option<DateTime<Utc>>,
    /// Emit compact JSON instead of pretty-printed output
    #[arg(long)]
    pub(crate) compact: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Score as of this instant (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub(crate) as_of: Option<DateTime<Utc>>,
    /// Skip the external narrative service even when one is configured
    #[arg(long)]
    pub(crate) template_only: bool,
}

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        input,
        as_of,
        compact,
    } = args;

    let raw = read_request(&input)?;
    let request: ScoringRequest = serde_json::from_str(&raw)?;

    let config = AppConfig::load()?;
    let orchestrator = ScoringOrchestrator::new(narrative_composer(&config.narrative)?);
    let result = orchestrator
        .score_at(&request, as_of.unwrap_or_else(Utc::now))
        .await?;

    let mut payload = serde_json::to_value(&result)?;
    if let Some(fields) = payload.as_object_mut() {
        fields.insert("status".to_string(), serde_json::json!("scored"));
    }
    let rendered = if compact {
        serde_json::to_string(&payload)?
    } else {
        serde_json::to_string_pretty(&payload)?
    };
    println!("{rendered}");
    Ok(())
}

fn read_request(input: &Path) -> Result<String, AppError> {
    if input.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        return Ok(raw);
    }
    Ok(std::fs::read_to_string(input)?)
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        as_of,
        template_only,
    } = args;
    let now = as_of.unwrap_or_else(Utc::now);

    let narrative = if template_only {
        NarrativeConfig::default()
    } else {
        AppConfig::load()?.narrative
    };
    let repository = Arc::new(InMemoryScoreRepository::default());
    let service = CreditScoringService::new(
        repository,
        ScoringOrchestrator::new(narrative_composer(&narrative)?),
    );

    println!("Credit oracle demo");
    println!("Scoring as of {}", now.format("%Y-%m-%d %H:%M UTC"));

    let request = demo_request(now);
    let (result, persistence) = service.score_at(request.clone(), now).await?;
    render_result(&result);

    if persistence.await.is_err() {
        println!("\nStored record: persistence task did not complete");
        return Ok(());
    }
    let application_id = ScoringOrchestrator::application_id(&request)?;
    match service.get(&application_id) {
        Ok(record) => println!(
            "\nStored record: {} scored at {}",
            record.application_id.0,
            record.scored_at.to_rfc3339()
        ),
        Err(err) => println!("\nStored record unavailable: {err}"),
    }

    Ok(())
}

/// Stretched applicant: salaried, overspending in recent months, irregular loan payments.
fn demo_request(now: DateTime<Utc>) -> ScoringRequest {
    let day = |days: i64| now - Duration::days(days);

    let mut transactions = Vec::new();
    for month in 0..12 {
        let offset = 30 * month;
        transactions.push(Transaction::credit(day(offset + 1), 4_200.0, "salary"));
        let rent_and_bills = if month < 4 { 4_900.0 } else { 3_600.0 };
        transactions.push(Transaction::debit(day(offset + 2), rent_and_bills, "housing"));
    }
    for days in [6, 35, 70, 96, 128, 159] {
        transactions.push(Transaction::debit(day(days), 380.0, "loan_payment"));
    }
    transactions.push(Transaction::debit(day(12), 450.0, "gambling"));
    transactions.push(Transaction::debit(day(4), 80.0, "atm_cash"));
    transactions.push(Transaction::debit(day(18), 80.0, "atm_cash"));

    ScoringRequest {
        application_id: Some("demo-application".to_string()),
        applicant_id: Some("demo-applicant".to_string()),
        features: ApplicationFeatures {
            transactions,
            stated_income: Some(4_200.0),
            total_balance: Some(38_000.0),
            missed_payments_12m: Some(2.0),
            missed_payments_24m: Some(3.0),
            derogatory_marks: Some(0.0),
            inquiries_6m: Some(4.0),
            oldest_account_months: Some(62.0),
            total_accounts: Some(7.0),
            income_verified: Some(true),
            employment_months: Some(28.0),
            revolving_utilization: Some(0.71),
        },
        ..ScoringRequest::default()
    }
}

fn render_result(result: &ScoringResult) {
    println!(
        "\nScore: {} (range {}-{})",
        result.score, result.confidence_low, result.confidence_high
    );
    println!(
        "Risk: {} / {}  Fairness check: {}",
        result.risk_type.label(),
        result.risk_severity.label(),
        if result.fair { "pass" } else { "flagged" }
    );

    println!("\nCausal factors");
    for factor in &result.causal_factors {
        println!(
            "  {:<36} {:<15} impact {:.3}",
            factor.label,
            factor.direction.label(),
            factor.impact
        );
    }

    if result.counterfactuals.is_empty() {
        println!("\nActions: none would raise the score");
    } else {
        println!("\nActions");
        for action in &result.counterfactuals {
            println!(
                "  [P{}] {} (+{} to {}, {})",
                action.priority,
                action.description,
                action.score_improvement,
                action.projected_score,
                action.timeframe
            );
        }
    }

    println!("\nTrajectory");
    for point in result.trajectory.points() {
        println!(
            "  {:>2} months: {} ({:+}, {}){}",
            point.horizon_months,
            point.predicted_score,
            point.score_delta,
            point.trend.label(),
            if point.key_drivers.is_empty() {
                String::new()
            } else {
                format!(" - {}", point.key_drivers.join("; "))
            }
        );
    }

    if !result.adverse_action_reasons.is_empty() {
        println!("\nAdverse action reasons");
        for reason in &result.adverse_action_reasons {
            println!("  - {reason}");
        }
    }

    println!("\n{}", result.explanation);
    if !result.improvement_plan.is_empty() {
        println!("{}", result.improvement_plan);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_applicant_scores_with_actions() {
        let now = parse_instant("2025-06-30").expect("valid instant");
        let result = ScoringOrchestrator::default()
            .score_at(&demo_request(now), now)
            .await
            .expect("demo request scores");

        assert!(!result.counterfactuals.is_empty());
        assert!(!result.causal_factors.is_empty());
        assert!(result.improvement_plan.starts_with("Top action: "));
    }
}
