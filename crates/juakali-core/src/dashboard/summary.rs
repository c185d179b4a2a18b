use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

use super::aggregate::aggregate_loans;
use crate::credit::limit::{compute_credit_limit, CreditPolicy};
use crate::credit::profile::CreditProfile;
use crate::lifecycle::{Loan, Payment};
use crate::{types::*, LendResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardInput {
    pub profile: CreditProfile,
    #[serde(default)]
    pub loans: Vec<Loan>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub policy: CreditPolicy,
}

/// The borrower dashboard as served to the web clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub user_id: String,
    pub total_loans: u32,
    pub active_loans: u32,
    pub completed_loans: u32,
    pub total_repaid: Money,
    pub outstanding_amount: Money,
    pub credit_score: i32,
    pub credit_limit: Money,
    pub available_credit: Money,
    pub credit_utilization: Rate,
    pub pending_payments: u32,
}

pub fn build_dashboard(input: &DashboardInput) -> LendResult<ComputationOutput<DashboardSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let user_id = input.profile.user_id.as_str();
    let foreign = input
        .loans
        .iter()
        .filter(|l| l.borrower_id != user_id)
        .count();
    if foreign > 0 {
        warnings.push(format!(
            "{foreign} loan(s) belong to a different borrower than {user_id}."
        ));
    }

    let known: HashSet<&str> = input.loans.iter().map(|l| l.loan_id.as_str()).collect();
    let orphaned = input
        .payments
        .iter()
        .filter(|p| !known.contains(p.loan_id.as_str()))
        .count();
    if orphaned > 0 {
        warnings.push(format!(
            "{orphaned} payment(s) reference loans not in the input; counted in total repaid only."
        ));
    }

    let credit_limit = input.policy.credit_limit(input.profile.credit_score)?;
    let portfolio = aggregate_loans(&input.loans, &input.payments, credit_limit)?;
    let credit = compute_credit_limit(
        &input.policy,
        input.profile.credit_score,
        portfolio.outstanding_amount,
    )?;

    let summary = DashboardSummary {
        user_id: input.profile.user_id.clone(),
        total_loans: portfolio.total_loans,
        active_loans: portfolio.active_loans,
        completed_loans: portfolio.completed_loans,
        total_repaid: round_money(portfolio.total_repaid),
        outstanding_amount: round_money(portfolio.outstanding_amount),
        credit_score: input.profile.credit_score,
        credit_limit: credit.credit_limit,
        available_credit: round_money(credit.available_credit),
        credit_utilization: portfolio.credit_utilization.round_dp(4),
        pending_payments: portfolio.pending_payments,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "outstanding": "active loan totals minus payments against active loans",
        "pending_payments": "remaining daily installments on active loans",
        "defaulted_loans": portfolio.defaulted_loans,
        "pending_loans": portfolio.pending_loans,
    });

    Ok(with_metadata(
        "Borrower dashboard aggregation",
        &assumptions,
        warnings,
        elapsed,
        summary,
    ))
}
