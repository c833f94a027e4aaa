use chrono::{DateTime, Utc};

use super::domain::{finite_or, ApplicationFeatures, MacroContext, Transaction, TransactionKind};
use super::features::FeatureVector;
use super::knowledge::Feature;

const DEFAULT_REVOLVING_UTILIZATION: f64 = 0.5;
const DEFAULT_MONTHLY_INCOME: f64 = 4_000.0;
const DEFAULT_TOTAL_ACCOUNTS: f64 = 5.0;
const DEFAULT_PAYMENT_REGULARITY: f64 = 0.5;
const INCOME_CAP: f64 = 50_000.0;
const BALANCE_PAYMENT_RATE: f64 = 0.025;
const DEFICIT_TOLERANCE: f64 = 1.1;
const BUCKET_DAYS: i64 = 30;
const TRAILING_MONTHS: i64 = 12;
const SECONDS_PER_DAY: f64 = 86_400.0;

const LOAN_PAYMENT: &str = "loan_payment";
const GAMBLING: &str = "gambling";
const ATM_CASH: &str = "atm_cash";

/// Converts raw application and macro data into a [`FeatureVector`].
///
/// Never rejects input: absent, negative, or non-finite fields fall back to their defaults.
/// Trailing windows are measured back from `now`; transactions dated after `now` are ignored.
#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder {
    now: DateTime<Utc>,
}

impl FeatureEncoder {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn encode(
        &self,
        features: &ApplicationFeatures,
        macro_context: &MacroContext,
    ) -> FeatureVector {
        let ledger = Ledger::new(&features.transactions, self.now);

        let income = features
            .stated_income
            .filter(|value| value.is_finite() && *value > 0.0)
            .unwrap_or(DEFAULT_MONTHLY_INCOME);
        let balance = non_negative(features.total_balance, 0.0);
        let spend_30 = ledger.spend_within(30);
        let spend_60 = ledger.spend_within(60);

        FeatureVector::from_pairs([
            (
                Feature::RevolvingUtilization,
                finite_or(
                    features.revolving_utilization,
                    DEFAULT_REVOLVING_UTILIZATION,
                )
                .clamp(0.0, 1.0),
            ),
            (
                Feature::MissedPayments12m,
                capped_ratio(features.missed_payments_12m, 12.0),
            ),
            (
                Feature::MissedPayments24m,
                capped_ratio(features.missed_payments_24m, 24.0),
            ),
            (
                Feature::DerogatoryMarks,
                capped_ratio(features.derogatory_marks, 10.0),
            ),
            (
                Feature::Inquiries6m,
                capped_ratio(features.inquiries_6m, 10.0),
            ),
            (
                Feature::OldestAccountNorm,
                capped_ratio(features.oldest_account_months, 360.0),
            ),
            (
                Feature::TotalAccountsNorm,
                features
                    .total_accounts
                    .filter(|value| value.is_finite() && *value > 0.0)
                    .unwrap_or(DEFAULT_TOTAL_ACCOUNTS)
                    .min(30.0)
                    / 30.0,
            ),
            (Feature::IncomeNorm, income.min(INCOME_CAP) / INCOME_CAP),
            (
                Feature::IncomeVerified,
                if features.income_verified.unwrap_or(false) {
                    1.0
                } else {
                    0.0
                },
            ),
            (
                Feature::EmploymentMonthsNorm,
                capped_ratio(features.employment_months, 120.0),
            ),
            (
                Feature::DtiRatio,
                (balance * BALANCE_PAYMENT_RATE / income.max(1.0)).min(2.0),
            ),
            (Feature::CashFlowStress, ledger.cash_flow_stress()),
            (Feature::IncomeStability, ledger.income_stability()),
            (
                Feature::LoanPaymentRegularity,
                ledger.loan_payment_regularity(),
            ),
            (
                Feature::GamblingAmount,
                ledger.category_spend_within(GAMBLING, 90).min(5_000.0) / 5_000.0,
            ),
            (
                Feature::AtmFrequency,
                (ledger.category_count_within(ATM_CASH, 30) as f64).min(20.0) / 20.0,
            ),
            (
                Feature::SpendVelocity,
                spend_30 / (spend_60 - spend_30).max(1.0),
            ),
            (Feature::MacroFedRate, macro_context.fed_funds_rate / 10.0),
            (Feature::MacroCpi, macro_context.cpi_yoy / 15.0),
            (
                Feature::MacroUnemployment,
                macro_context.unemployment_rate / 15.0,
            ),
            (Feature::MacroSectorStress, macro_context.sector_stress),
        ])
    }
}

fn non_negative(value: Option<f64>, default: f64) -> f64 {
    finite_or(value, default).max(0.0)
}

fn capped_ratio(value: Option<f64>, cap: f64) -> f64 {
    non_negative(value, 0.0).min(cap) / cap
}

struct DatedEntry<'a> {
    days_ago: i64,
    transaction: &'a Transaction,
}

impl DatedEntry<'_> {
    fn magnitude(&self) -> f64 {
        self.transaction.amount.abs()
    }
}

/// Transactions annotated with their age relative to the encoding instant.
struct Ledger<'a> {
    entries: Vec<DatedEntry<'a>>,
    loan_payment_dates: Vec<DateTime<Utc>>,
}

impl<'a> Ledger<'a> {
    fn new(transactions: &'a [Transaction], now: DateTime<Utc>) -> Self {
        let usable = transactions
            .iter()
            .filter(|transaction| transaction.amount.is_finite() && transaction.date <= now);

        let mut loan_payment_dates: Vec<DateTime<Utc>> = usable
            .clone()
            .filter(|transaction| {
                transaction.kind == TransactionKind::Debit && transaction.is_category(LOAN_PAYMENT)
            })
            .map(|transaction| transaction.date)
            .collect();
        loan_payment_dates.sort();

        let entries = usable
            .map(|transaction| DatedEntry {
                days_ago: (now - transaction.date).num_days(),
                transaction,
            })
            .collect();

        Self {
            entries,
            loan_payment_dates,
        }
    }

    fn debits(&self) -> impl Iterator<Item = &DatedEntry<'a>> {
        self.entries
            .iter()
            .filter(|entry| entry.transaction.kind == TransactionKind::Debit)
    }

    fn spend_within(&self, days: i64) -> f64 {
        self.debits()
            .filter(|entry| entry.days_ago <= days)
            .map(DatedEntry::magnitude)
            .sum()
    }

    fn category_spend_within(&self, category: &str, days: i64) -> f64 {
        self.debits()
            .filter(|entry| entry.days_ago <= days && entry.transaction.is_category(category))
            .map(DatedEntry::magnitude)
            .sum()
    }

    fn category_count_within(&self, category: &str, days: i64) -> usize {
        self.debits()
            .filter(|entry| entry.days_ago <= days && entry.transaction.is_category(category))
            .count()
    }

    /// Debit and credit totals for each trailing 30-day bucket, most recent first.
    fn monthly_buckets(&self) -> Vec<(f64, f64)> {
        let mut buckets = vec![(0.0, 0.0); TRAILING_MONTHS as usize];
        for entry in &self.entries {
            let index = entry.days_ago / BUCKET_DAYS;
            if index >= TRAILING_MONTHS {
                continue;
            }
            let bucket = &mut buckets[index as usize];
            match entry.transaction.kind {
                TransactionKind::Debit => bucket.0 += entry.magnitude(),
                // reversals arrive as negative credits and reduce the month's income
                TransactionKind::Credit => bucket.1 += entry.transaction.amount,
            }
        }
        buckets
    }

    fn cash_flow_stress(&self) -> f64 {
        let deficits = self
            .monthly_buckets()
            .iter()
            .filter(|(debits, credits)| *debits > *credits * DEFICIT_TOLERANCE)
            .count();
        deficits as f64 / TRAILING_MONTHS as f64
    }

    fn income_stability(&self) -> f64 {
        let monthly_income: Vec<f64> = self
            .monthly_buckets()
            .into_iter()
            .map(|(_, credits)| credits)
            .collect();

        let (mean, deviation) = mean_and_deviation(&monthly_income);
        let mean = if mean == 0.0 { 1.0 } else { mean };
        1.0 / (1.0 + deviation / mean)
    }

    fn loan_payment_regularity(&self) -> f64 {
        if self.loan_payment_dates.len() < 2 {
            return DEFAULT_PAYMENT_REGULARITY;
        }

        let gaps: Vec<f64> = self
            .loan_payment_dates
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).num_seconds() as f64 / SECONDS_PER_DAY)
            .collect();
        let (_, deviation) = mean_and_deviation(&gaps);
        1.0 / (1.0 + deviation / 30.0)
    }
}

/// Population mean and standard deviation.
fn mean_and_deviation(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / count;
    (mean, variance.sqrt())
}
