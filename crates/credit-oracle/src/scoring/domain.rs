use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identifier wrapper for scored credit applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for the person behind an application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

/// Inbound scoring request. Only the application id is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    pub application_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub applicant_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_section")]
    pub features: ApplicationFeatures,
    #[serde(default, deserialize_with = "lenient_section")]
    pub macro_context: MacroContextOverrides,
}

impl ScoringRequest {
    pub fn for_application(application_id: impl Into<String>) -> Self {
        Self {
            application_id: Some(application_id.into()),
            ..Self::default()
        }
    }
}

/// Raw financial-behavior data. Every field is optional; the encoder supplies defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationFeatures {
    #[serde(default, deserialize_with = "lenient_transactions")]
    pub transactions: Vec<Transaction>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub stated_income: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_balance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub missed_payments_12m: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub missed_payments_24m: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub derogatory_marks: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub inquiries_6m: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub oldest_account_months: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_accounts: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub income_verified: Option<bool>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub employment_months: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub revolving_utilization: Option<f64>,
}

/// Direction of money movement on an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Debit,
    Credit,
}

/// Single ledger entry used by the behavioral features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: DateTime<Utc>,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub category: Option<String>,
}

impl Transaction {
    pub fn debit(date: DateTime<Utc>, amount: f64, category: &str) -> Self {
        Self {
            date,
            amount,
            kind: TransactionKind::Debit,
            category: Some(category.to_string()),
        }
    }

    pub fn credit(date: DateTime<Utc>, amount: f64, category: &str) -> Self {
        Self {
            date,
            amount,
            kind: TransactionKind::Credit,
            category: Some(category.to_string()),
        }
    }

    pub fn is_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .map(|value| value.eq_ignore_ascii_case(category))
            .unwrap_or(false)
    }
}

/// Caller-supplied macro overrides; unset fields take [`MacroContext::default`] values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroContextOverrides {
    #[serde(default, deserialize_with = "lenient_number")]
    pub fed_funds_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub cpi_yoy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub unemployment_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub sector_stress: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub credit_spread: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub hpi_yoy: Option<f64>,
}

/// Resolved macroeconomic environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroContext {
    pub fed_funds_rate: f64,
    pub cpi_yoy: f64,
    pub unemployment_rate: f64,
    pub sector_stress: f64,
    pub credit_spread: Option<f64>,
    pub hpi_yoy: Option<f64>,
}

impl Default for MacroContext {
    fn default() -> Self {
        Self {
            fed_funds_rate: 5.25,
            cpi_yoy: 3.2,
            unemployment_rate: 3.9,
            sector_stress: 0.2,
            credit_spread: None,
            hpi_yoy: None,
        }
    }
}

impl MacroContext {
    pub fn resolve(overrides: &MacroContextOverrides) -> Self {
        let defaults = Self::default();
        Self {
            fed_funds_rate: finite_or(overrides.fed_funds_rate, defaults.fed_funds_rate),
            cpi_yoy: finite_or(overrides.cpi_yoy, defaults.cpi_yoy),
            unemployment_rate: finite_or(overrides.unemployment_rate, defaults.unemployment_rate),
            sector_stress: finite_or(overrides.sector_stress, defaults.sector_stress),
            credit_spread: overrides.credit_spread.filter(|value| value.is_finite()),
            hpi_yoy: overrides.hpi_yoy.filter(|value| value.is_finite()),
        }
    }
}

pub(crate) fn finite_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|value| value.is_finite()).unwrap_or(default)
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|value| value.is_finite())
}

/// Opaque ids arrive as strings or bare numbers; anything else is treated as absent.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(raw) => Some(raw),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// Optional request sections: null, non-object, or otherwise unusable input takes the default.
fn lenient_section<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(T::default());
    }
    Ok(T::deserialize(value).unwrap_or_default())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(flag) => Some(flag),
        Value::Number(number) => number.as_f64().map(|value| value != 0.0),
        Value::String(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Drops entries with an unknown type, an unparseable date, or a non-numeric amount.
fn lenient_transactions<'de, D>(deserializer: D) -> Result<Vec<Transaction>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(entries) = value else {
        return Ok(Vec::new());
    };

    Ok(entries.iter().filter_map(transaction_from_value).collect())
}

fn transaction_from_value(value: &Value) -> Option<Transaction> {
    let object = value.as_object()?;
    let date = object.get("date").and_then(Value::as_str).and_then(parse_timestamp)?;
    let amount = object.get("amount").and_then(number_from_value)?;
    let kind = match object.get("type").and_then(Value::as_str)?.trim() {
        kind if kind.eq_ignore_ascii_case("debit") => TransactionKind::Debit,
        kind if kind.eq_ignore_ascii_case("credit") => TransactionKind::Credit,
        _ => return None,
    };
    let category = object
        .get("category")
        .and_then(Value::as_str)
        .map(|raw| raw.trim().to_string());

    Some(Transaction {
        date,
        amount,
        kind,
        category,
    })
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
