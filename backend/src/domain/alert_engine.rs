//! Billing alert derivation.
//!
//! Given the payment list and a reference date, every unpaid payment is
//! classified into at most one alert by how many calendar days separate its
//! due date from today:
//!
//! | days until due | alert |
//! |---|---|
//! | `3` | preventive reminder |
//! | `-1` | late notice (fires once, the day after the due date) |
//! | `-6, -11, -16, …` | re-collection reminder, every 5 days |
//!
//! Everything here is pure: same payments and same date, same alerts, in
//! input order. A payment whose due date cannot be parsed is left out and
//! reported in [`AlertReport::errors`]; the rest of the batch is unaffected.

use chrono::NaiveDate;
use log::warn;
use shared::Payment;
use std::fmt;
use thiserror::Error;

/// Days before the due date at which the preventive reminder fires
pub const PREVENTIVE_DAYS_AHEAD: i64 = 3;
/// Interval, in days, between re-collection reminders
pub const RECOLLECTION_INTERVAL: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingRule {
    Preventive,
    Late,
    Recollection { days_overdue: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingAlert {
    pub payment_id: String,
    pub student_id: String,
    pub student_name: String,
    pub rule: BillingRule,
}

impl fmt::Display for BillingAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule {
            BillingRule::Preventive => write!(
                f,
                "Lembrete Preventivo: Fatura de {} vence em 3 dias.",
                self.student_name
            ),
            BillingRule::Late => write!(
                f,
                "ALERTA DE ATRASO: Pagamento de {} venceu ontem.",
                self.student_name
            ),
            BillingRule::Recollection { days_overdue } => write!(
                f,
                "RECOBRANÇA: Aluno {} está com {} dias de atraso.",
                self.student_name, days_overdue
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlertError {
    #[error("payment {payment_id} has an unreadable due date '{raw}'")]
    MalformedDueDate { payment_id: String, raw: String },
}

impl AlertError {
    pub fn payment_id(&self) -> &str {
        match self {
            AlertError::MalformedDueDate { payment_id, .. } => payment_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertReport {
    pub alerts: Vec<BillingAlert>,
    pub errors: Vec<AlertError>,
}

impl AlertReport {
    /// The alerts as display strings, in payment order
    pub fn messages(&self) -> Vec<String> {
        self.alerts.iter().map(ToString::to_string).collect()
    }

    /// Keep only alerts for one student's payments
    pub fn for_student(self, student_id: &str) -> Self {
        Self {
            alerts: self
                .alerts
                .into_iter()
                .filter(|a| a.student_id == student_id)
                .collect(),
            errors: self.errors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

/// Whole calendar days from `today` until `due` (negative once past due)
pub fn days_until_due(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}

/// The rule table, first match wins
pub fn classify(diff_days: i64) -> Option<BillingRule> {
    if diff_days == PREVENTIVE_DAYS_AHEAD {
        Some(BillingRule::Preventive)
    } else if diff_days == -1 {
        Some(BillingRule::Late)
    } else if diff_days < -1 && (diff_days + 1).abs() % RECOLLECTION_INTERVAL == 0 {
        Some(BillingRule::Recollection {
            days_overdue: diff_days.abs(),
        })
    } else {
        None
    }
}

/// Classify a single payment. Paid payments never alert.
pub fn evaluate(payment: &Payment, today: NaiveDate) -> Result<Option<BillingAlert>, AlertError> {
    if payment.status.is_paid() {
        return Ok(None);
    }

    let due = payment.due_on().map_err(|_| AlertError::MalformedDueDate {
        payment_id: payment.id.clone(),
        raw: payment.due_date.clone(),
    })?;

    Ok(classify(days_until_due(due, today)).map(|rule| BillingAlert {
        payment_id: payment.id.clone(),
        student_id: payment.student_id.clone(),
        student_name: payment.student_name.clone(),
        rule,
    }))
}

pub fn derive_alerts(payments: &[Payment], today: NaiveDate) -> AlertReport {
    let mut report = AlertReport::default();

    for payment in payments {
        match evaluate(payment, today) {
            Ok(Some(alert)) => report.alerts.push(alert),
            Ok(None) => {}
            Err(e) => {
                warn!("Skipping payment in alert run: {}", e);
                report.errors.push(e);
            }
        }
    }

    report
}

/// Plain-string form of [`derive_alerts`]
pub fn alert_messages(payments: &[Payment], today: NaiveDate) -> Vec<String> {
    derive_alerts(payments, today).messages()
}
