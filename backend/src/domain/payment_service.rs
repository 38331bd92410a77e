use chrono::NaiveDate;
use log::{info, warn};
use uuid::Uuid;

use super::access::AccessContext;
use super::alert_engine::{derive_alerts, AlertReport};
use super::errors::{StudioError, StudioResult};
use super::links;
use super::message_composer::MessageService;
use crate::storage::{Collection, Store};
use shared::{
    AddPaymentRequest, Payment, PaymentListResponse, PaymentReminderResponse, PaymentResponse,
    PaymentStatus, DATE_FORMAT,
};

/// Payment history, status toggling and collection reminders
#[derive(Clone)]
pub struct PaymentService {
    store: Store,
    messages: MessageService,
}

impl PaymentService {
    pub fn new(store: Store, messages: MessageService) -> Self {
        Self { store, messages }
    }

    /// Payments visible in `access`, newest due date first, with the paid total
    pub async fn list_payments(&self, access: &AccessContext) -> PaymentListResponse {
        let mut payments: Vec<Payment> = self
            .store
            .read(|data| {
                data.payments
                    .iter()
                    .filter(|p| access.can_view(&p.student_id))
                    .cloned()
                    .collect()
            })
            .await;

        // Unparseable dates sort as plain strings, which keeps ISO dates ordered
        payments.sort_by(|a, b| b.due_date.cmp(&a.due_date));
        let paid_total = paid_total(&payments);

        info!(
            "Listing {} payments for {} (paid total {:.2})",
            payments.len(),
            access.role(),
            paid_total
        );
        PaymentListResponse {
            payments,
            paid_total,
        }
    }

    /// Billing alerts for `today` over the payments visible to the caller
    pub async fn alerts(&self, access: &AccessContext, today: NaiveDate) -> AlertReport {
        self.store
            .read(|data| {
                let scoped: Vec<Payment> = data
                    .payments
                    .iter()
                    .filter(|p| access.can_view(&p.student_id))
                    .cloned()
                    .collect();
                derive_alerts(&scoped, today)
            })
            .await
    }

    /// Record a new pending payment for an existing student
    pub async fn add_payment(
        &self,
        access: &AccessContext,
        request: AddPaymentRequest,
    ) -> StudioResult<PaymentResponse> {
        access.require_manager("add payments")?;
        info!(
            "Adding payment for student {}: {:.2} due {}",
            request.student_id, request.amount, request.due_date
        );

        if !request.amount.is_finite() || request.amount < 0.0 {
            return Err(StudioError::validation("Payment amount must be zero or positive"));
        }
        let due = NaiveDate::parse_from_str(request.due_date.trim(), DATE_FORMAT).map_err(|_| {
            StudioError::validation(format!(
                "Invalid due date '{}', expected YYYY-MM-DD",
                request.due_date
            ))
        })?;

        let payment = self
            .store
            .mutate(&[Collection::Payments], |data| {
                let student = data.find_student(&request.student_id).ok_or_else(|| {
                    StudioError::not_found(format!("Student {}", request.student_id))
                })?;

                let payment = Payment {
                    id: Uuid::new_v4().simple().to_string(),
                    student_id: student.id.clone(),
                    student_name: student.name.clone(),
                    amount: request.amount,
                    due_date: due.format(DATE_FORMAT).to_string(),
                    status: PaymentStatus::Pending,
                    last_reminder_sent: None,
                };
                data.payments.push(payment.clone());
                Ok(payment)
            })
            .await?;

        Ok(PaymentResponse {
            payment,
            success_message: "Payment added successfully".to_string(),
        })
    }

    /// PAID becomes PENDING; anything else becomes PAID
    pub async fn toggle_payment(
        &self,
        access: &AccessContext,
        payment_id: &str,
    ) -> StudioResult<PaymentResponse> {
        access.require_manager("change payment status")?;

        let payment = self
            .store
            .mutate(&[Collection::Payments], |data| {
                let payment = data
                    .payments
                    .iter_mut()
                    .find(|p| p.id == payment_id)
                    .ok_or_else(|| StudioError::not_found(format!("Payment {}", payment_id)))?;

                payment.status = if payment.status.is_paid() {
                    PaymentStatus::Pending
                } else {
                    PaymentStatus::Paid
                };
                Ok(payment.clone())
            })
            .await?;

        info!("Payment {} is now {}", payment.id, payment.status);
        Ok(PaymentResponse {
            success_message: format!("Payment marked as {}", payment.status.label()),
            payment,
        })
    }

    /// Compose a reminder for one payment and stamp `lastReminderSent`
    pub async fn compose_reminder(
        &self,
        access: &AccessContext,
        payment_id: &str,
        today: NaiveDate,
    ) -> StudioResult<PaymentReminderResponse> {
        access.require_manager("send payment reminders")?;

        let (payment, phone) = self
            .store
            .read(|data| {
                data.payments.iter().find(|p| p.id == payment_id).cloned().map(|p| {
                    let phone = data.find_student(&p.student_id).map(|s| s.phone.clone());
                    (p, phone)
                })
            })
            .await
            .ok_or_else(|| StudioError::not_found(format!("Payment {}", payment_id)))?;

        let message = self
            .messages
            .reminder(&payment.student_name, payment.amount, &payment.due_date)
            .await;

        let stamped = today.format(DATE_FORMAT).to_string();
        let payment = self
            .store
            .mutate(&[Collection::Payments], |data| {
                let payment = data
                    .payments
                    .iter_mut()
                    .find(|p| p.id == payment_id)
                    .ok_or_else(|| StudioError::not_found(format!("Payment {}", payment_id)))?;
                payment.last_reminder_sent = Some(stamped);
                Ok(payment.clone())
            })
            .await?;

        let whatsapp_link = phone
            .filter(|p| !links::sanitize_phone(p).is_empty())
            .map(|p| links::whatsapp_link(&p, &message));
        if whatsapp_link.is_none() {
            warn!("No phone on file for payment {}, reminder has no link", payment.id);
        }

        info!("Reminder composed for payment {}", payment.id);
        Ok(PaymentReminderResponse {
            payment,
            message,
            whatsapp_link,
        })
    }
}

/// Sum of amounts over paid payments
pub fn paid_total(payments: &[Payment]) -> f64 {
    payments
        .iter()
        .filter(|p| p.status.is_paid())
        .map(|p| p.amount)
        .sum()
}
