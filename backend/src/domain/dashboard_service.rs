use chrono::NaiveDate;
use log::info;

use super::access::AccessContext;
use super::alert_engine::derive_alerts;
use super::payment_service::paid_total;
use super::schedule_service::sessions_on;
use crate::storage::Store;
use shared::{DashboardResponse, ManagerDashboard, StudentDashboard};

/// Number of today's sessions shown on the manager dashboard
const UPCOMING_LIMIT: usize = 4;

#[derive(Clone)]
pub struct DashboardService {
    store: Store,
}

impl DashboardService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn dashboard(&self, access: &AccessContext, today: NaiveDate) -> DashboardResponse {
        match access.student_id() {
            None => DashboardResponse::Manager(self.manager_dashboard(today).await),
            Some(id) => DashboardResponse::Student(self.student_dashboard(id, today).await),
        }
    }

    pub async fn manager_dashboard(&self, today: NaiveDate) -> ManagerDashboard {
        let dashboard = self
            .store
            .read(|data| {
                let mut upcoming = sessions_on(&data.classes, today);
                upcoming.truncate(UPCOMING_LIMIT);

                ManagerDashboard {
                    active_students: data.students.iter().filter(|s| s.active).count(),
                    sessions: data.classes.len(),
                    pending_alerts: derive_alerts(&data.payments, today).alerts.len(),
                    paid_total: paid_total(&data.payments),
                    upcoming_sessions: upcoming,
                }
            })
            .await;

        info!(
            "Manager dashboard: {} active students, {} alerts",
            dashboard.active_students, dashboard.pending_alerts
        );
        dashboard
    }

    /// A student's own view. The warning is raised only while an alert names
    /// them and their payment is still open.
    pub async fn student_dashboard(&self, student_id: &str, today: NaiveDate) -> StudentDashboard {
        self.store
            .read(|data| {
                let student = data.find_student(student_id).cloned();
                let payment = data
                    .payments
                    .iter()
                    .find(|p| p.student_id == student_id)
                    .cloned();
                let next_session = data
                    .classes
                    .iter()
                    .find(|c| c.student_id == student_id)
                    .cloned();

                let is_paid = payment.as_ref().is_some_and(|p| p.status.is_paid());
                let alerted = !derive_alerts(&data.payments, today)
                    .for_student(student_id)
                    .is_empty();

                StudentDashboard {
                    student,
                    payment,
                    next_session,
                    has_warning: alerted && !is_paid,
                    is_paid,
                }
            })
            .await
    }
}
