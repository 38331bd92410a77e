//! Records and request/response types shared between the studio backend and
//! its clients.
//!
//! Record types serialize with camelCase field names and upper-case enum
//! values; this is also the shape persisted in the blob store, so collections
//! written by the browser client load unchanged.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment status. Only `Paid` and `Pending` are ever written by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Overdue,
}

impl PaymentStatus {
    pub fn is_paid(self) -> bool {
        self == PaymentStatus::Paid
    }

    /// Display label used by the finance table
    pub fn label(self) -> &'static str {
        if self.is_paid() {
            "LIQUIDADO"
        } else {
            "PENDENTE"
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Paid => write!(f, "PAID"),
            PaymentStatus::Pending => write!(f, "PENDING"),
            PaymentStatus::Overdue => write!(f, "OVERDUE"),
        }
    }
}

/// A subscription plan offered by the studio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub id: String,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Plan name, matched against `PlanConfig::name`
    pub plan: String,
    pub active: bool,
    /// Enrollment date (YYYY-MM-DD)
    pub join_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Individual access password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSession {
    pub id: String,
    pub student_id: String,
    /// Student name at the time the session was booked
    pub student_name: String,
    pub instructor: String,
    /// Session date (YYYY-MM-DD)
    pub date: String,
    /// Start time (HH:MM)
    pub time: String,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub student_id: String,
    /// Student name at the time the payment was created
    pub student_name: String,
    pub amount: f64,
    /// Due date (YYYY-MM-DD)
    pub due_date: String,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reminder_sent: Option<String>,
}

/// Calendar date format used by every record (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

impl Payment {
    /// Parse the due date as a calendar date
    pub fn due_on(&self) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(self.due_date.trim(), DATE_FORMAT)
    }
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentListRequest {
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentListResponse {
    pub students: Vec<Student>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollStudentRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub plan: String,
    pub photo: Option<String>,
    pub password: Option<String>,
}

/// Links the manager uses to greet a newly enrolled student. There is no
/// WhatsApp link when the student has no phone on file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WelcomeLinks {
    pub whatsapp: Option<String>,
    pub mail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollStudentResponse {
    pub student: Student,
    pub initial_payment: Payment,
    pub access_link: String,
    pub welcome_message: String,
    pub links: WelcomeLinks,
    pub success_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub plan: Option<String>,
    pub photo: Option<String>,
    pub password: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResponse {
    pub student: Student,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveStudentResponse {
    pub removed_student_id: String,
    pub removed_payments: usize,
    pub removed_sessions: usize,
    pub farewell_message: String,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Payments and plans
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentListResponse {
    pub payments: Vec<Payment>,
    /// Sum of paid amounts within the caller's scope
    pub paid_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddPaymentRequest {
    pub student_id: String,
    pub amount: f64,
    pub due_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub payment: Payment,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReminderResponse {
    pub payment: Payment,
    pub message: String,
    pub whatsapp_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanListResponse {
    pub plans: Vec<PlanConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePlansRequest {
    pub plans: Vec<PlanConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePlansResponse {
    pub plans: Vec<PlanConfig>,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// Which billing rule produced an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Preventive,
    Late,
    Recollection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDto {
    pub payment_id: String,
    pub student_id: String,
    pub kind: AlertKind,
    pub message: String,
}

/// A payment that could not be classified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertIssue {
    pub payment_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertListResponse {
    /// Reference date the alerts were computed for (YYYY-MM-DD)
    pub today: String,
    pub alerts: Vec<AlertDto>,
    pub issues: Vec<AlertIssue>,
}

// ---------------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassListResponse {
    pub sessions: Vec<ClassSession>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleClassRequest {
    pub student_id: String,
    pub instructor: String,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescheduleClassRequest {
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSessionResponse {
    pub session: ClassSession,
    pub success_message: String,
}

/// One cell of the weekly agenda
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSlot {
    pub date: String,
    pub time: String,
    pub session: Option<ClassSession>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekGrid {
    pub days: Vec<String>,
    pub hours: Vec<String>,
    /// Row-major: one row per hour, one column per day
    pub slots: Vec<Vec<WeekSlot>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummaryResponse {
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Dashboard, navigation, access
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerDashboard {
    pub active_students: usize,
    pub sessions: usize,
    pub pending_alerts: usize,
    pub paid_total: f64,
    pub upcoming_sessions: Vec<ClassSession>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDashboard {
    pub student: Option<Student>,
    pub payment: Option<Payment>,
    pub next_session: Option<ClassSession>,
    pub has_warning: bool,
    pub is_paid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DashboardResponse {
    Manager(ManagerDashboard),
    Student(StudentDashboard),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationItem {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationResponse {
    pub role: String,
    pub items: Vec<NavigationItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessResponse {
    pub role: String,
    pub student: Option<Student>,
}

/// Log line forwarded by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
    pub component: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
