//! # Domain Module
//!
//! Business logic of the studio: students, class sessions, payments, plans
//! and the billing alerts derived from payments.
//!
//! ## Module Organization
//!
//! - **alert_engine**: pure billing-alert derivation over payments and a date
//! - **access**: manager or student context, passed explicitly to services
//! - **student_service**: enrollment, profile updates, removal with cascade
//! - **payment_service**: payment history, status toggling, reminders
//! - **plan_service**: subscription plan list
//! - **schedule_service**: class sessions and the weekly agenda
//! - **dashboard_service**: per-role dashboard aggregates
//! - **navigation**: app tabs per context
//! - **message_composer**: AI-written messages with template fallback
//! - **links**: access, WhatsApp and e-mail links
//!
//! ## Business Rules
//!
//! - Only the manager enrolls, removes, bills and schedules
//! - A student sees and edits only their own payments, sessions and profile
//! - Removing a student removes their payments and sessions
//! - Payments and sessions keep the student name they were created with
//! - Alerts are recomputed from payments on every request, never stored

pub mod access;
pub mod alert_engine;
pub mod dashboard_service;
pub mod errors;
pub mod links;
pub mod message_composer;
pub mod navigation;
pub mod payment_service;
pub mod plan_service;
pub mod schedule_service;
pub mod student_service;

pub use access::AccessContext;
pub use dashboard_service::DashboardService;
pub use errors::{StudioError, StudioResult};
pub use message_composer::MessageService;
pub use payment_service::PaymentService;
pub use plan_service::PlanService;
pub use schedule_service::ScheduleService;
pub use student_service::StudentService;
