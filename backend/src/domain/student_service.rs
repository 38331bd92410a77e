use chrono::{Months, NaiveDate};
use log::{info, warn};
use rand::Rng;
use uuid::Uuid;

use super::access::AccessContext;
use super::errors::{StudioError, StudioResult};
use super::links;
use super::message_composer::MessageService;
use crate::storage::{Collection, Store};
use shared::{
    EnrollStudentRequest, EnrollStudentResponse, Payment, PaymentStatus, RemoveStudentResponse,
    Student, StudentListResponse, StudentResponse, UpdateStudentRequest, WelcomeLinks, DATE_FORMAT,
};

const MAX_NAME_LENGTH: usize = 100;

/// Enrollment, profile updates and removal of students
#[derive(Clone)]
pub struct StudentService {
    store: Store,
    messages: MessageService,
    public_url: String,
}

impl StudentService {
    pub fn new(store: Store, messages: MessageService, public_url: impl Into<String>) -> Self {
        Self {
            store,
            messages,
            public_url: public_url.into(),
        }
    }

    /// Resolve the `studentId` carried by an access link. No id means the
    /// manager; an id that matches nobody is rejected.
    pub async fn resolve_access(&self, student_id: Option<&str>) -> StudioResult<AccessContext> {
        let Some(id) = student_id.map(str::trim).filter(|id| !id.is_empty()) else {
            return Ok(AccessContext::Manager);
        };

        let exists = self.store.read(|data| data.find_student(id).is_some()).await;
        if exists {
            Ok(AccessContext::Student(id.to_string()))
        } else {
            warn!("Access link for unknown student {}", id);
            Err(StudioError::not_found(format!("Student {}", id)))
        }
    }

    /// List the community, optionally filtered by a case-insensitive search
    /// on name or e-mail
    pub async fn list_students(&self, search: Option<&str>) -> StudentListResponse {
        let needle = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();

        let students = self
            .store
            .read(|data| {
                data.students
                    .iter()
                    .filter(|s| {
                        needle.is_empty()
                            || s.name.to_lowercase().contains(&needle)
                            || s.email.to_lowercase().contains(&needle)
                    })
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;

        info!("Listing {} students (search: {:?})", students.len(), search);
        StudentListResponse { students }
    }

    pub async fn get_student(&self, student_id: &str) -> StudioResult<Student> {
        self.store
            .read(|data| data.find_student(student_id).cloned())
            .await
            .ok_or_else(|| StudioError::not_found(format!("Student {}", student_id)))
    }

    /// Enroll a student and seed their first payment, due one month from
    /// `today` at the plan price
    pub async fn enroll_student(
        &self,
        access: &AccessContext,
        request: EnrollStudentRequest,
        today: NaiveDate,
    ) -> StudioResult<EnrollStudentResponse> {
        access.require_manager("enroll students")?;
        info!("Enrolling student: name={}, plan={}", request.name, request.plan);

        validate_name(&request.name)?;
        validate_email(&request.email)?;
        validate_phone(&request.phone)?;
        if request.plan.trim().is_empty() {
            return Err(StudioError::validation("A plan must be selected"));
        }

        let due_date = today
            .checked_add_months(Months::new(1))
            .ok_or_else(|| StudioError::validation("Enrollment date out of range"))?;

        let student = Student {
            id: generate_id(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: request.phone.trim().to_string(),
            plan: request.plan.trim().to_string(),
            active: true,
            join_date: today.format(DATE_FORMAT).to_string(),
            photo: request.photo.filter(|p| !p.trim().is_empty()),
            password: Some(
                request
                    .password
                    .filter(|p| !p.trim().is_empty())
                    .unwrap_or_else(generate_password),
            ),
        };

        let access_link = links::access_link(&self.public_url, &student.id)?;

        let initial_payment = self
            .store
            .mutate(&[Collection::Students, Collection::Payments], |data| {
                let price = match data.plans.iter().find(|p| p.name == student.plan) {
                    Some(plan) => plan.price,
                    None => {
                        warn!("Unknown plan '{}', seeding payment with amount 0", student.plan);
                        0.0
                    }
                };

                let payment = Payment {
                    id: generate_id(),
                    student_id: student.id.clone(),
                    student_name: student.name.clone(),
                    amount: price,
                    due_date: due_date.format(DATE_FORMAT).to_string(),
                    status: PaymentStatus::Pending,
                    last_reminder_sent: None,
                };

                data.students.push(student.clone());
                data.payments.push(payment.clone());
                Ok(payment)
            })
            .await?;

        info!(
            "Enrolled {} ({}), first payment {} due {}",
            student.name, student.id, initial_payment.id, initial_payment.due_date
        );

        let welcome_message = self.messages.welcome(&student.name, &access_link).await;
        let whatsapp = Some(&student.phone)
            .filter(|p| !links::sanitize_phone(p).is_empty())
            .map(|p| links::whatsapp_link(p, &welcome_message));
        let links = WelcomeLinks {
            whatsapp,
            mail: links::mailto_link(&student.email, &access_link),
        };

        Ok(EnrollStudentResponse {
            student,
            initial_payment,
            access_link,
            welcome_message,
            links,
            success_message: "Student enrolled successfully".to_string(),
        })
    }

    /// Update a profile. Payment and session name snapshots are left as they
    /// were.
    pub async fn update_student(
        &self,
        access: &AccessContext,
        student_id: &str,
        request: UpdateStudentRequest,
    ) -> StudioResult<StudentResponse> {
        access.require_owner_or_manager(student_id, "edit")?;
        info!("Updating student {}", student_id);

        if let Some(name) = &request.name {
            validate_name(name)?;
        }
        if let Some(email) = &request.email {
            validate_email(email)?;
        }
        if let Some(phone) = &request.phone {
            validate_phone(phone)?;
        }
        if request.active.is_some() {
            access.require_manager("activate or deactivate students")?;
        }

        let student = self
            .store
            .mutate(&[Collection::Students], |data| {
                let student = data
                    .students
                    .iter_mut()
                    .find(|s| s.id == student_id)
                    .ok_or_else(|| StudioError::not_found(format!("Student {}", student_id)))?;

                if let Some(name) = request.name {
                    student.name = name.trim().to_string();
                }
                if let Some(email) = request.email {
                    student.email = email.trim().to_string();
                }
                if let Some(phone) = request.phone {
                    student.phone = phone.trim().to_string();
                }
                if let Some(plan) = request.plan.filter(|p| !p.trim().is_empty()) {
                    student.plan = plan.trim().to_string();
                }
                if let Some(photo) = request.photo {
                    student.photo = Some(photo).filter(|p| !p.trim().is_empty());
                }
                if let Some(password) = request.password.filter(|p| !p.trim().is_empty()) {
                    student.password = Some(password);
                }
                if let Some(active) = request.active {
                    student.active = active;
                }

                Ok(student.clone())
            })
            .await?;

        Ok(StudentResponse {
            student,
            success_message: "Student updated successfully".to_string(),
        })
    }

    /// Remove a student and everything that references them
    pub async fn remove_student(
        &self,
        access: &AccessContext,
        student_id: &str,
    ) -> StudioResult<RemoveStudentResponse> {
        access.require_manager("remove students")?;
        info!("Removing student {}", student_id);

        let outcome = self.store.remove_student_cascade(student_id).await?;
        info!(
            "Removed {} with {} payments and {} sessions",
            outcome.student.name, outcome.payments_removed, outcome.sessions_removed
        );

        let farewell_message = self.messages.farewell(&outcome.student.name).await;

        Ok(RemoveStudentResponse {
            removed_student_id: outcome.student.id,
            removed_payments: outcome.payments_removed,
            removed_sessions: outcome.sessions_removed,
            farewell_message,
            success_message: "Student removed successfully".to_string(),
        })
    }
}

fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Default individual password: `me` followed by four digits
fn generate_password() -> String {
    format!("me{}", rand::thread_rng().gen_range(1000..=9999))
}

fn validate_name(name: &str) -> StudioResult<()> {
    if name.trim().is_empty() {
        return Err(StudioError::validation("Student name cannot be empty"));
    }
    if name.trim().chars().count() > MAX_NAME_LENGTH {
        return Err(StudioError::validation(format!(
            "Student name cannot exceed {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> StudioResult<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StudioError::validation(format!("Invalid e-mail address '{}'", email)))
    }
}

/// Phones are optional. A phone on file is DDD + 9 + number: exactly 11
/// digits once punctuation is removed.
fn validate_phone(phone: &str) -> StudioResult<()> {
    let phone = phone.trim();
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if phone.is_empty() || digits == 11 {
        Ok(())
    } else {
        Err(StudioError::validation("Use 11 dígitos: DDD + 9 + número"))
    }
}
