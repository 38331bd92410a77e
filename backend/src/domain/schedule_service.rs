//! Class sessions: booking, rescheduling and the weekly agenda

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use log::info;
use uuid::Uuid;

use super::access::AccessContext;
use super::errors::{StudioError, StudioResult};
use super::message_composer::MessageService;
use crate::storage::{Collection, Store};
use shared::{
    ClassListResponse, ClassSession, ClassSessionResponse, RescheduleClassRequest,
    ScheduleClassRequest, ScheduleSummaryResponse, SessionStatus, WeekGrid, WeekSlot, DATE_FORMAT,
};

/// First and last bookable hour of the day
pub const FIRST_HOUR: u32 = 7;
pub const LAST_HOUR: u32 = 20;
/// Monday through Saturday
pub const DAYS_PER_WEEK: i64 = 6;

const TIME_FORMAT: &str = "%H:%M";

#[derive(Clone)]
pub struct ScheduleService {
    store: Store,
    messages: MessageService,
}

impl ScheduleService {
    pub fn new(store: Store, messages: MessageService) -> Self {
        Self { store, messages }
    }

    /// Sessions visible in `access`, ordered by date and time
    pub async fn list_sessions(&self, access: &AccessContext) -> ClassListResponse {
        let sessions = self.visible_sessions(access).await;
        info!("Listing {} sessions for {}", sessions.len(), access.role());
        ClassListResponse { sessions }
    }

    pub async fn schedule_session(
        &self,
        access: &AccessContext,
        request: ScheduleClassRequest,
    ) -> StudioResult<ClassSessionResponse> {
        access.require_manager("schedule classes")?;
        info!(
            "Scheduling class for student {} on {} at {}",
            request.student_id, request.date, request.time
        );

        let date = parse_date(&request.date)?;
        let time = parse_time(&request.time)?;
        if request.instructor.trim().is_empty() {
            return Err(StudioError::validation("Instructor cannot be empty"));
        }

        let session = self
            .store
            .mutate(&[Collection::Classes], |data| {
                let student = data.find_student(&request.student_id).ok_or_else(|| {
                    StudioError::not_found(format!("Student {}", request.student_id))
                })?;

                let session = ClassSession {
                    id: Uuid::new_v4().simple().to_string(),
                    student_id: student.id.clone(),
                    student_name: student.name.clone(),
                    instructor: request.instructor.trim().to_string(),
                    date,
                    time,
                    status: SessionStatus::Scheduled,
                };
                data.classes.push(session.clone());
                Ok(session)
            })
            .await?;

        Ok(ClassSessionResponse {
            session,
            success_message: "Class scheduled successfully".to_string(),
        })
    }

    /// Move a session to a new date and time. The student name snapshot is kept.
    pub async fn reschedule_session(
        &self,
        access: &AccessContext,
        session_id: &str,
        request: RescheduleClassRequest,
    ) -> StudioResult<ClassSessionResponse> {
        let date = parse_date(&request.date)?;
        let time = parse_time(&request.time)?;

        let session = self
            .store
            .mutate(&[Collection::Classes], |data| {
                let session = data
                    .classes
                    .iter_mut()
                    .find(|c| c.id == session_id)
                    .ok_or_else(|| StudioError::not_found(format!("Class {}", session_id)))?;
                access.require_owner_or_manager(&session.student_id, "reschedule")?;

                session.date = date;
                session.time = time;
                Ok(session.clone())
            })
            .await?;

        info!(
            "Class {} moved to {} at {}",
            session.id, session.date, session.time
        );
        Ok(ClassSessionResponse {
            session,
            success_message: "Class rescheduled successfully".to_string(),
        })
    }

    /// The first visible session on `date` in the same hour as `time`
    pub async fn find_session(
        &self,
        access: &AccessContext,
        date: &str,
        time: &str,
    ) -> Option<ClassSession> {
        let sessions = self.visible_sessions(access).await;
        find_in_slot(&sessions, date, time).cloned()
    }

    /// Monday to Saturday of the week containing `day`, hours 07:00 to 20:00
    pub async fn week_grid(&self, access: &AccessContext, day: NaiveDate) -> WeekGrid {
        let sessions = self.visible_sessions(access).await;
        build_week_grid(&sessions, day)
    }

    /// Manager: a short agenda summary for `date`. Student: a fixed greeting.
    pub async fn summarize_day(
        &self,
        access: &AccessContext,
        date: NaiveDate,
    ) -> ScheduleSummaryResponse {
        if !access.is_manager() {
            return ScheduleSummaryResponse {
                summary: self.messages.templates().student_greeting(),
            };
        }

        let day = date.format(DATE_FORMAT).to_string();
        let sessions: Vec<ClassSession> = self
            .visible_sessions(access)
            .await
            .into_iter()
            .filter(|c| c.date == day)
            .collect();

        info!("Summarizing {} sessions on {}", sessions.len(), day);
        ScheduleSummaryResponse {
            summary: self.messages.schedule_summary(&sessions).await,
        }
    }

    async fn visible_sessions(&self, access: &AccessContext) -> Vec<ClassSession> {
        let mut sessions: Vec<ClassSession> = self
            .store
            .read(|data| {
                data.classes
                    .iter()
                    .filter(|c| access.can_view(&c.student_id))
                    .cloned()
                    .collect()
            })
            .await;
        sessions.sort_by(|a, b| (&a.date, &a.time).cmp(&(&b.date, &b.time)));
        sessions
    }
}

/// Sessions on `date` ordered by time, as shown on the dashboard
pub fn sessions_on(sessions: &[ClassSession], date: NaiveDate) -> Vec<ClassSession> {
    let day = date.format(DATE_FORMAT).to_string();
    let mut found: Vec<ClassSession> = sessions.iter().filter(|c| c.date == day).cloned().collect();
    found.sort_by(|a, b| a.time.cmp(&b.time));
    found
}

fn find_in_slot<'a>(
    sessions: &'a [ClassSession],
    date: &str,
    time: &str,
) -> Option<&'a ClassSession> {
    let hour = time.split(':').next().unwrap_or(time);
    sessions
        .iter()
        .find(|c| c.date == date && c.time.split(':').next() == Some(hour))
}

fn build_week_grid(sessions: &[ClassSession], day: NaiveDate) -> WeekGrid {
    let monday = day - Duration::days(i64::from(day.weekday().num_days_from_monday()));
    let days: Vec<String> = (0..DAYS_PER_WEEK)
        .map(|offset| (monday + Duration::days(offset)).format(DATE_FORMAT).to_string())
        .collect();
    let hours: Vec<String> = (FIRST_HOUR..=LAST_HOUR).map(|h| format!("{:02}:00", h)).collect();

    let slots = hours
        .iter()
        .map(|hour| {
            days.iter()
                .map(|date| WeekSlot {
                    date: date.clone(),
                    time: hour.clone(),
                    session: find_in_slot(sessions, date, hour).cloned(),
                })
                .collect()
        })
        .collect();

    WeekGrid { days, hours, slots }
}

fn parse_date(raw: &str) -> StudioResult<String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .map_err(|_| {
            StudioError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw))
        })
}

fn parse_time(raw: &str) -> StudioResult<String> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT)
        .map(|t| t.format(TIME_FORMAT).to_string())
        .map_err(|_| StudioError::validation(format!("Invalid time '{}', expected HH:MM", raw)))
}
