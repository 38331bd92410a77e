use chrono::NaiveDate;
use shared::{AlertDto, AlertIssue, AlertKind, AlertListResponse, DATE_FORMAT};

use crate::domain::alert_engine::{AlertError, AlertReport, BillingAlert, BillingRule};

pub struct AlertMapper;

impl AlertMapper {
    pub fn kind_to_dto(rule: BillingRule) -> AlertKind {
        match rule {
            BillingRule::Preventive => AlertKind::Preventive,
            BillingRule::Late => AlertKind::Late,
            BillingRule::Recollection { .. } => AlertKind::Recollection,
        }
    }

    pub fn to_dto(alert: &BillingAlert) -> AlertDto {
        AlertDto {
            payment_id: alert.payment_id.clone(),
            student_id: alert.student_id.clone(),
            kind: Self::kind_to_dto(alert.rule),
            message: alert.to_string(),
        }
    }

    pub fn issue_to_dto(error: &AlertError) -> AlertIssue {
        AlertIssue {
            payment_id: error.payment_id().to_string(),
            message: error.to_string(),
        }
    }

    pub fn to_list_response(report: &AlertReport, today: NaiveDate) -> AlertListResponse {
        AlertListResponse {
            today: today.format(DATE_FORMAT).to_string(),
            alerts: report.alerts.iter().map(Self::to_dto).collect(),
            issues: report.errors.iter().map(Self::issue_to_dto).collect(),
        }
    }
}
