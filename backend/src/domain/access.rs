//! Who is asking.
//!
//! There is no authentication: the manager is the default context and a
//! student context is entered through their individual access link
//! (`?studentId=<id>`). Every operation that scopes or authorizes takes an
//! `AccessContext` explicitly.

use super::errors::{StudioError, StudioResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessContext {
    Manager,
    Student(String),
}

impl AccessContext {
    pub fn is_manager(&self) -> bool {
        matches!(self, AccessContext::Manager)
    }

    pub fn student_id(&self) -> Option<&str> {
        match self {
            AccessContext::Manager => None,
            AccessContext::Student(id) => Some(id),
        }
    }

    /// Role label used by the API
    pub fn role(&self) -> &'static str {
        match self {
            AccessContext::Manager => "MANAGER",
            AccessContext::Student(_) => "STUDENT",
        }
    }

    pub fn require_manager(&self, action: &str) -> StudioResult<()> {
        if self.is_manager() {
            Ok(())
        } else {
            Err(StudioError::forbidden(format!("Only the manager can {}", action)))
        }
    }

    /// True when records owned by `student_id` are visible in this context
    pub fn can_view(&self, student_id: &str) -> bool {
        match self {
            AccessContext::Manager => true,
            AccessContext::Student(own) => own == student_id,
        }
    }

    /// The manager may edit anyone; a student only their own profile
    pub fn require_owner_or_manager(&self, student_id: &str, action: &str) -> StudioResult<()> {
        if self.can_view(student_id) {
            Ok(())
        } else {
            Err(StudioError::forbidden(format!(
                "Students can only {} their own records",
                action
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_sees_everything() {
        let access = AccessContext::Manager;
        assert!(access.can_view("1"));
        assert!(access.require_manager("remove students").is_ok());
        assert_eq!(access.role(), "MANAGER");
        assert_eq!(access.student_id(), None);
    }

    #[test]
    fn test_student_is_scoped_to_own_records() {
        let access = AccessContext::Student("1".to_string());
        assert!(access.can_view("1"));
        assert!(!access.can_view("2"));
        assert!(access.require_owner_or_manager("1", "edit").is_ok());

        let err = access.require_owner_or_manager("2", "edit").unwrap_err();
        assert!(matches!(err, StudioError::Forbidden(_)));

        let err = access.require_manager("toggle payments").unwrap_err();
        assert_eq!(err.to_string(), "Only the manager can toggle payments");
    }
}
