use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Teacher,
    Student,
    Admin,
}

/// Caller identity passed explicitly into every engine call.
/// Engines never read the current user from ambient state.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl UserContext {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }
}

/// Check that the caller may touch answer keys (assembly, grading, analysis)
pub fn require_teacher(ctx: &UserContext) -> Result<()> {
    if ctx.role != UserRole::Teacher && ctx.role != UserRole::Admin {
        return Err(AppError::Forbidden(format!(
            "Required role: Teacher, got: {:?}",
            ctx.role
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teacher_and_admin_pass() {
        assert!(require_teacher(&UserContext::new(Uuid::new_v4(), UserRole::Teacher)).is_ok());
        assert!(require_teacher(&UserContext::new(Uuid::new_v4(), UserRole::Admin)).is_ok());
    }

    #[test]
    fn test_student_is_forbidden() {
        let err = require_teacher(&UserContext::new(Uuid::new_v4(), UserRole::Student));
        assert!(matches!(err, Err(AppError::Forbidden(_))));
    }
}
