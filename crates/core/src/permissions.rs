//! Authorization capability consumed by the HTTP layer.
//!
//! The annotation engine never checks permissions itself; callers ask a
//! [`PermissionGate`] before invoking it.

use crate::error::CoreError;
use crate::roles::{ROLE_ADMIN, ROLE_ANNOTATOR, ROLE_PROJECT_OWNER};
use crate::types::DbId;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: DbId,
    pub role: String,
}

impl Principal {
    /// Admins bypass every check, including user management.
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Operations a caller may request against a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Annotate,
    ManageDocuments,
    ManageLabels,
    ManageProjects,
    /// Create accounts and reset other users' passwords. Never project scoped.
    ManageUsers,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Annotate => "annotate",
            Self::ManageDocuments => "manage_documents",
            Self::ManageLabels => "manage_labels",
            Self::ManageProjects => "manage_projects",
            Self::ManageUsers => "manage_users",
        }
    }
}

/// Decides whether a principal may perform an action on a project.
///
/// `project_id` is `None` for actions that are not scoped to an existing
/// project, such as creating one.
pub trait PermissionGate: Send + Sync {
    fn check(
        &self,
        principal: &Principal,
        project_id: Option<DbId>,
        action: Action,
    ) -> Result<(), CoreError>;
}

/// Role-based gate keyed on the principal's global role.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePermissionGate;

impl RolePermissionGate {
    fn allows(principal: &Principal, action: Action) -> bool {
        if principal.is_admin() {
            return true;
        }
        match principal.role.as_str() {
            ROLE_PROJECT_OWNER => action != Action::ManageUsers,
            ROLE_ANNOTATOR => matches!(action, Action::Read | Action::Annotate),
            _ => matches!(action, Action::Read),
        }
    }
}

impl PermissionGate for RolePermissionGate {
    fn check(
        &self,
        principal: &Principal,
        project_id: Option<DbId>,
        action: Action,
    ) -> Result<(), CoreError> {
        if Self::allows(principal, action) {
            return Ok(());
        }
        let scope = project_id
            .map(|id| format!(" on project {id}"))
            .unwrap_or_default();
        Err(CoreError::Forbidden(format!(
            "Role '{}' may not {}{scope}",
            principal.role,
            action.as_str()
        )))
    }
}
