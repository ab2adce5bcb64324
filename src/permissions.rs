//! Role and capability resolution for dashboard editing.
//!
//! A dashboard is either unlocked or locked, and each mode consults its own
//! pair of capabilities: `{SaveLayout, AddPanel}` when unlocked,
//! `{EditLockedDashboard, AddPanelLockedDashboard}` when locked. The two
//! pairs are mutually exclusive; the lock flag picks which one applies.

use serde::{Deserialize, Serialize};

/// The viewer's role on a dashboard. `Author` is never assigned directly;
/// it is derived when the viewer created the dashboard at hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Editor,
    Admin,
    Author,
}

/// Named capabilities gating layout actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    SaveLayout,
    AddPanel,
    EditLockedDashboard,
    AddPanelLockedDashboard,
}

impl Capability {
    /// The capability matrix. Everything beyond viewing requires at least
    /// `Editor`; touching a locked dashboard requires `Admin` or `Author`.
    pub fn granted_to(self, role: Role) -> bool {
        match self {
            Capability::SaveLayout | Capability::AddPanel => {
                matches!(role, Role::Author | Role::Admin | Role::Editor)
            }
            Capability::EditLockedDashboard | Capability::AddPanelLockedDashboard => {
                matches!(role, Role::Author | Role::Admin)
            }
        }
    }
}

/// Who is looking at the dashboard this session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewerSession {
    pub email: String,
    pub role: Role,
}

impl ViewerSession {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }
}

/// Substitute `Author` for the assigned role when the viewer created the
/// dashboard. Authors keep the superset of rights on their own dashboards
/// no matter what role they were assigned. Empty identities never match.
pub fn effective_role(assigned: Role, viewer_email: &str, created_by: &str) -> Role {
    if !viewer_email.is_empty() && viewer_email == created_by {
        Role::Author
    } else {
        assigned
    }
}

/// The capability pair in effect for this session, already resolved against
/// the lock flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutPermissions {
    pub can_edit_layout: bool,
    pub can_add_panel: bool,
}

/// Pure derivation, recomputed every frame. The lock flag selects which
/// capability pair is consulted; the role decides whether each is granted.
pub fn resolve_layout_permissions(locked: bool, role: Role) -> LayoutPermissions {
    let (edit, add) = if locked {
        (
            Capability::EditLockedDashboard,
            Capability::AddPanelLockedDashboard,
        )
    } else {
        (Capability::SaveLayout, Capability::AddPanel)
    };
    LayoutPermissions {
        can_edit_layout: edit.granted_to(role),
        can_add_panel: add.granted_to(role),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlocked_pair_follows_editor_line() {
        for role in [Role::Author, Role::Admin, Role::Editor] {
            let perms = resolve_layout_permissions(false, role);
            assert!(perms.can_edit_layout, "{role:?} should save layouts");
            assert!(perms.can_add_panel, "{role:?} should add panels");
        }
        let viewer = resolve_layout_permissions(false, Role::Viewer);
        assert!(!viewer.can_edit_layout);
        assert!(!viewer.can_add_panel);
    }

    #[test]
    fn locked_pair_is_admin_only() {
        let editor = resolve_layout_permissions(true, Role::Editor);
        assert!(!editor.can_edit_layout);
        assert!(!editor.can_add_panel);

        for role in [Role::Author, Role::Admin] {
            let perms = resolve_layout_permissions(true, role);
            assert!(perms.can_edit_layout, "{role:?} should edit locked");
            assert!(perms.can_add_panel, "{role:?} should add to locked");
        }
    }

    #[test]
    fn author_override_beats_assigned_role() {
        let role = effective_role(Role::Viewer, "ada@example.com", "ada@example.com");
        assert_eq!(role, Role::Author);
        assert!(resolve_layout_permissions(false, role).can_edit_layout);
    }

    #[test]
    fn author_override_requires_identity_match() {
        assert_eq!(
            effective_role(Role::Editor, "ada@example.com", "grace@example.com"),
            Role::Editor
        );
        // Two missing identities are not a match.
        assert_eq!(effective_role(Role::Viewer, "", ""), Role::Viewer);
    }
}
