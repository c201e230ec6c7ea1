pub const ROLE_STUDENT: &str = "Mahasiswa";
pub const ROLE_ADVISOR: &str = "Dosen Wali";
pub const ROLE_ADMIN: &str = "Admin";

/// Closed set of roles the achievement workflow dispatches on
///
/// Resolved once from the role name stored in the ledger; nothing past the
/// profile provider compares role display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
    Student,
    Advisor,
    Admin,
    /// A role that exists in the ledger but has no achievement scope
    Other,
}

impl RoleKind {
    pub fn from_role_name(name: &str) -> Self {
        match name {
            ROLE_STUDENT => RoleKind::Student,
            ROLE_ADVISOR => RoleKind::Advisor,
            ROLE_ADMIN => RoleKind::Admin,
            _ => RoleKind::Other,
        }
    }
}

/// Authenticated caller as seen by the coordinators
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub user_id: String,
    pub role_id: String,
    pub role_name: String,
    pub kind: RoleKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_kind_from_known_names() {
        assert_eq!(RoleKind::from_role_name("Mahasiswa"), RoleKind::Student);
        assert_eq!(RoleKind::from_role_name("Dosen Wali"), RoleKind::Advisor);
        assert_eq!(RoleKind::from_role_name("Admin"), RoleKind::Admin);
    }

    #[test]
    fn test_role_kind_is_case_sensitive() {
        assert_eq!(RoleKind::from_role_name("admin"), RoleKind::Other);
        assert_eq!(RoleKind::from_role_name("Librarian"), RoleKind::Other);
    }
}
