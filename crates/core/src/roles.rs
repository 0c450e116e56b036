//! Well-known role and permission names carried in access tokens.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";

/// Full control over inventory, including the alert feed.
pub const PERM_INVENTORY_ADMIN: &str = "inventory:admin";
/// Read-only access to the low-stock alert feed.
pub const PERM_ALERTS_READ: &str = "alerts:read";

/// Whether a caller may read the stock alert feed.
///
/// Admins always can; other roles need `inventory:admin` or `alerts:read`.
pub fn can_read_alerts<S: AsRef<str>>(role: &str, permissions: &[S]) -> bool {
    role == ROLE_ADMIN
        || permissions
            .iter()
            .any(|p| matches!(p.as_ref(), PERM_INVENTORY_ADMIN | PERM_ALERTS_READ))
}

/// Whether a caller has full inventory rights, such as choosing where alert
/// notifications are sent.
pub fn can_manage_inventory<S: AsRef<str>>(role: &str, permissions: &[S]) -> bool {
    role == ROLE_ADMIN || permissions.iter().any(|p| p.as_ref() == PERM_INVENTORY_ADMIN)
}
