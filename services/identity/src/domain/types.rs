use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use passway_domain::user::{Role, Status};

/// Pending-action tag placed on every provider-created account until the
/// profile is completed.
pub const REQUIRED_REGISTRATION: &str = "registration";

/// Notification channel tag granted when the provider supplied an email.
pub const NOTIFY_EMAIL: &str = "email";

/// Local account record.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub second_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub region_id: Option<String>,
    pub tg_id: Option<String>,
    pub role: Role,
    pub status: Status,
    /// Pending-action tags, e.g. `registration`.
    pub required: Vec<String>,
    /// Channel tags the user can be reached through.
    pub notification_ways: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    /// Provider-sourced extras, stored verbatim.
    pub other_data: Map<String, Value>,
}

/// Link between one external identity and one local user.
#[derive(Debug, Clone)]
pub struct IdentityRelation {
    pub id: Uuid,
    pub provider_slug: String,
    /// The provider's own identifier for the user, kept as an opaque string.
    pub provider_user_id: String,
    pub provider_service: String,
    pub user_id: Uuid,
    pub linked_at: DateTime<Utc>,
    pub used_at: DateTime<Utc>,
}

/// Partial account update. `None` means "leave the field alone"; JSON `null`
/// and an absent key both land here as `None`, so neither clears a field.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub second_name: Option<String>,
    pub phone: Option<String>,
    pub tg_id: Option<String>,
    pub notification_ways: Option<Vec<String>>,
}

impl AccountPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.second_name.is_none()
            && self.phone.is_none()
            && self.tg_id.is_none()
            && self.notification_ways.is_none()
    }
}

/// Filter set for the bulk account listing.
#[derive(Debug, Clone, Default)]
pub struct UserFilters {
    /// Relative window, `last_<days>` (e.g. `last_30`).
    pub date_filter: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub region_id: Option<String>,
    pub role: Option<Role>,
    pub status: Option<Status>,
}

impl UserFilters {
    /// Lower bound on created_at implied by `date_filter`, if it parses.
    /// Unrecognized values are ignored rather than rejected.
    pub fn date_filter_cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let raw = self.date_filter.as_deref()?;
        let days: i64 = raw.strip_prefix("last_")?.parse().ok()?;
        if days <= 0 {
            return None;
        }
        Some(now - Duration::days(days))
    }
}
