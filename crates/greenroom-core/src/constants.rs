/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const SCHEDULE_ROUTE_COMPONENT: &str = "schedule";
pub const SCHEDULE_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", SCHEDULE_ROUTE_COMPONENT);

pub const ADMIN_ROUTE_COMPONENT: &str = "admin";
pub const ADMIN_ROUTE_PREFIX: &str =
    const_str::concat!(SCHEDULE_ROUTE_PREFIX, "/", ADMIN_ROUTE_COMPONENT);

/// Key of the single availability record.
pub const AVAILABILITY_RECORD_ID: &str = "default";

/// Invite expiry bounds, in days.
pub const INVITE_MIN_DAYS: i64 = 1;
pub const INVITE_MAX_DAYS: i64 = 365;

/// Path component of guest-facing invite links: `{origin}/schedule/{token}`.
pub const INVITE_LINK_COMPONENT: &str = "schedule";
