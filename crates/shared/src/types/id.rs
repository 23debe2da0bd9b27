//! Typed IDs for type-safe entity references.
//!
//! Each entity gets its own UUIDv7 newtype, so an `EmployeeId` can never be
//! passed where a `CompanyId` is expected. Version 7 identifiers embed their
//! creation time, which gives listings a stable creation order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_ids {
    ($($(#[$attr:meta])* $name:ident;)+) => {$(
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh time-ordered identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Borrows the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    )+};
}

entity_ids! {
    /// Tenant company.
    CompanyId;
    /// Employee of a company.
    EmployeeId;
    /// Leave application.
    LeaveApplicationId;
    /// Leave balance row.
    LeaveBalanceId;
    /// Leave policy.
    LeavePolicyId;
    /// Holiday calendar entry.
    HolidayId;
    /// Daily attendance record.
    AttendanceId;
}
