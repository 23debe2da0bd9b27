//! Holiday domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use leavedesk_shared::types::{CompanyId, HolidayId};

/// Scope of a holiday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HolidayKind {
    /// Observed nationwide.
    National,
    /// Observed in one state or region.
    State,
    /// Declared by the company.
    Company,
}

impl HolidayKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::National => "NATIONAL",
            Self::State => "STATE",
            Self::Company => "COMPANY",
        }
    }
}

impl fmt::Display for HolidayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A company holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// Unique identifier.
    pub id: HolidayId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Display name.
    pub name: String,
    /// Date observed.
    pub date: NaiveDate,
    /// Scope.
    pub kind: HolidayKind,
    /// Region code for state holidays.
    pub state: Option<String>,
    /// Shown to employees.
    pub active: bool,
    /// Soft-delete marker.
    pub deleted: bool,
}

/// Fields supplied when creating or updating a holiday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolidayInput {
    /// Display name.
    pub name: String,
    /// Date observed.
    pub date: NaiveDate,
    /// Scope.
    pub kind: HolidayKind,
    /// Region code.
    #[serde(default)]
    pub state: Option<String>,
    /// Shown to employees.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl HolidayInput {
    /// An active holiday with no region.
    #[must_use]
    pub fn new(name: impl Into<String>, date: NaiveDate, kind: HolidayKind) -> Self {
        Self {
            name: name.into(),
            date,
            kind,
            state: None,
            active: true,
        }
    }
}
