//! Attendance domain types.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use leavedesk_shared::types::{AttendanceId, CompanyId, EmployeeId};

/// What a day's record says about the employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    /// At work.
    Present,
    /// Not at work without leave.
    Absent,
    /// Worked half the day.
    HalfDay,
    /// On approved leave.
    OnLeave,
    /// Scheduled day off.
    WeeklyOff,
    /// Company or public holiday.
    Holiday,
    /// Worked remotely.
    WorkFromHome,
}

impl AttendanceStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "PRESENT",
            Self::Absent => "ABSENT",
            Self::HalfDay => "HALF_DAY",
            Self::OnLeave => "ON_LEAVE",
            Self::WeeklyOff => "WEEKLY_OFF",
            Self::Holiday => "HOLIDAY",
            Self::WorkFromHome => "WORK_FROM_HOME",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the work happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkType {
    /// Company office.
    Office,
    /// Fully remote.
    Remote,
    /// Split between office and remote.
    Hybrid,
    /// Out in the field.
    FieldWork,
    /// At a client's premises.
    ClientSite,
}

impl WorkType {
    /// Returns the string representation of the work type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Office => "OFFICE",
            Self::Remote => "REMOTE",
            Self::Hybrid => "HYBRID",
            Self::FieldWork => "FIELD_WORK",
            Self::ClientSite => "CLIENT_SITE",
        }
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of a correction request on a record.
///
/// ```text
/// NotRequested --request--> Pending --approve--> Approved --request--> Pending
///                              |
///                              +----reject----> NotRequested
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrectionState {
    /// No open request.
    #[default]
    NotRequested,
    /// Awaiting a reviewer.
    Pending,
    /// The last request was applied.
    Approved,
}

/// One employee's record for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    /// Unique identifier.
    pub id: AttendanceId,
    /// Whose record.
    pub employee_id: EmployeeId,
    /// The employee's company.
    pub company_id: CompanyId,
    /// Date covered.
    pub date: NaiveDate,
    /// Time of punch-in.
    pub punch_in: Option<NaiveTime>,
    /// Time of punch-out.
    pub punch_out: Option<NaiveTime>,
    /// Where the work happened.
    pub work_type: Option<WorkType>,
    /// Day status.
    pub status: AttendanceStatus,
    /// Free-text audit trail.
    pub remarks: Option<String>,
    /// Correction request progress.
    pub correction: CorrectionState,
    /// Soft-delete marker.
    pub deleted: bool,
}

impl Attendance {
    /// Returns true if a correction is waiting for a reviewer.
    #[must_use]
    pub fn correction_pending(&self) -> bool {
        self.correction == CorrectionState::Pending
    }

    /// Appends `note` to the remarks.
    pub(crate) fn append_remark(&mut self, note: &str) {
        self.remarks = Some(match self.remarks.take() {
            Some(existing) if !existing.is_empty() => format!("{existing} | {note}"),
            _ => note.to_string(),
        });
    }
}

/// Direction of a punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Punch {
    /// Start of the working day.
    In,
    /// End of the working day.
    Out,
}

/// A punch submitted by the employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PunchInput {
    /// Date punched; must be today.
    pub date: NaiveDate,
    /// Clock time of the punch.
    pub time: NaiveTime,
    /// In or out.
    pub punch: Punch,
    /// Where the work happens; recorded on punch-in.
    #[serde(default)]
    pub work_type: Option<WorkType>,
}

impl PunchInput {
    /// A punch-in at `time` on `date`.
    #[must_use]
    pub fn punch_in(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            date,
            time,
            punch: Punch::In,
            work_type: None,
        }
    }

    /// A punch-out at `time` on `date`.
    #[must_use]
    pub fn punch_out(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            date,
            time,
            punch: Punch::Out,
            work_type: None,
        }
    }

    /// Sets the work type.
    #[must_use]
    pub fn with_work_type(mut self, work_type: WorkType) -> Self {
        self.work_type = Some(work_type);
        self
    }
}

/// Corrected values proposed by the employee or applied by a reviewer.
///
/// `None` fields leave the record's value unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrectionInput {
    /// Corrected punch-in time.
    #[serde(default)]
    pub punch_in: Option<NaiveTime>,
    /// Corrected punch-out time.
    #[serde(default)]
    pub punch_out: Option<NaiveTime>,
    /// Corrected work type.
    #[serde(default)]
    pub work_type: Option<WorkType>,
    /// Explanation.
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Share of recorded days in a month on which the employee was present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// Year summarized.
    pub year: i32,
    /// Month summarized, 1 through 12.
    pub month: u32,
    /// Records with status PRESENT.
    pub present_days: u32,
    /// All records in the month.
    pub recorded_days: u32,
    /// `present_days / recorded_days` as a percentage to one decimal place;
    /// zero when nothing was recorded.
    pub rate: Decimal,
}
