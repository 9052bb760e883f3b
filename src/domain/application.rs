use std::collections::BTreeSet;
use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::section::Section;

/// Lifecycle of a stored application.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApplicationStatus {
    Draft,
    Submitted,
}

impl Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationStatus::Draft => write!(f, "draft"),
            ApplicationStatus::Submitted => write!(f, "submitted"),
        }
    }
}

impl From<&str> for ApplicationStatus {
    fn from(s: &str) -> Self {
        match s {
            "submitted" => ApplicationStatus::Submitted,
            _ => ApplicationStatus::Draft,
        }
    }
}

/// Review state of an exception request raised from step 1.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConsiderationStatus {
    None,
    Pending,
    Approved,
    Rejected,
}

impl Display for ConsiderationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsiderationStatus::None => write!(f, "none"),
            ConsiderationStatus::Pending => write!(f, "pending"),
            ConsiderationStatus::Approved => write!(f, "approved"),
            ConsiderationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl From<&str> for ConsiderationStatus {
    fn from(s: &str) -> Self {
        match s {
            "pending" => ConsiderationStatus::Pending,
            "approved" => ConsiderationStatus::Approved,
            "rejected" => ConsiderationStatus::Rejected,
            _ => ConsiderationStatus::None,
        }
    }
}

/// An exception-request allowing an applicant to proceed past a "no"
/// eligibility answer pending admin approval.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SpecialConsideration {
    pub status: ConsiderationStatus,
    pub message: Option<String>,
}

impl SpecialConsideration {
    pub fn none() -> Self {
        Self {
            status: ConsiderationStatus::None,
            message: None,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == ConsiderationStatus::Approved
    }
}

/// Membership tier applied for.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum MembershipType {
    Principal,
    Associate,
    Observer,
    Other(String),
}

impl Display for MembershipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MembershipType::Principal => write!(f, "Principal"),
            MembershipType::Associate => write!(f, "Associate"),
            MembershipType::Observer => write!(f, "Observer"),
            MembershipType::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for MembershipType {
    fn from(s: &str) -> Self {
        match s {
            "Principal" => MembershipType::Principal,
            "Associate" => MembershipType::Associate,
            "Observer" => MembershipType::Observer,
            _ => MembershipType::Other(s.to_string()),
        }
    }
}

/// One applicant's stored membership application: the cumulative section
/// answers plus wizard progress and review state.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Application {
    pub id: i32,
    pub applicant_id: String,
    pub membership_type: Option<MembershipType>,
    pub status: ApplicationStatus,
    pub special_consideration: SpecialConsideration,
    /// Section answers keyed by [`Section::data_key`]. May contain legacy
    /// flat fields; readers normalize before use.
    pub data: Map<String, Value>,
    pub current_step: u8,
    pub completed_steps: BTreeSet<u8>,
    /// Save token; bumped on every accepted section save.
    pub revision: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Application {
    pub fn is_submitted(&self) -> bool {
        self.status == ApplicationStatus::Submitted
    }

    /// Borrow a section's stored answers, when present as an object.
    pub fn section_object(&self, section: Section) -> Option<&Map<String, Value>> {
        self.data.get(section.data_key()).and_then(Value::as_object)
    }

    /// Registered company name, once step 2 has been saved. Used by the
    /// admin listing and its search.
    pub fn company_name(&self) -> Option<&str> {
        self.section_object(Section::CompanyDetails)
            .and_then(|details| details.get("companyName"))
            .and_then(Value::as_str)
    }
}
