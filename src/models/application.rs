use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde_json::{Map, Value};

use crate::domain::application::{
    Application as DomainApplication, ApplicationStatus, ConsiderationStatus, MembershipType,
    SpecialConsideration,
};
use crate::domain::section::Section;

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::applications)]
/// Diesel model for [`crate::domain::application::Application`]. The section
/// answers and completed-step set are stored as JSON text columns.
pub struct Application {
    pub id: i32,
    pub applicant_id: String,
    pub membership_type: Option<String>,
    pub status: String,
    pub consideration_status: String,
    pub consideration_message: Option<String>,
    pub data: String,
    pub current_step: i32,
    pub completed_steps: String,
    pub revision: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::applications)]
/// Insertable form of [`Application`]; a fresh row at step 1 with no answers.
pub struct NewApplication<'a> {
    pub applicant_id: &'a str,
    pub status: String,
    pub consideration_status: String,
    pub data: String,
    pub current_step: i32,
    pub completed_steps: String,
    pub revision: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewApplication<'a> {
    pub fn empty(applicant_id: &'a str, now: NaiveDateTime) -> Self {
        Self {
            applicant_id,
            status: ApplicationStatus::Draft.to_string(),
            consideration_status: ConsiderationStatus::None.to_string(),
            data: "{}".to_string(),
            current_step: i32::from(Section::FIRST_STEP),
            completed_steps: "[]".to_string(),
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::applications)]
/// Column updates applied when a section save is accepted.
pub struct SectionChangeset {
    pub membership_type: Option<String>,
    pub status: String,
    pub data: String,
    pub current_step: i32,
    pub completed_steps: String,
    pub revision: i64,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Application> for DomainApplication {
    type Error = serde_json::Error;

    fn try_from(row: Application) -> Result<Self, Self::Error> {
        let data: Map<String, Value> = serde_json::from_str(&row.data)?;
        let completed_steps: BTreeSet<u8> = serde_json::from_str(&row.completed_steps)?;

        Ok(Self {
            id: row.id,
            applicant_id: row.applicant_id,
            membership_type: row
                .membership_type
                .as_deref()
                .map(MembershipType::from),
            status: ApplicationStatus::from(row.status.as_str()),
            special_consideration: SpecialConsideration {
                status: ConsiderationStatus::from(row.consideration_status.as_str()),
                message: row.consideration_message,
            },
            data,
            current_step: u8::try_from(row.current_step).unwrap_or(Section::FIRST_STEP),
            completed_steps,
            revision: row.revision,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sample_row() -> Application {
        let now = Utc::now().naive_utc();
        Application {
            id: 1,
            applicant_id: "u-1".to_string(),
            membership_type: Some("Principal".to_string()),
            status: "draft".to_string(),
            consideration_status: "pending".to_string(),
            consideration_message: Some("please review".to_string()),
            data: r#"{"applicability":{"isLicensedEntity":true}}"#.to_string(),
            current_step: 2,
            completed_steps: "[1]".to_string(),
            revision: 3,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_converts_into_domain() {
        let domain: DomainApplication = sample_row().try_into().unwrap();
        assert_eq!(domain.membership_type, Some(MembershipType::Principal));
        assert_eq!(domain.status, ApplicationStatus::Draft);
        assert_eq!(
            domain.special_consideration.status,
            ConsiderationStatus::Pending
        );
        assert_eq!(domain.current_step, 2);
        assert!(domain.completed_steps.contains(&1));
        assert!(domain.section_object(Section::Applicability).is_some());
    }

    #[test]
    fn corrupt_data_column_is_an_error() {
        let mut row = sample_row();
        row.data = "not json".to_string();
        assert!(DomainApplication::try_from(row).is_err());
    }
}
