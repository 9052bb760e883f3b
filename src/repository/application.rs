use chrono::Utc;
use diesel::prelude::*;
use serde_json::Value;

use crate::domain::application::{Application, ApplicationStatus, ConsiderationStatus};
use crate::domain::section::APPLICATION_KEY;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    ApplicationListQuery, ApplicationReader, ApplicationWriter, DieselRepository, SectionSave,
};

impl ApplicationReader for DieselRepository {
    fn get_application(&self, applicant_id: &str) -> RepositoryResult<Option<Application>> {
        use crate::models::application::Application as DbApplication;
        use crate::schema::applications;

        let mut conn = self.conn()?;
        let row = applications::table
            .filter(applications::applicant_id.eq(applicant_id))
            .first::<DbApplication>(&mut conn)
            .optional()?;

        row.map(Application::try_from).transpose().map_err(Into::into)
    }

    fn get_application_by_id(&self, id: i32) -> RepositoryResult<Option<Application>> {
        use crate::models::application::Application as DbApplication;
        use crate::schema::applications;

        let mut conn = self.conn()?;
        let row = applications::table
            .find(id)
            .first::<DbApplication>(&mut conn)
            .optional()?;

        row.map(Application::try_from).transpose().map_err(Into::into)
    }

    fn list_applications(
        &self,
        query: ApplicationListQuery,
    ) -> RepositoryResult<(usize, Vec<Application>)> {
        use crate::models::application::Application as DbApplication;
        use crate::schema::applications;

        let mut conn = self.conn()?;

        let mut sql = applications::table.into_boxed();
        if let Some(status) = query.status {
            sql = sql.filter(applications::status.eq(status.to_string()));
        }
        if let Some(consideration) = query.consideration {
            sql = sql.filter(applications::consideration_status.eq(consideration.to_string()));
        }

        let rows = sql
            .order(applications::updated_at.desc())
            .load::<DbApplication>(&mut conn)?;

        let mut items = rows
            .into_iter()
            .map(Application::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        // The company name lives inside the JSON answers column, so the
        // search term is matched after conversion rather than in SQL.
        if let Some(term) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
        {
            let term = term.to_lowercase();
            items.retain(|application| {
                application
                    .company_name()
                    .is_some_and(|name| name.to_lowercase().contains(&term))
                    || application.applicant_id.to_lowercase().contains(&term)
            });
        }

        let total = items.len();
        if let Some(pagination) = &query.pagination {
            let page = pagination.page.max(1);
            let offset = (page - 1) * pagination.per_page;
            items = items
                .into_iter()
                .skip(offset)
                .take(pagination.per_page)
                .collect();
        }

        Ok((total, items))
    }
}

impl ApplicationWriter for DieselRepository {
    fn save_section(
        &self,
        applicant_id: &str,
        save: &SectionSave,
    ) -> RepositoryResult<Application> {
        use crate::models::application::{
            Application as DbApplication, NewApplication, SectionChangeset,
        };
        use crate::schema::applications;

        let mut conn = self.conn()?;
        conn.immediate_transaction(|conn| {
            let now = Utc::now().naive_utc();

            let existing = applications::table
                .filter(applications::applicant_id.eq(applicant_id))
                .first::<DbApplication>(conn)
                .optional()?;

            let row = match existing {
                Some(row) => row,
                None => {
                    diesel::insert_into(applications::table)
                        .values(&NewApplication::empty(applicant_id, now))
                        .execute(conn)?;
                    applications::table
                        .filter(applications::applicant_id.eq(applicant_id))
                        .first::<DbApplication>(conn)?
                }
            };

            let mut application = Application::try_from(row)?;

            if save.expected_revision != application.revision {
                return Err(RepositoryError::StaleRevision {
                    expected: save.expected_revision,
                    stored: application.revision,
                });
            }

            // Same shallow semantics as the in-memory draft: each payload key
            // wholesale-replaces the stored section object under that key.
            for (key, value) in save.payload.clone() {
                application.data.insert(key, value);
            }
            application.completed_steps.insert(save.section.step());

            let membership_type = application
                .data
                .get(APPLICATION_KEY)
                .and_then(|fields| fields.get("membershipType"))
                .and_then(Value::as_str)
                .map(str::to_string);

            let status = if save.submit {
                ApplicationStatus::Submitted
            } else {
                application.status
            };

            let changeset = SectionChangeset {
                membership_type,
                status: status.to_string(),
                data: serde_json::to_string(&application.data)?,
                current_step: i32::from(save.next_step),
                completed_steps: serde_json::to_string(&application.completed_steps)?,
                revision: application.revision + 1,
                updated_at: now,
            };

            diesel::update(applications::table.find(application.id))
                .set(&changeset)
                .execute(conn)?;

            let updated = applications::table
                .find(application.id)
                .first::<DbApplication>(conn)?;
            Application::try_from(updated).map_err(Into::into)
        })
    }

    fn set_consideration(
        &self,
        applicant_id: &str,
        status: ConsiderationStatus,
        message: Option<&str>,
    ) -> RepositoryResult<Application> {
        use crate::models::application::Application as DbApplication;
        use crate::schema::applications;

        let mut conn = self.conn()?;
        conn.immediate_transaction(|conn| {
            let row = applications::table
                .filter(applications::applicant_id.eq(applicant_id))
                .first::<DbApplication>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            diesel::update(applications::table.find(row.id))
                .set((
                    applications::consideration_status.eq(status.to_string()),
                    applications::consideration_message.eq(message),
                    applications::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;

            let updated = applications::table
                .find(row.id)
                .first::<DbApplication>(conn)?;
            Application::try_from(updated).map_err(Into::into)
        })
    }
}
