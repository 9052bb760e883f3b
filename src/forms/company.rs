use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use validator::Validate;

use crate::domain::requirements::{license_dates_ordered, share_allocation_valid};
use crate::domain::types::{ContactEmail, PhoneNumber};
use crate::forms::{FormError, into_object};

/// Step 2: registered company details plus the shareholder, UBO, and
/// director tables. The tables arrive as parallel repeated fields and are
/// zipped into row objects during payload assembly.
#[derive(Debug, Deserialize, Validate)]
pub struct CompanyDetailsForm {
    #[validate(length(min = 1))]
    pub company_name: String,
    #[validate(length(min = 1))]
    pub trade_license_number: String,
    pub incorporation_date: NaiveDate,
    pub license_expiry_date: NaiveDate,
    #[validate(length(min = 1))]
    pub country_of_incorporation: String,
    #[validate(length(min = 1))]
    pub registered_address: String,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(min = 1))]
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    #[serde(default)]
    pub shareholder_name: Vec<String>,
    #[serde(default)]
    pub shareholder_share: Vec<String>,
    #[serde(default)]
    pub ubo_name: Vec<String>,
    #[serde(default)]
    pub ubo_nationality: Vec<String>,
    #[serde(default)]
    pub director_name: Vec<String>,
    #[serde(default)]
    pub director_designation: Vec<String>,
}

impl CompanyDetailsForm {
    /// Cross-field rules the derive cannot express: date ordering, the
    /// share-allocation cap, and contact normalization.
    pub fn validate_requirements(&self) -> Result<(), FormError> {
        if !license_dates_ordered(self.incorporation_date, self.license_expiry_date) {
            return Err(FormError::Invalid(
                "license expiry must fall after incorporation".to_string(),
            ));
        }

        let shareholders = self.shareholders()?;
        let total: f64 = shareholders.iter().map(|(_, share)| share).sum();
        if !share_allocation_valid(total) {
            return Err(FormError::Invalid(format!(
                "shareholder allocation exceeds 100% ({total})"
            )));
        }

        ContactEmail::new(&self.contact_email)?;
        PhoneNumber::new(&self.contact_phone)?;
        Ok(())
    }

    fn shareholders(&self) -> Result<Vec<(String, f64)>, FormError> {
        self.shareholder_name
            .iter()
            .zip(self.shareholder_share.iter())
            .filter(|(name, _)| !name.trim().is_empty())
            .map(|(name, share)| {
                let share: f64 = share.trim().parse().map_err(|_| {
                    FormError::Invalid(format!("invalid share percentage for {name}"))
                })?;
                Ok((name.trim().to_string(), share))
            })
            .collect()
    }

    fn ubos(&self) -> Vec<(String, String)> {
        self.ubo_name
            .iter()
            .zip(self.ubo_nationality.iter())
            .filter(|(name, _)| !name.trim().is_empty())
            .map(|(name, nationality)| (name.trim().to_string(), nationality.trim().to_string()))
            .collect()
    }

    fn directors(&self) -> Vec<(String, String)> {
        self.director_name
            .iter()
            .zip(self.director_designation.iter())
            .filter(|(name, _)| !name.trim().is_empty())
            .map(|(name, designation)| (name.trim().to_string(), designation.trim().to_string()))
            .collect()
    }

    pub fn payload(&self) -> Result<Map<String, Value>, FormError> {
        let email = ContactEmail::new(&self.contact_email)?;
        let phone = PhoneNumber::new(&self.contact_phone)?;
        let shareholders: Vec<Value> = self
            .shareholders()?
            .into_iter()
            .map(|(name, share)| json!({"name": name, "sharePercent": share}))
            .collect();
        let ubos: Vec<Value> = self
            .ubos()
            .into_iter()
            .map(|(name, nationality)| json!({"name": name, "nationality": nationality}))
            .collect();
        let directors: Vec<Value> = self
            .directors()
            .into_iter()
            .map(|(name, designation)| json!({"name": name, "designation": designation}))
            .collect();

        Ok(into_object(json!({
            "companyDetails": {
                "companyName": self.company_name.trim(),
                "tradeLicenseNumber": self.trade_license_number.trim(),
                "incorporationDate": self.incorporation_date,
                "licenseExpiryDate": self.license_expiry_date,
                "countryOfIncorporation": self.country_of_incorporation.trim(),
                "registeredAddress": self.registered_address.trim(),
                "website": self.website,
                "contactName": self.contact_name.trim(),
                "contactEmail": email.as_str(),
                "contactPhone": phone.as_str(),
                "shareholders": shareholders,
                "ubos": ubos,
                "directors": directors,
            },
        })))
    }
}
