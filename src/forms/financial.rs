use serde::Deserialize;
use serde_json::{Map, Value, json};
use validator::Validate;

use crate::domain::document::resolve_file_id;
use crate::domain::requirements::audited_statements_required;
use crate::forms::{FormError, into_object};

/// Step 4: financial thresholds. Field names mirror the flat cluster the
/// normalizer recognizes, so legacy flat rows regroup into exactly this
/// shape.
#[derive(Debug, Deserialize, Validate)]
pub struct FinancialThresholdForm {
    #[validate(range(min = 0.0))]
    pub paid_up_capital: f64,
    #[validate(range(min = 0.0))]
    pub total_assets: f64,
    #[validate(range(min = 0.0))]
    pub annual_turnover: f64,
    pub net_profit_last_year: Option<f64>,
    #[serde(default)]
    pub meets_minimum_capital: bool,
    #[serde(default)]
    pub has_audited_financials: bool,
    pub audited_financials_file_id: Option<i64>,
    pub audited_financials_path: Option<String>,
    #[validate(range(min = 0, max = 50))]
    pub audited_years: Option<i32>,
    pub credit_rating: Option<String>,
    pub credit_rating_agency: Option<String>,
}

impl FinancialThresholdForm {
    pub fn audited_file_id(&self) -> Option<i64> {
        resolve_file_id(
            self.audited_financials_file_id,
            self.audited_financials_path.as_deref(),
        )
    }

    pub fn validate_requirements(&self) -> Result<(), FormError> {
        if audited_statements_required(self.has_audited_financials)
            && self.audited_file_id().is_none()
        {
            return Err(FormError::MissingDocument("the audited financial statements"));
        }
        if self.credit_rating.as_deref().map(str::trim).is_some_and(|r| !r.is_empty())
            && self
                .credit_rating_agency
                .as_deref()
                .map(str::trim)
                .is_none_or(str::is_empty)
        {
            return Err(FormError::MissingField("credit rating agency"));
        }
        Ok(())
    }

    pub fn payload(&self) -> Map<String, Value> {
        into_object(json!({
            "financialThreshold": {
                "paidUpCapital": self.paid_up_capital,
                "totalAssets": self.total_assets,
                "annualTurnover": self.annual_turnover,
                "netProfitLastYear": self.net_profit_last_year,
                "meetsMinimumCapital": self.meets_minimum_capital,
                "hasAuditedFinancials": self.has_audited_financials,
                "auditedFinancialsFileId": self.audited_file_id(),
                "auditedYears": self.audited_years,
                "creditRating": self.credit_rating,
                "creditRatingAgency": self.credit_rating_agency,
            },
        }))
    }
}
