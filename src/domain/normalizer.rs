//! Regroups flat application payloads into their nested section form.
//!
//! Older stored applications (and one legacy API shape) carry the fields of
//! three sections flattened into the top level of the payload. Each cluster is
//! described by a static table of member field names; detection and regrouping
//! are a fold over that table rather than per-field boolean chains.

use serde_json::{Map, Value};

/// Flat member fields of the `financialThreshold` section.
pub const FINANCIAL_THRESHOLD_FIELDS: &[&str] = &[
    "paidUpCapital",
    "totalAssets",
    "annualTurnover",
    "netProfitLastYear",
    "meetsMinimumCapital",
    "hasAuditedFinancials",
    "auditedFinancialsFileId",
    "auditedFinancialsPath",
    "auditedYears",
    "creditRating",
    "creditRatingAgency",
];

/// Flat member fields of the `regulatoryCompliance` section.
pub const REGULATORY_COMPLIANCE_FIELDS: &[&str] = &[
    "isRegulated",
    "regulatorName",
    "regulatoryLicenseNumber",
    "regulatoryLicenseFileId",
    "regulatoryLicensePath",
    "hasAmlProgram",
    "amlPolicyFileId",
    "amlPolicyPath",
    "hasComplianceOfficer",
    "complianceOfficerName",
    "complianceOfficerEmail",
    "hasBeenSanctioned",
    "sanctionDetails",
    "operatesInFatfJurisdiction",
];

/// Flat member fields of the `memberRequiredDocuments` section.
pub const MEMBER_REQUIRED_DOCUMENT_FIELDS: &[&str] = &[
    "tradeLicenseAndMoaFileId",
    "tradeLicenseAndMoaPath",
    "isChecked_TradeLicenseAndMoa",
    "certificateOfIncorporationFileId",
    "certificateOfIncorporationPath",
    "isChecked_CertificateOfIncorporation",
    "boardResolutionFileId",
    "boardResolutionPath",
    "isChecked_BoardResolution",
    "auditedFinancialStatementsFileId",
    "auditedFinancialStatementsPath",
    "isChecked_AuditedFinancialStatements",
    "organizationChartFileId",
    "organizationChartPath",
    "isChecked_OrganizationChart",
    "amlQuestionnaireFileId",
    "amlQuestionnairePath",
    "isChecked_AmlQuestionnaire",
    "otherForms",
    "supportingFileIds",
];

/// Cluster data key -> ordered member field names.
pub const CLUSTERS: &[(&str, &[&str])] = &[
    ("financialThreshold", FINANCIAL_THRESHOLD_FIELDS),
    ("regulatoryCompliance", REGULATORY_COMPLIANCE_FIELDS),
    ("memberRequiredDocuments", MEMBER_REQUIRED_DOCUMENT_FIELDS),
];

/// Key some responses use to nest the required-document fields; its entries
/// are flattened into the top level before regrouping.
const REQUIRED_DOCS_KEY: &str = "requiredDocs";

/// Regroups recognized flat field clusters into their nested sub-objects,
/// deleting the flat originals.
///
/// A cluster is present iff at least one member key exists in the payload;
/// presence is "defined", not "truthy", so explicit `false`/`0`/`""`/`null`
/// values still count. An absent cluster is left alone (no empty sub-object).
/// Unrecognized keys pass through untouched; this cannot fail.
pub fn normalize_payload(payload: &mut Map<String, Value>) {
    if let Some(Value::Object(nested)) = payload.remove(REQUIRED_DOCS_KEY) {
        for (key, value) in nested {
            payload.insert(key, value);
        }
    }

    for (cluster, fields) in CLUSTERS {
        if !fields.iter().any(|field| payload.contains_key(*field)) {
            continue;
        }

        // Start from an already-nested object under the cluster key, if any,
        // so a mixed flat/nested payload loses nothing.
        let mut grouped = match payload.remove(*cluster) {
            Some(Value::Object(existing)) => existing,
            Some(other) => {
                let mut map = Map::new();
                map.insert((*cluster).to_string(), other);
                map
            }
            None => Map::new(),
        };

        for field in *fields {
            if let Some(value) = payload.remove(*field) {
                grouped.insert((*field).to_string(), value);
            }
        }

        payload.insert((*cluster).to_string(), Value::Object(grouped));
    }
}
