use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::domain::types::TypeConstraintError;

/// The eight fixed stages of the membership application wizard, in order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Applicability,
    CompanyDetails,
    BankRelationReq,
    FinancialThreshold,
    RegulatoryCompliance,
    RequiredDocs,
    DataProtection,
    DeclarationConsent,
}

/// Draft key holding top-level application fields (`membershipType`,
/// `specialConsideration`) that belong to no single section.
pub const APPLICATION_KEY: &str = "application";

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Applicability,
        Section::CompanyDetails,
        Section::BankRelationReq,
        Section::FinancialThreshold,
        Section::RegulatoryCompliance,
        Section::RequiredDocs,
        Section::DataProtection,
        Section::DeclarationConsent,
    ];

    pub const FIRST_STEP: u8 = 1;
    pub const LAST_STEP: u8 = 8;

    /// 1-based wizard step number.
    pub const fn step(self) -> u8 {
        match self {
            Section::Applicability => 1,
            Section::CompanyDetails => 2,
            Section::BankRelationReq => 3,
            Section::FinancialThreshold => 4,
            Section::RegulatoryCompliance => 5,
            Section::RequiredDocs => 6,
            Section::DataProtection => 7,
            Section::DeclarationConsent => 8,
        }
    }

    /// Key under which this section's answers live in the draft `data` map.
    pub const fn data_key(self) -> &'static str {
        match self {
            Section::Applicability => "applicability",
            Section::CompanyDetails => "companyDetails",
            Section::BankRelationReq => "bankRelationReq",
            Section::FinancialThreshold => "financialThreshold",
            Section::RegulatoryCompliance => "regulatoryCompliance",
            Section::RequiredDocs => "memberRequiredDocuments",
            Section::DataProtection => "dataProtection",
            Section::DeclarationConsent => "declarationConsent",
        }
    }

    /// Key the section's payload is submitted under. Differs from
    /// [`Section::data_key`] only for the bank-relationship section, whose
    /// wire name was never shortened.
    pub const fn payload_key(self) -> &'static str {
        match self {
            Section::BankRelationReq => "bankRelationshipRequirement",
            other => other.data_key(),
        }
    }

    pub fn from_step(step: u8) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.step() == step)
    }

    pub const fn is_last(self) -> bool {
        self.step() == Section::LAST_STEP
    }

    /// The section unlocked once this one is saved.
    pub fn next(self) -> Option<Section> {
        Section::from_step(self.step() + 1)
    }

    /// Human-readable section title used by templates and flash messages.
    pub const fn title(self) -> &'static str {
        match self {
            Section::Applicability => "Applicability",
            Section::CompanyDetails => "Company Details",
            Section::BankRelationReq => "Bank Relationship Requirement",
            Section::FinancialThreshold => "Financial Thresholds",
            Section::RegulatoryCompliance => "Regulatory Compliance",
            Section::RequiredDocs => "Required Documents",
            Section::DataProtection => "Data Protection",
            Section::DeclarationConsent => "Declaration & Consent",
        }
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

impl TryFrom<i32> for Section {
    type Error = TypeConstraintError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Section::from_step)
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("unknown section {value}")))
    }
}
