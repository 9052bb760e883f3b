//! Conditional-requirement rules shared by validation and payload assembly.
//!
//! Whether a field is required is decided by sibling answers. Each rule lives
//! here exactly once so the form validator and the payload builder cannot
//! drift apart about what is mandatory.

use chrono::NaiveDate;

/// An applicant answering "no" to any eligibility question needs an approved
/// special-consideration request before step 1 can be saved.
pub fn special_consideration_required(answers: &[bool]) -> bool {
    answers.iter().any(|answer| !answer)
}

/// Proof of the bank relationship is required once an existing relationship
/// is declared.
pub fn bank_proof_required(has_existing_relationship: bool) -> bool {
    has_existing_relationship
}

/// Audited financial statements must be attached when the applicant declares
/// having audited financials.
pub fn audited_statements_required(has_audited_financials: bool) -> bool {
    has_audited_financials
}

/// Regulator name, license number and a license copy are required for
/// regulated entities.
pub fn regulator_details_required(is_regulated: bool) -> bool {
    is_regulated
}

/// An AML policy document is required when an AML program is declared.
pub fn aml_policy_required(has_aml_program: bool) -> bool {
    has_aml_program
}

/// Details are required when past sanctions are declared.
pub fn sanction_details_required(has_been_sanctioned: bool) -> bool {
    has_been_sanctioned
}

/// DPO name and email are required when a data-protection officer is
/// declared.
pub fn dpo_details_required(has_dpo: bool) -> bool {
    has_dpo
}

/// A required-document slot marked as provided must carry a document id.
pub fn document_file_required(is_checked: bool) -> bool {
    is_checked
}

/// License expiry must fall strictly after incorporation.
pub fn license_dates_ordered(incorporation: NaiveDate, expiry: NaiveDate) -> bool {
    expiry > incorporation
}

/// A declaration signature cannot be dated in the future.
pub fn signature_date_valid(signature: NaiveDate, today: NaiveDate) -> bool {
    signature <= today
}

/// Shareholder percentages may not exceed a full allocation.
pub fn share_allocation_valid(total_percent: f64) -> bool {
    total_percent <= 100.0 + f64::EPSILON
}

/// The backend rejects an empty id array; `0` is the agreed "no document"
/// sentinel submitted in its place.
pub fn ids_or_sentinel(ids: Vec<i64>) -> Vec<i64> {
    if ids.is_empty() { vec![0] } else { ids }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_no_answer_requires_consideration() {
        assert!(!special_consideration_required(&[true, true, true, true]));
        assert!(special_consideration_required(&[true, false, true, true]));
        assert!(special_consideration_required(&[false; 4]));
        assert!(!special_consideration_required(&[]));
    }

    #[test]
    fn date_ordering() {
        let incorporation = NaiveDate::from_ymd_opt(2015, 3, 1).unwrap();
        assert!(license_dates_ordered(
            incorporation,
            NaiveDate::from_ymd_opt(2027, 3, 1).unwrap()
        ));
        assert!(!license_dates_ordered(incorporation, incorporation));
    }

    #[test]
    fn empty_id_array_gets_the_sentinel() {
        assert_eq!(ids_or_sentinel(vec![]), vec![0]);
        assert_eq!(ids_or_sentinel(vec![245, 7]), vec![245, 7]);
    }

    #[test]
    fn share_allocation_bounds() {
        assert!(share_allocation_valid(100.0));
        assert!(share_allocation_valid(51.5));
        assert!(!share_allocation_valid(100.5));
    }
}
