use dbrg_membership::domain::application::ConsiderationStatus;
use dbrg_membership::domain::document::{NewDocument, parse_document_id};
use dbrg_membership::domain::section::Section;
use dbrg_membership::repository::errors::RepositoryError;
use dbrg_membership::repository::{
    ApplicationListQuery, ApplicationReader, ApplicationWriter, DieselRepository, DocumentReader,
    DocumentWriter, SectionSave,
};
use serde_json::{Map, Value, json};

mod common;

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn section_save(section: Section, payload: Value, revision: i64) -> SectionSave {
    SectionSave {
        section,
        payload: object(payload),
        expected_revision: revision,
        next_step: section.step().saturating_add(1).min(8),
        submit: false,
    }
}

#[test]
fn test_first_save_creates_the_application() {
    let test_db = common::TestDb::new("test_first_save.db");
    let repo = DieselRepository::new(test_db.pool().clone());

    assert!(repo.get_application("u-1").unwrap().is_none());

    let saved = repo
        .save_section(
            "u-1",
            &section_save(
                Section::Applicability,
                json!({
                    "applicability": {"isLicensedEntity": true},
                    "application": {"membershipType": "Principal"},
                }),
                0,
            ),
        )
        .unwrap();

    assert_eq!(saved.applicant_id, "u-1");
    assert_eq!(saved.current_step, 2);
    assert_eq!(saved.revision, 1);
    assert!(saved.completed_steps.contains(&1));
    assert_eq!(
        saved.membership_type.map(|t| t.to_string()),
        Some("Principal".to_string())
    );

    let fetched = repo.get_application("u-1").unwrap().unwrap();
    assert_eq!(fetched.revision, 1);
    assert!(fetched.section_object(Section::Applicability).is_some());
    assert_eq!(repo.get_application_by_id(fetched.id).unwrap(), Some(fetched));
}

#[test]
fn test_section_merge_is_shallow_per_key() {
    let test_db = common::TestDb::new("test_shallow_merge.db");
    let repo = DieselRepository::new(test_db.pool().clone());

    repo.save_section(
        "u-1",
        &section_save(
            Section::FinancialThreshold,
            json!({"financialThreshold": {"paidUpCapital": 1, "totalAssets": 2}}),
            0,
        ),
    )
    .unwrap();

    let saved = repo
        .save_section(
            "u-1",
            &section_save(
                Section::FinancialThreshold,
                json!({"financialThreshold": {"paidUpCapital": 9}}),
                1,
            ),
        )
        .unwrap();

    // The section object is replaced wholesale; siblings of the section key
    // survive, siblings inside it do not.
    assert_eq!(
        saved.data.get("financialThreshold"),
        Some(&json!({"paidUpCapital": 9}))
    );
}

#[test]
fn test_sibling_sections_survive_saves() {
    let test_db = common::TestDb::new("test_sibling_sections.db");
    let repo = DieselRepository::new(test_db.pool().clone());

    repo.save_section(
        "u-1",
        &section_save(
            Section::Applicability,
            json!({"applicability": {"isLicensedEntity": true}}),
            0,
        ),
    )
    .unwrap();
    let saved = repo
        .save_section(
            "u-1",
            &section_save(
                Section::CompanyDetails,
                json!({"companyDetails": {"companyName": "Acme Exchange LLC"}}),
                1,
            ),
        )
        .unwrap();

    assert!(saved.section_object(Section::Applicability).is_some());
    assert_eq!(saved.company_name(), Some("Acme Exchange LLC"));
    assert_eq!(saved.completed_steps.len(), 2);
}

#[test]
fn test_stale_revision_is_refused() {
    let test_db = common::TestDb::new("test_stale_revision.db");
    let repo = DieselRepository::new(test_db.pool().clone());

    repo.save_section(
        "u-1",
        &section_save(
            Section::Applicability,
            json!({"applicability": {"isLicensedEntity": true}}),
            0,
        ),
    )
    .unwrap();

    // A second writer still holding revision 0 must not clobber revision 1.
    let stale = repo.save_section(
        "u-1",
        &section_save(
            Section::Applicability,
            json!({"applicability": {"isLicensedEntity": false}}),
            0,
        ),
    );

    match stale {
        Err(RepositoryError::StaleRevision { expected, stored }) => {
            assert_eq!(expected, 0);
            assert_eq!(stored, 1);
        }
        other => panic!("expected stale revision error, got {other:?}"),
    }

    let kept = repo.get_application("u-1").unwrap().unwrap();
    assert_eq!(
        kept.data
            .get("applicability")
            .and_then(|a| a.get("isLicensedEntity")),
        Some(&json!(true))
    );
}

#[test]
fn test_submit_marks_the_application() {
    let test_db = common::TestDb::new("test_submit.db");
    let repo = DieselRepository::new(test_db.pool().clone());

    let save = SectionSave {
        section: Section::DeclarationConsent,
        payload: object(json!({"declarationConsent": {"declarationAccepted": true}})),
        expected_revision: 0,
        next_step: 8,
        submit: true,
    };
    let saved = repo.save_section("u-1", &save).unwrap();
    assert!(saved.is_submitted());
}

#[test]
fn test_consideration_round_trip() {
    let test_db = common::TestDb::new("test_consideration.db");
    let repo = DieselRepository::new(test_db.pool().clone());

    assert!(matches!(
        repo.set_consideration("u-1", ConsiderationStatus::Pending, Some("msg")),
        Err(RepositoryError::NotFound)
    ));

    repo.save_section(
        "u-1",
        &section_save(
            Section::Applicability,
            json!({"applicability": {"isLicensedEntity": false}}),
            0,
        ),
    )
    .unwrap();

    let pending = repo
        .set_consideration(
            "u-1",
            ConsiderationStatus::Pending,
            Some("licence renewal is underway"),
        )
        .unwrap();
    assert_eq!(
        pending.special_consideration.status,
        ConsiderationStatus::Pending
    );

    let approved = repo
        .set_consideration(
            "u-1",
            ConsiderationStatus::Approved,
            pending.special_consideration.message.as_deref(),
        )
        .unwrap();
    assert!(approved.special_consideration.is_approved());
    assert_eq!(
        approved.special_consideration.message.as_deref(),
        Some("licence renewal is underway")
    );
}

#[test]
fn test_listing_searches_the_company_name() {
    let test_db = common::TestDb::new("test_listing.db");
    let repo = DieselRepository::new(test_db.pool().clone());

    for (applicant, company) in [
        ("u-1", "Acme Exchange LLC"),
        ("u-2", "Gulf Clearing House"),
        ("u-3", "Acme Custody Ltd"),
    ] {
        repo.save_section(
            applicant,
            &section_save(
                Section::CompanyDetails,
                json!({"companyDetails": {"companyName": company}}),
                0,
            ),
        )
        .unwrap();
    }

    let (total, all) = repo.list_applications(ApplicationListQuery::new()).unwrap();
    assert_eq!(total, 3);
    assert_eq!(all.len(), 3);

    let (matches, found) = repo
        .list_applications(ApplicationListQuery::new().search("acme"))
        .unwrap();
    assert_eq!(matches, 2);
    assert!(found.iter().all(|a| a.company_name().unwrap().contains("Acme")));

    let (_, page) = repo
        .list_applications(ApplicationListQuery::new().paginate(2, 2))
        .unwrap();
    assert_eq!(page.len(), 1);
}

#[test]
fn test_document_storage_name_embeds_the_id() {
    let test_db = common::TestDb::new("test_documents.db");
    let repo = DieselRepository::new(test_db.pool().clone());

    let document = repo
        .create_document(&NewDocument::new(
            "u-1",
            "annual report.pdf",
            "application/pdf",
            2048,
        ))
        .unwrap();

    assert_eq!(
        document.stored_name,
        format!("{}_annual_report.pdf", document.id)
    );
    assert_eq!(parse_document_id(&document.stored_name), Some(document.id as i64));

    let listed = repo.list_documents("u-1").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(
        repo.get_document_by_id(document.id).unwrap(),
        Some(document)
    );
    assert!(repo.list_documents("someone-else").unwrap().is_empty());
}
