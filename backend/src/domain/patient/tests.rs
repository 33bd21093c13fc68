//! Intake validation rules and normalisation.

use super::*;
use rstest::{fixture, rstest};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 1).expect("valid date")
}

#[fixture]
fn draft() -> PatientDraft {
    PatientDraft {
        medical_record_number: Some("MRN000123".to_owned()),
        first_name: Some("Mary-Jane".to_owned()),
        last_name: Some("O'Neil".to_owned()),
        date_of_birth: NaiveDate::from_ymd_opt(1984, 7, 2),
        gender: Some("Female".to_owned()),
        address: Some("  12 Harbour Road  ".to_owned()),
        phone_number: Some("555 123 4567".to_owned()),
        email: Some(" Mary.Jane@Example.COM ".to_owned()),
        insurance_provider_id: Some(3),
        insurance_policy_number: Some("".to_owned()),
    }
}

fn violations(draft: PatientDraft) -> Vec<FieldViolation> {
    match draft.validate(today()) {
        Err(Error::Validation(violations)) => violations,
        other => panic!("expected validation failure, got {other:?}"),
    }
}

fn codes_for(violations: &[FieldViolation], property: &str) -> Vec<String> {
    violations
        .iter()
        .filter(|v| v.property() == property)
        .map(|v| v.code().to_owned())
        .collect()
}

#[rstest]
fn valid_draft_is_normalised(draft: PatientDraft) {
    let patient = draft.validate(today()).expect("valid draft");
    assert_eq!(patient.medical_record_number, "MRN000123");
    assert_eq!(patient.gender, Gender::Female);
    assert_eq!(patient.address.as_deref(), Some("12 Harbour Road"));
    assert_eq!(patient.phone_number.as_deref(), Some("(555)123-4567"));
    assert_eq!(patient.email.as_deref(), Some("mary.jane@example.com"));
    assert!(patient.insurance_policy_number.is_none());
}

#[rstest]
fn empty_draft_reports_every_required_field() {
    let found = violations(PatientDraft::default());
    for property in ["MedicalRecordNumber", "FirstName", "LastName", "DateOfBirth"] {
        assert_eq!(codes_for(&found, property), ["NotEmpty"], "{property}");
    }
    assert_eq!(codes_for(&found, "Gender"), ["Enum"]);
}

#[rstest]
#[case::lowercase("jane", "Pattern")]
#[case::shouting("JANE", "Pattern")]
#[case::inner_capital("McDonald", "Pattern")]
#[case::padded(" Jane", "Trimmed")]
#[case::placeholder("String", "NotPlaceholder")]
fn names_must_be_title_case(mut draft: PatientDraft, #[case] name: &str, #[case] code: &str) {
    draft.first_name = Some(name.to_owned());
    assert_eq!(codes_for(&violations(draft), "FirstName"), [code]);
}

#[rstest]
fn long_names_stop_at_length_check(mut draft: PatientDraft) {
    draft.last_name = Some("a".repeat(60));
    let found = violations(draft);
    assert_eq!(codes_for(&found, "LastName"), ["MaximumLength"]);
}

#[rstest]
#[case::wrong_prefix("ABC000123", "Pattern")]
#[case::short("MRN123", "Pattern")]
#[case::placeholder("string", "NotPlaceholder")]
fn medical_record_number_follows_pattern(
    mut draft: PatientDraft,
    #[case] mrn: &str,
    #[case] code: &str,
) {
    draft.medical_record_number = Some(mrn.to_owned());
    assert_eq!(codes_for(&violations(draft), "MedicalRecordNumber"), [code]);
}

#[rstest]
#[case::future(NaiveDate::from_ymd_opt(2026, 5, 2), "LessThanOrEqual")]
#[case::too_old(NaiveDate::from_ymd_opt(1900, 1, 1), "GreaterThan")]
fn date_of_birth_is_bounded(
    mut draft: PatientDraft,
    #[case] date: Option<NaiveDate>,
    #[case] code: &str,
) {
    draft.date_of_birth = date;
    assert_eq!(codes_for(&violations(draft), "DateOfBirth"), [code]);
}

#[rstest]
fn date_of_birth_today_is_accepted(mut draft: PatientDraft) {
    draft.date_of_birth = Some(today());
    assert!(draft.validate(today()).is_ok());
}

#[rstest]
fn optional_fields_are_checked_when_present(mut draft: PatientDraft) {
    draft.phone_number = Some("call me".to_owned());
    draft.email = Some("not-an-address".to_owned());
    draft.insurance_provider_id = Some(0);
    draft.insurance_policy_number = Some("STRING".to_owned());
    draft.gender = Some("unknown".to_owned());
    let found = violations(draft);
    assert_eq!(codes_for(&found, "PhoneNumber"), ["Pattern"]);
    assert_eq!(codes_for(&found, "Email"), ["EmailAddress"]);
    assert_eq!(codes_for(&found, "InsuranceProviderId"), ["GreaterThan"]);
    assert_eq!(codes_for(&found, "InsurancePolicyNumber"), ["NotPlaceholder"]);
    assert_eq!(codes_for(&found, "Gender"), ["Enum"]);
}

#[rstest]
#[case("M", Gender::Male)]
#[case("f", Gender::Female)]
#[case("X", Gender::Other)]
fn gender_codes_decode_leniently(#[case] code: &str, #[case] expected: Gender) {
    assert_eq!(Gender::from_code(code), expected);
}

#[rstest]
fn draft_deserialises_camel_case_with_missing_fields() {
    let draft: PatientDraft =
        serde_json::from_str(r#"{"firstName":"Ada","dateOfBirth":"1990-02-03"}"#)
            .expect("partial payload deserialises");
    assert_eq!(draft.first_name.as_deref(), Some("Ada"));
    assert_eq!(draft.date_of_birth, NaiveDate::from_ymd_opt(1990, 2, 3));
    assert!(draft.medical_record_number.is_none());
}
