//! Patient aggregate and intake validation.
//!
//! Incoming payloads arrive as a loosely typed [`PatientDraft`]; every field
//! is checked and all violations are reported together as
//! [`Error::Validation`]. A draft that passes becomes a normalised
//! [`NewPatient`] ready for insertion.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Error, FieldViolation};

/// Column bounds shared by validation and the schema.
pub mod limits {
    pub const MEDICAL_RECORD_NUMBER: usize = 20;
    pub const NAME: usize = 50;
    pub const ADDRESS: usize = 200;
    pub const PHONE_NUMBER: usize = 20;
    pub const EMAIL: usize = 100;
    pub const INSURANCE_POLICY_NUMBER: usize = 50;
}

/// Administrative gender, stored as a one-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Storage code: `M`, `F` or `O`.
    pub fn code(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Other => "O",
        }
    }

    /// Parse a wire name, ignoring case.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Decode a storage code; anything unrecognised reads as [`Gender::Other`].
    pub fn from_code(code: &str) -> Self {
        match code {
            "M" | "m" => Self::Male,
            "F" | "f" => Self::Female,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Stored patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub medical_record_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub insurance_provider_id: Option<i32>,
    pub insurance_policy_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated, normalised patient awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub medical_record_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub insurance_provider_id: Option<i32>,
    pub insurance_policy_number: Option<String>,
}

/// Raw intake payload. Missing fields are reported as violations rather than
/// rejected during deserialisation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientDraft {
    pub medical_record_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub insurance_provider_id: Option<i32>,
    pub insurance_policy_number: Option<String>,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|error| panic!("patient regex failed to compile: {error}"))
}

fn mrn_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^MRN\d{6}$"))
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Each part split by space, hyphen or apostrophe is title case.
    RE.get_or_init(|| compile(r"^(?:[A-Z][a-z]*)(?:[ '-][A-Z][a-z]*)*$"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^\+?[0-9()\-\s]{7,20}$"))
}

/// Earliest accepted date of birth is the day after this.
fn earliest_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn is_placeholder(value: &str) -> bool {
    value.eq_ignore_ascii_case("string")
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

struct Violations(Vec<FieldViolation>);

impl Violations {
    fn add(&mut self, property: &str, code: &str, message: impl Into<String>) {
        self.0.push(FieldViolation::new(property, code, message));
    }

    fn too_long(&mut self, property: &str, value: &str, max: usize) -> bool {
        let length = value.chars().count();
        if length > max {
            self.add(
                property,
                "MaximumLength",
                format!("{property} must be {max} characters or fewer. You entered {length} characters."),
            );
            return true;
        }
        false
    }
}

impl PatientDraft {
    /// Check every rule and normalise the result.
    ///
    /// `today` bounds the date of birth; callers pass the current UTC date.
    pub fn validate(self, today: NaiveDate) -> Result<NewPatient, Error> {
        let mut violations = Violations(Vec::new());

        let mrn = self.medical_record_number.unwrap_or_default();
        if mrn.trim().is_empty() {
            violations.add("MedicalRecordNumber", "NotEmpty", "MedicalRecordNumber is required.");
        } else if !violations.too_long("MedicalRecordNumber", &mrn, limits::MEDICAL_RECORD_NUMBER) {
            if is_placeholder(&mrn) {
                violations.add(
                    "MedicalRecordNumber",
                    "NotPlaceholder",
                    "Please provide a real MedicalRecordNumber.",
                );
            } else if !mrn_regex().is_match(&mrn) {
                violations.add(
                    "MedicalRecordNumber",
                    "Pattern",
                    "MedicalRecordNumber must match pattern MRN000001.",
                );
            }
        }

        let first_name = self.first_name.unwrap_or_default();
        check_name(&mut violations, "FirstName", "First Name", &first_name);
        let last_name = self.last_name.unwrap_or_default();
        check_name(&mut violations, "LastName", "Last Name", &last_name);

        let earliest = earliest_birth_date();
        match self.date_of_birth {
            None => violations.add("DateOfBirth", "NotEmpty", "DateOfBirth is required."),
            Some(date) if date > today => violations.add(
                "DateOfBirth",
                "LessThanOrEqual",
                format!("DateOfBirth must be on or before {today}."),
            ),
            Some(date) if date <= earliest => violations.add(
                "DateOfBirth",
                "GreaterThan",
                format!("DateOfBirth must be after {earliest}."),
            ),
            Some(_) => {}
        }

        let gender = self.gender.as_deref().and_then(Gender::parse);
        if gender.is_none() {
            violations.add("Gender", "Enum", "Gender must be Male, Female, or Other.");
        }

        let address = blank_to_none(self.address);
        if let Some(address) = &address {
            violations.too_long("Address", address, limits::ADDRESS);
        }

        let phone = blank_to_none(self.phone_number);
        if let Some(phone) = &phone {
            if !violations.too_long("PhoneNumber", phone, limits::PHONE_NUMBER)
                && !phone_regex().is_match(phone)
            {
                violations.add("PhoneNumber", "Pattern", "PhoneNumber is not in the correct format.");
            }
        }

        let email = blank_to_none(self.email);
        if let Some(email) = &email {
            if !violations.too_long("Email", email, limits::EMAIL) && !looks_like_email(email) {
                violations.add("Email", "EmailAddress", "Email is not a valid email address.");
            }
        }

        if let Some(id) = self.insurance_provider_id {
            if id <= 0 {
                violations.add(
                    "InsuranceProviderId",
                    "GreaterThan",
                    "InsuranceProviderId must be greater than 0.",
                );
            }
        }

        let policy = blank_to_none(self.insurance_policy_number);
        if let Some(policy) = &policy {
            if !violations.too_long("InsurancePolicyNumber", policy, limits::INSURANCE_POLICY_NUMBER)
                && is_placeholder(policy)
            {
                violations.add(
                    "InsurancePolicyNumber",
                    "NotPlaceholder",
                    "Please provide a real InsurancePolicyNumber.",
                );
            }
        }

        let (Some(date_of_birth), Some(gender), true) =
            (self.date_of_birth, gender, violations.0.is_empty())
        else {
            return Err(Error::Validation(violations.0));
        };

        Ok(NewPatient {
            medical_record_number: mrn.trim().to_ascii_uppercase(),
            first_name,
            last_name,
            date_of_birth,
            gender,
            address,
            phone_number: phone.map(normalize_phone),
            email: email.map(|e| e.to_lowercase()),
            insurance_provider_id: self.insurance_provider_id,
            insurance_policy_number: policy,
        })
    }
}

fn check_name(violations: &mut Violations, property: &str, label: &str, value: &str) {
    if value.trim().is_empty() {
        violations.add(property, "NotEmpty", format!("{property} is required."));
        return;
    }
    if violations.too_long(property, value, limits::NAME) {
        return;
    }
    if value.trim() != value {
        violations.add(
            property,
            "Trimmed",
            format!("{property} must not start or end with spaces."),
        );
    } else if !name_regex().is_match(value) {
        violations.add(
            property,
            "Pattern",
            format!(
                "{property} must be capitalized: first letter uppercase, remaining letters lowercase. \
                 Each name part after a space, hyphen, or apostrophe must also be capitalized."
            ),
        );
    } else if is_placeholder(value) {
        violations.add(property, "NotPlaceholder", format!("Please provide a real {label}."));
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Ten-digit numbers become `(555)123-4567`; anything else is kept as typed.
fn normalize_phone(phone: String) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        format!("({}){}-{}", &digits[..3], &digits[3..6], &digits[6..])
    } else {
        phone
    }
}

#[cfg(test)]
mod tests;
