//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer; repositories convert them
//! to and from domain types.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::RequestLogEntry;
use crate::domain::patient::{Gender, NewPatient, Patient};

use super::schema::{patients, request_logs};

/// Row struct for reading from the patients table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = patients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PatientRow {
    pub id: Uuid,
    pub medical_record_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub insurance_provider_id: Option<i32>,
    pub insurance_policy_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PatientRow> for Patient {
    fn from(row: PatientRow) -> Self {
        Self {
            id: row.id,
            medical_record_number: row.medical_record_number,
            first_name: row.first_name,
            last_name: row.last_name,
            date_of_birth: row.date_of_birth,
            gender: Gender::from_code(row.gender.trim()),
            address: row.address,
            phone_number: row.phone_number,
            email: row.email,
            insurance_provider_id: row.insurance_provider_id,
            insurance_policy_number: row.insurance_policy_number,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable struct for creating patient records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = patients)]
pub(crate) struct NewPatientRow<'a> {
    pub id: Uuid,
    pub medical_record_number: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub date_of_birth: NaiveDate,
    pub gender: &'static str,
    pub address: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub email: Option<&'a str>,
    pub insurance_provider_id: Option<i32>,
    pub insurance_policy_number: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewPatientRow<'a> {
    pub fn from_domain(id: Uuid, patient: &'a NewPatient, now: DateTime<Utc>) -> Self {
        Self {
            id,
            medical_record_number: &patient.medical_record_number,
            first_name: &patient.first_name,
            last_name: &patient.last_name,
            date_of_birth: patient.date_of_birth,
            gender: patient.gender.code(),
            address: patient.address.as_deref(),
            phone_number: patient.phone_number.as_deref(),
            email: patient.email.as_deref(),
            insurance_provider_id: patient.insurance_provider_id,
            insurance_policy_number: patient.insurance_policy_number.as_deref(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Request log models
// ---------------------------------------------------------------------------

/// Insertable struct for one request log row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = request_logs)]
pub(crate) struct NewRequestLogRow<'a> {
    pub request_id: Uuid,
    pub correlation_id: Uuid,
    pub user_id: Option<&'a str>,
    pub request_time: DateTime<Utc>,
    pub request_date: NaiveDate,
    pub method: &'a str,
    pub scheme: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    pub query_string: Option<&'a str>,
    pub status_code: i32,
    pub duration_ms: i32,
    pub remote_ip: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub referrer: Option<&'a str>,
    pub request_content_type: Option<&'a str>,
    pub response_content_type: Option<&'a str>,
    pub bytes_received: Option<i64>,
    pub bytes_sent: Option<i64>,
    pub request_headers: Option<&'a str>,
    pub response_headers: Option<&'a str>,
    pub request_body: Option<&'a str>,
    pub response_body: Option<&'a str>,
    pub exception_type: Option<&'a str>,
    pub exception_message: Option<&'a str>,
    pub exception_stack_trace: Option<&'a str>,
    pub server_name: &'a str,
    pub environment: Option<&'a str>,
}

impl<'a> From<&'a RequestLogEntry> for NewRequestLogRow<'a> {
    fn from(entry: &'a RequestLogEntry) -> Self {
        Self {
            request_id: *entry.request_id.as_uuid(),
            correlation_id: *entry.correlation_id.as_uuid(),
            user_id: entry.user_id.as_deref(),
            request_time: entry.request_time,
            request_date: entry.request_date,
            method: &entry.method,
            scheme: &entry.scheme,
            host: &entry.host,
            path: &entry.path,
            query_string: entry.query_string.as_deref(),
            status_code: entry.status_code,
            duration_ms: entry.duration_ms,
            remote_ip: entry.remote_ip.as_deref(),
            user_agent: entry.user_agent.as_deref(),
            referrer: entry.referrer.as_deref(),
            request_content_type: entry.request_content_type.as_deref(),
            response_content_type: entry.response_content_type.as_deref(),
            bytes_received: entry.bytes_received,
            bytes_sent: entry.bytes_sent,
            request_headers: entry.request_headers.as_deref(),
            response_headers: entry.response_headers.as_deref(),
            request_body: entry.request_body.as_deref(),
            response_body: entry.response_body.as_deref(),
            exception_type: entry.exception_type.as_deref(),
            exception_message: entry.exception_message.as_deref(),
            exception_stack_trace: entry.exception_stack_trace.as_deref(),
            server_name: &entry.server_name,
            environment: entry.environment.as_deref(),
        }
    }
}
