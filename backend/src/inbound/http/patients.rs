//! Patient record handlers.
//!
//! ```text
//! GET  /api/patients
//! GET  /api/patients/{id}
//! POST /api/patients {"medicalRecordNumber":"MRN000001", ...}
//! ```

use actix_web::{get, post, web};
use tracing::info;
use uuid::Uuid;

use crate::domain::patient::{Patient, PatientDraft};
use crate::domain::{ApiResponse, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// List every patient.
#[get("/patients")]
pub async fn list_patients(state: web::Data<HttpState>) -> ApiResult<ApiResponse<Vec<Patient>>> {
    let patients = state.patients.list().await?;
    Ok(ApiResponse::ok(patients, None))
}

/// Fetch one patient by identifier.
#[get("/patients/{id}")]
pub async fn get_patient(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<ApiResponse<Patient>> {
    let id = path.into_inner();
    state
        .patients
        .find(id)
        .await?
        .map(|patient| ApiResponse::ok(patient, None))
        .ok_or_else(|| Error::not_found(format!("Patient {id} not found.")))
}

/// Validate and store a new patient.
#[post("/patients")]
pub async fn create_patient(
    state: web::Data<HttpState>,
    payload: web::Json<PatientDraft>,
) -> ApiResult<ApiResponse<Patient>> {
    let today = state.clock.utc().date_naive();
    let new_patient = payload.into_inner().validate(today)?;
    let patient = state.patients.create(new_patient).await?;
    info!(patient_id = %patient.id, "patient created");
    let location = format!("/api/patients/{}", patient.id);
    Ok(ApiResponse::created(patient, location, None))
}
