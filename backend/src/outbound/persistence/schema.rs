//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// Insurance carriers referenced by patients.
    insurance_providers (id) {
        id -> Int4,
        #[max_length = 100]
        name -> Varchar,
    }
}

diesel::table! {
    /// Patient records.
    patients (id) {
        id -> Uuid,
        #[max_length = 20]
        medical_record_number -> Varchar,
        #[max_length = 50]
        first_name -> Varchar,
        #[max_length = 50]
        last_name -> Varchar,
        date_of_birth -> Date,
        /// `M`, `F` or `O`.
        #[max_length = 1]
        gender -> Bpchar,
        #[max_length = 200]
        address -> Nullable<Varchar>,
        #[max_length = 20]
        phone_number -> Nullable<Varchar>,
        #[max_length = 100]
        email -> Nullable<Varchar>,
        insurance_provider_id -> Nullable<Int4>,
        #[max_length = 50]
        insurance_policy_number -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per HTTP exchange, written best-effort by the request log
    /// middleware.
    request_logs (request_id) {
        request_id -> Uuid,
        correlation_id -> Uuid,
        #[max_length = 100]
        user_id -> Nullable<Varchar>,
        request_time -> Timestamptz,
        request_date -> Date,
        #[max_length = 10]
        method -> Varchar,
        #[max_length = 5]
        scheme -> Varchar,
        #[max_length = 255]
        host -> Varchar,
        #[max_length = 2048]
        path -> Varchar,
        #[max_length = 4000]
        query_string -> Nullable<Varchar>,
        status_code -> Int4,
        duration_ms -> Int4,
        #[max_length = 45]
        remote_ip -> Nullable<Varchar>,
        #[max_length = 512]
        user_agent -> Nullable<Varchar>,
        #[max_length = 512]
        referrer -> Nullable<Varchar>,
        #[max_length = 100]
        request_content_type -> Nullable<Varchar>,
        #[max_length = 100]
        response_content_type -> Nullable<Varchar>,
        bytes_received -> Nullable<Int8>,
        bytes_sent -> Nullable<Int8>,
        request_headers -> Nullable<Text>,
        response_headers -> Nullable<Text>,
        #[max_length = 8000]
        request_body -> Nullable<Varchar>,
        response_body -> Nullable<Text>,
        #[max_length = 200]
        exception_type -> Nullable<Varchar>,
        #[max_length = 2000]
        exception_message -> Nullable<Varchar>,
        exception_stack_trace -> Nullable<Text>,
        #[max_length = 128]
        server_name -> Varchar,
        #[max_length = 32]
        environment -> Nullable<Varchar>,
    }
}

diesel::joinable!(patients -> insurance_providers (insurance_provider_id));

diesel::allow_tables_to_appear_in_same_query!(insurance_providers, patients, request_logs);
