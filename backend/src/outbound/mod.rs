//! Outbound adapters implementing domain ports against PostgreSQL.

pub mod persistence;
