//! Waste Report Client
//!
//! This library provides the report submission workflow for the waste-report
//! client: draft validation, the AI classification gate, submission to the
//! report API and interpretation of its responses, plus location and photo
//! capture helpers and a JWT freshness check.

pub mod config;
pub mod models;
pub mod screen;
pub mod services;
pub mod ui;
