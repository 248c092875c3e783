pub mod api;
pub mod gate;
pub mod jwt;
pub mod location;
pub mod photo;
pub mod submission;
pub mod validation;
