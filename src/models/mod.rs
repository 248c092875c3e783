pub mod classification;
pub mod report;
pub mod workflow;
