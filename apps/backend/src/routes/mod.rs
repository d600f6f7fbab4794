pub mod auth;
pub mod challenge;
pub mod groups;
pub mod learning;
pub mod reports;
pub mod words;
