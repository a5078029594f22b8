//! Profile analysis and job matching, both delegated to the AI service.

pub mod handlers;
pub mod upload;
