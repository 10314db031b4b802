//! Settings and the job mapping store

pub mod jobs;
pub mod settings;
