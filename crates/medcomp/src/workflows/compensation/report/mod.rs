mod insights;
mod summary;
pub mod views;

pub(crate) use insights::generate_insights;
