pub mod compensation;
pub mod store;
pub mod submission;
