pub mod analytics;
pub mod confirm;
pub mod expenses;
pub mod form;
