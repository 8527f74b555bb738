pub mod query;
pub mod selection;
