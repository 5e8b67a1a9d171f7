pub mod query;
pub mod release;
pub mod submit;
pub mod transition;
