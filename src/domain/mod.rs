pub mod id;
pub mod store;
pub mod todo;
pub mod validation;
