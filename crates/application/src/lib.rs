pub mod context;
pub mod errors;
pub mod interfaces;
pub mod usercases;
