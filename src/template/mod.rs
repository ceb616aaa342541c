pub mod catalog;
pub mod resolve;
