pub mod activity;
pub mod catalog;
pub mod module;
