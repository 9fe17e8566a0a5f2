pub mod config;
pub mod export;
pub mod form;
pub mod handlers;
pub mod helpers;
pub mod integrations;
pub mod jobs;

pub use form::FormController;
