pub mod exports;
pub mod form;
pub mod network;
