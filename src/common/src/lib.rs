pub mod batch;
pub mod constants;
pub mod event;
