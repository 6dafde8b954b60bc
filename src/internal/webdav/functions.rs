pub mod classify_status;

pub use classify_status::classify_status;
pub(crate) use classify_status::status_error;
