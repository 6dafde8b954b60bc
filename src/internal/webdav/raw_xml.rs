pub mod multi_status;

pub use multi_status::{parse_multistatus, parse_status_multistatus};
