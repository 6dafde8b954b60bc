pub mod operation_outcome;
pub mod property;
pub mod resource_info;

pub use operation_outcome::{OperationOutcome, OutcomeStatus};
pub use property::{Property, PropertyName, DAV_NAMESPACE};
pub use resource_info::ResourceInfo;
