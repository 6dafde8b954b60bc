pub mod transport;

pub use transport::{BodyStream, Transport, TransportError, TransportResponse};
