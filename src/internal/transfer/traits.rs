pub mod clock;
pub mod transfer_sink;
pub mod transfer_source;

pub use clock::{Clock, TokioClock};
pub use transfer_sink::TransferSink;
pub use transfer_source::TransferSource;
