pub mod cancel_handle;
pub mod chunk_reader;
pub mod throttle;
pub mod transfer_options;
pub mod transfer_progress;
pub mod transfer_session;

pub use cancel_handle::CancelHandle;
pub use chunk_reader::ChunkReader;
pub use throttle::Throttle;
pub use transfer_options::TransferOptions;
pub use transfer_progress::{ProgressHandle, TransferProgress};
pub use transfer_session::TransferSession;
