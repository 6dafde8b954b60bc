pub mod remote_path;

pub use remote_path::RemotePath;
