pub mod webdav_options;
pub mod webdav_settings;

pub use webdav_options::{ProxyAuth, WebDavOptions};
pub use webdav_settings::{WebDavSettings, DEFAULT_CHUNK_SIZE, DEFAULT_TIMEOUT};
