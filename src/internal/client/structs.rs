pub mod webdav_client;

pub use webdav_client::WebDavClient;
