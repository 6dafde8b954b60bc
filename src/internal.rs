pub mod client;
pub mod error;
pub mod settings;
pub mod transfer;
pub mod transport;
pub mod urn;
pub mod webdav;
