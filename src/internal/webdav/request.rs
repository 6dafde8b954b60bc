//! 请求构造：每个 WebDAV 动词对应的方法、请求头和请求体。

pub mod request_builder;
pub mod webdav_request;

pub use request_builder::RequestBuilder;
pub use webdav_request::{RequestBody, WebDavRequest};
