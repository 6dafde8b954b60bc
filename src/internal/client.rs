//! 对外的 WebDAV 客户端

pub mod structs;
