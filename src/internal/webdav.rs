//! WebDAV 协议层：请求构造、响应解析、状态码分类

pub mod enums;
pub mod functions;
pub mod raw_xml;
pub mod request;
pub mod structs;
