//! 路径模型：远程资源路径的规范化、拼接与编码。

pub mod structs;
