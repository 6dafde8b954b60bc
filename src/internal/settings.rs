//! 连接配置：原始配置项与校验后的只读配置。

pub mod structs;
