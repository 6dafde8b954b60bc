//! 传输层：一个可替换的 [`traits::Transport`] 接口 + 默认的 reqwest 实现

pub mod structs;
pub mod traits;
