//! 分块传输引擎：上传下载共用的分块、限速、进度与取消

pub mod enums;
pub mod functions;
pub mod structs;
pub mod traits;
