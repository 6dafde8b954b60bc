/// 内部导出的模块
mod internal;


/// 导出核心入口
pub use internal::client::structs::WebDavClient;
pub use internal::error::{Result, WebDavError};

/// 连接配置：原始配置项与校验后的只读配置
pub mod settings {
    use crate::internal;
    pub use internal::settings::structs::*;
}

/// 规范化的远程路径
pub mod urn {
    use crate::internal;
    pub use internal::urn::structs::*;
}

/// 对外提供webdav基础访问能力，不能限制死在客户端中，以防有人自己要用
pub mod webdav {
    pub mod enums {
        use crate::internal;
        pub use internal::webdav::enums::{
            Depth, OutcomeKind, WebDavAction, WebDavMethod,
        };
    }

    pub mod functions {
        use crate::internal;
        pub use internal::webdav::functions::classify_status;
        pub use internal::webdav::raw_xml::{
            parse_multistatus, parse_status_multistatus,
        };
    }

    pub mod request {
        use crate::internal;
        pub use internal::webdav::request::*;
    }

    pub mod structs {
        use crate::internal;
        pub use internal::webdav::structs::*;
    }
}

/// 可替换的传输层
pub mod transport {
    use crate::internal;
    pub use internal::transport::structs::*;
    pub use internal::transport::traits::*;
}

/// 分块传输：选项、进度、取消、限速与时钟
pub mod transfer {
    use crate::internal;
    pub use internal::transfer::structs::{
        CancelHandle, ProgressHandle, Throttle, TransferOptions,
        TransferProgress,
    };
    pub use internal::transfer::traits::*;
}
