/// 上传请求体流的结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadEnd {
    /// 仍在发送
    Pending,
    /// 数据源读完，全部分块已交给传输层
    Finished,
    /// 取消信号生效，流以 `TransportError::Cancelled` 结束
    Cancelled,
    /// 读取数据源失败
    Failed,
}

impl UploadEnd {
    pub fn is_ended(&self) -> bool {
        !matches!(self, UploadEnd::Pending)
    }
}
