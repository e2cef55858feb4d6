// src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("无法从链接 '{0}' 中解析出域名")]
    InvalidUrl(String),
    #[error("自动模式无法为域名 '{domain}' 匹配任何下载工具")]
    UnresolvedAutomatic { domain: String },
    #[error("{program} 以非零状态退出 (退出码: {code})")]
    ChildProcessFailure { program: String, code: String },
    #[error("无法启动外部程序 '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("有下载任务正在运行，暂时无法修改{0}")]
    ControlsLocked(&'static str),
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("临时文件持久化失败: {0}")]
    TempFilePersist(#[from] tempfile::PersistError),
    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("用户中断")]
    UserInterrupt,
    #[error("{0}")] // 只打印内部信息，不加任何前缀
    UserInputError(String),
    #[error("未知错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// 解析阶段的错误：任务尚未启动，不写入下载日志。
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            AppError::InvalidUrl(_) | AppError::UnresolvedAutomatic { .. }
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
