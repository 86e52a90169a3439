//! # 错误类型模块
//!
//! 定义库内所有可能出现的错误，以及它们在进程边界上对应的退出码。

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StegaError {
    /// 文件扩展名不符合要求，例如载体不是 `.bmp`。
    #[error("Invalid file type: {path:?} (expected a .{expected} file)")]
    InvalidFileType { path: PathBuf, expected: &'static str },

    /// 输入文件不存在或无法读取。
    #[error("Unable to open file: {path:?}")]
    FileOpen { path: PathBuf, source: io::Error },

    /// 文本长度加上结束标记超出了图像的像素容量。
    #[error("The payload ({payload_len} bytes) does not fit into the image (capacity: {capacity} bytes)")]
    PayloadTooLarge { payload_len: usize, capacity: usize },

    /// 数据源不足以容纳声明的头部。
    #[error("Truncated bitmap header: expected at least {expected} bytes")]
    TruncatedHeader { expected: usize },

    /// 头部字段之间互相矛盾，派生大小会下溢。
    #[error("Inconsistent bitmap header: {field} is {value}, but must be at least {bound}")]
    ArithmeticInvariantViolated {
        field: &'static str,
        value: u32,
        bound: u32,
    },

    /// 像素数组比头部声明的短。
    #[error("Truncated pixel data: expected {expected} bytes, found {actual}")]
    TruncatedPixelData { expected: usize, actual: usize },

    /// 输出文件已存在且未指定 `--force`。
    #[error("Output file already exists: {path:?} (use --force to overwrite)")]
    OutputExists { path: PathBuf },

    /// 写入输出文件失败。
    #[error("Unable to write output file: {path:?}")]
    OutputWrite { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// 程序的退出码。
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success = 0,
    InvalidArguments = 1,
    InvalidFileType = 2,
    EncodeFileOpen = 3,
    ImageTooSmall = 4,
    DecodeFileOpen = 5,
    MalformedBitmap = 6,
    OutputFailure = 7,
    Failure = 8,
}

/// 出错时正在执行的操作，决定 "打开文件失败" 对应哪个退出码。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encode,
    Decode,
    Info,
}

impl StegaError {
    pub fn exit_status(&self, operation: Operation) -> ExitStatus {
        match self {
            Self::InvalidFileType { .. } => ExitStatus::InvalidFileType,
            Self::FileOpen { .. } => match operation {
                Operation::Encode => ExitStatus::EncodeFileOpen,
                Operation::Decode | Operation::Info => ExitStatus::DecodeFileOpen,
            },
            Self::PayloadTooLarge { .. } => ExitStatus::ImageTooSmall,
            Self::TruncatedHeader { .. }
            | Self::ArithmeticInvariantViolated { .. }
            | Self::TruncatedPixelData { .. } => ExitStatus::MalformedBitmap,
            Self::OutputExists { .. } | Self::OutputWrite { .. } => ExitStatus::OutputFailure,
            Self::Io(_) => ExitStatus::Failure,
        }
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status as u8)
    }
}
