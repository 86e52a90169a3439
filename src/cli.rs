//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::constants::DEFAULT_OUTPUT;

/// 一款命令行隐写工具，把文本隐藏在未压缩 BMP 图像的像素数据中，或从中恢复文本。
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// 日志级别。
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：encode (隐藏)、decode (恢复) 和 info (查看头部信息)。
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 把文本文件的内容隐藏到 BMP 图像中。
    Encode(EncodeArgs),

    /// 从经过隐写的 BMP 图像中恢复隐藏的文本。
    Decode(DecodeArgs),

    /// 打印 BMP 头部信息以及可隐藏的字符数。
    Info(InfoArgs),
}

/// 'encode' 命令所需的参数。
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// 载体图像 (.bmp)。
    #[arg(value_name = "CARRIER")]
    pub carrier: PathBuf,

    /// 要隐藏的文本文件 (.txt)。
    #[arg(value_name = "SECRET")]
    pub secret: PathBuf,

    /// 输出图像路径。
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// 输出文件已存在时直接覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'decode' 命令所需的参数。
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// 已隐藏文本的图像 (.bmp)。
    #[arg(value_name = "CARRIER")]
    pub carrier: PathBuf,

    /// 把恢复的文本写入该文件，而不是打印到标准输出。
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// 逐字节恢复，不丢弃不可打印字符。
    #[arg(long)]
    pub raw: bool,
}

/// 'info' 命令所需的参数。
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// 要查看的图像 (.bmp)。
    #[arg(value_name = "CARRIER")]
    pub carrier: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_defaults_to_out_bmp() {
        let cli = Cli::try_parse_from(["stega", "encode", "cat.bmp", "secret.txt"]).unwrap();
        match cli.command {
            Commands::Encode(args) => {
                assert_eq!(args.output, PathBuf::from("out.bmp"));
                assert!(!args.force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn encode_requires_secret() {
        assert!(Cli::try_parse_from(["stega", "encode", "cat.bmp"]).is_err());
    }

    #[test]
    fn decode_accepts_raw_and_output() {
        let cli = Cli::try_parse_from([
            "stega",
            "--log-level",
            "debug",
            "decode",
            "cat.bmp",
            "--raw",
            "-o",
            "msg.txt",
        ])
        .unwrap();
        assert_eq!(cli.log_level, LogLevel::Debug);
        match cli.command {
            Commands::Decode(args) => {
                assert!(args.raw);
                assert_eq!(args.output, Some(PathBuf::from("msg.txt")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
