use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use stega::{
    cli::{Cli, Commands},
    error::{ExitStatus, Operation, StegaError},
    handler::{handle_decode, handle_encode, handle_info},
};

/// 程序的主入口点
///
/// 负责解析命令行参数、初始化日志，并根据子命令（`encode`、`decode` 或 `info`）
/// 将执行分派到相应的处理函数，最后把错误映射为退出码
fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help 与 --version 也会走到这里，它们不算错误
            let status = if err.use_stderr() {
                ExitStatus::InvalidArguments
            } else {
                ExitStatus::Success
            };
            let _ = err.print();
            return status.into();
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(cli.log_level.into())
        .format_timestamp(None)
        .init();

    let (operation, result) = match cli.command {
        Commands::Encode(args) => (Operation::Encode, handle_encode(args)),
        Commands::Decode(args) => (Operation::Decode, handle_decode(args)),
        Commands::Info(args) => (Operation::Info, handle_info(args)),
    };

    match result {
        Ok(()) => ExitStatus::Success.into(),
        Err(err) => {
            eprintln!("{} {err:?}", "Error:".red().bold());
            err.downcast_ref::<StegaError>()
                .map_or(ExitStatus::Failure, |e| e.exit_status(operation))
                .into()
        }
    }
}
