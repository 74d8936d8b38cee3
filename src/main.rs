//! # nucrad - 核电荷半径拟合工具
//!
//! 由弹性电子散射微分截面拟合 Fermi 型电荷密度，给出 rms 电荷半径。
//!
//! ## 子命令
//! - `fit` - 从测量截面拟合 ρ₀, a, b
//! - `predict` - 给定参数计算截面和密度剖面
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (测量数据读取)
//!   │     ├── fit/       (约束最小二乘拟合)
//!   │     ├── physics/   (密度、运动学、截面)
//!   │     ├── report/    (导出与绘图)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   ├── logging.rs  (日志初始化)
//!   └── error.rs    (错误处理)
//! ```

mod cli;
mod commands;
mod error;
mod fit;
mod logging;
mod models;
mod parsers;
mod physics;
mod report;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    let result = logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())
        .and_then(|_| commands::configure_parallelism(cli.jobs))
        .and_then(|_| commands::run(cli.command));

    if let Err(e) = result {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
