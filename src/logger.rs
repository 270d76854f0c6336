//! 日志初始化
//!
//! 日志输出到 stderr，不与 stdout 上的界面混在一起

use tracing_subscriber::EnvFilter;

/// 初始化全局日志；`RUST_LOG` 优先，否则按 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
