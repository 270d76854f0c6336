//! 终端界面：渲染各阶段视图，把输入解析为命令

pub mod input;
pub mod views;

pub use input::{parse_command, Command};
pub use views::{render_exam, render_generating, render_intro, render_result, render_status};
