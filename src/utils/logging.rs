/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::{info, warn};

use crate::config::Config;
use crate::models::TopicCategory;

/// 记录程序启动信息
pub fn log_startup(config: &Config, matrix_len: usize) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🤖 模型: {} ({})", config.llm_model_name, config.llm_api_base_url);
    info!("📊 出题矩阵: {} 个分类，并发请求", matrix_len);
    if config.llm_api_key.is_none() {
        warn!("⚠️ 未配置 LLM_API_KEY，无法生成试卷");
    }
    info!("{}", "=".repeat(60));
}

/// 记录分类开始生成
pub fn log_category_start(category: TopicCategory, count: usize) {
    info!("📦 开始生成 {}: 目标 {} 题", category, count);
}

/// 记录分类生成完成
pub fn log_category_complete(category: TopicCategory, actual: usize, expected: usize) {
    if actual < expected {
        warn!("⚠️ {} 完成: {}/{} 题", category, actual, expected);
    } else {
        info!("✓ {} 完成: {}/{} 题", category, actual, expected);
    }
}

/// 记录组卷结果
pub fn log_assembly_summary(total: usize, expected: usize) {
    info!("{}", "─".repeat(60));
    if total == 0 {
        warn!("❌ 组卷失败: 所有分类均未生成题目");
    } else {
        info!("✅ 组卷完成: {}/{} 题", total, expected);
    }
    info!("{}", "─".repeat(60));
}

/// 记录考试结束
pub fn log_exam_finished(correct: usize, total: usize, score: f64) {
    info!("🏁 考试结束: 答对 {}/{}，得分 {:.2}", correct, total, score);
}
