//! 题目提供者抽象
//!
//! 出题流程只依赖这个 trait，不关心背后是哪家模型

use anyhow::Result;
use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{ExamMatrixEntry, QuestionBatch};

/// 根据一个矩阵项生成一批原始题目
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// 出题前检查访问凭证，缺失时返回 `AppError::MissingCredential`
    fn check_credentials(&self) -> AppResult<()> {
        Ok(())
    }

    /// 为单个分类生成题目；失败或返回为空都是允许的
    async fn generate_questions(&self, entry: &ExamMatrixEntry) -> Result<QuestionBatch>;
}
