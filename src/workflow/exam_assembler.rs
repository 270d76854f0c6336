//! 组卷流程 - 流程层
//!
//! 核心职责：按出题矩阵并发请求各分类题目，清洗、合并并打乱
//!
//! 流程顺序：
//! 1. 检查凭证（缺失则直接失败，不发出任何请求）
//! 2. 每个矩阵项一个请求，全部并发
//! 3. 单个分类失败 → 重试 → 仍失败则该分类为空
//! 4. 全部完成后合并、打乱

use futures::future::join_all;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{error, warn};

use crate::error::AppResult;
use crate::models::{ExamMatrixEntry, Question, QuestionBatch};
use crate::services::QuestionProvider;
use crate::utils::logging::{log_assembly_summary, log_category_complete, log_category_start};

/// 组卷器
///
/// - 只依赖 `QuestionProvider` 能力
/// - 不持有考试状态
pub struct ExamAssembler<P> {
    provider: P,
    matrix: Vec<ExamMatrixEntry>,
    max_retries: usize,
}

impl<P: QuestionProvider> ExamAssembler<P> {
    pub fn new(provider: P, matrix: Vec<ExamMatrixEntry>) -> Self {
        Self {
            provider,
            matrix,
            max_retries: 0,
        }
    }

    /// 单个分类失败后的重试次数
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// 生成整张试卷
    ///
    /// 只有凭证缺失会返回错误；其余失败都体现为题目变少，全部失败时返回空列表。
    pub async fn generate_exam<R: Rng + ?Sized>(&self, rng: &mut R) -> AppResult<Vec<Question>> {
        self.provider.check_credentials()?;

        let generated_at = chrono::Utc::now().timestamp_millis();

        let tasks = self
            .matrix
            .iter()
            .map(|entry| self.generate_category(entry, generated_at));

        // 所有分类都完成后才继续
        let results = join_all(tasks).await;

        let mut questions: Vec<Question> = results.into_iter().flatten().collect();
        questions.shuffle(rng);

        let expected: usize = self.matrix.iter().map(|e| e.count).sum();
        log_assembly_summary(questions.len(), expected);

        Ok(questions)
    }

    /// 生成单个分类，任何错误都降级为空列表
    async fn generate_category(&self, entry: &ExamMatrixEntry, generated_at: i64) -> Vec<Question> {
        log_category_start(entry.category, entry.count);

        for attempt in 0..=self.max_retries {
            match self.provider.generate_questions(entry).await {
                Ok(batch) => {
                    let questions = sanitize(entry, batch, generated_at);
                    log_category_complete(entry.category, questions.len(), entry.count);
                    return questions;
                }
                Err(e) => {
                    warn!(
                        "⚠️ 生成 {} 失败 (尝试 {}/{}): {:#}",
                        entry.category,
                        attempt + 1,
                        self.max_retries + 1,
                        e
                    );
                }
            }
        }

        error!("❌ {} 生成失败，已重试 {} 次，该分类为空", entry.category, self.max_retries);
        Vec::new()
    }
}

/// 把原始题目清洗为标准题目，分配 ID，丢弃不合格的题目
pub fn sanitize(entry: &ExamMatrixEntry, batch: QuestionBatch, generated_at: i64) -> Vec<Question> {
    batch
        .questions
        .into_iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let id = format!("{}-{}-{}", entry.category.code(), index, generated_at);
            match raw.into_question(id, entry.category) {
                Ok(question) => Some(question),
                Err(reason) => {
                    warn!("⚠️ 丢弃 {} 第 {} 题: {}", entry.category, index + 1, reason);
                    None
                }
            }
        })
        .collect()
}
