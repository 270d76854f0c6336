//! LLM 服务 - 业务能力层
//!
//! 只负责"出题"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Gemini 的 OpenAI 兼容端点）

use anyhow::{Context, Result};
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};
use crate::models::{ExamMatrixEntry, QuestionBatch, RawQuestion};
use crate::services::prompt::{build_prompt, SYSTEM_MESSAGE};
use crate::services::question_provider::QuestionProvider;
use crate::utils::text::{strip_code_fence, truncate_text};

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 生成单个分类的题目
/// - 解析返回的 JSON
/// - 不关心题目合并、打乱和计分
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    has_credentials: bool,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.llm_api_key.clone().unwrap_or_default())
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            has_credentials: config.llm_api_key.is_some(),
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    pub async fn send_to_llm(&self, user_message: &str, system_message: Option<&str>) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

/// 响应外层结构，题目先按原始 JSON 保留，逐条解析
#[derive(Debug, serde::Deserialize)]
struct BatchEnvelope {
    #[serde(default)]
    questions: Vec<serde_json::Value>,
}

/// 解析 LLM 返回的题目 JSON（允许被代码块包裹）
///
/// 外层结构错误时整体失败；单条题目类型不符只丢弃该条
pub fn parse_question_batch(response: &str) -> AppResult<QuestionBatch> {
    let json = strip_code_fence(response);
    let envelope: BatchEnvelope = serde_json::from_str(json)?;

    let questions = envelope
        .questions
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<RawQuestion>(value) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!("⚠️ 第 {} 题 JSON 结构不符，已丢弃: {}", index + 1, e);
                None
            }
        })
        .collect();

    Ok(QuestionBatch { questions })
}

#[async_trait]
impl QuestionProvider for LlmService {
    fn check_credentials(&self) -> AppResult<()> {
        if self.has_credentials {
            Ok(())
        } else {
            Err(AppError::MissingCredential)
        }
    }

    async fn generate_questions(&self, entry: &ExamMatrixEntry) -> Result<QuestionBatch> {
        let prompt = build_prompt(entry);
        let response = self.send_to_llm(&prompt, Some(SYSTEM_MESSAGE)).await?;

        debug!("{} 返回: {}", entry.category, truncate_text(&response, 200));

        let batch = parse_question_batch(&response)
            .with_context(|| format!("解析 {} 的题目失败", entry.category))?;
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_exam_matrix;

    #[test]
    fn test_parse_question_batch_fenced() {
        let response = "```json\n{\"questions\":[{\"content\":\"1+1=?\",\"options\":[\"1\",\"2\",\"3\",\"4\"],\"correctAnswer\":1}]}\n```";
        let batch = parse_question_batch(response).unwrap();
        assert_eq!(batch.questions.len(), 1);
        assert_eq!(batch.questions[0].correct_answer, Some(1));
    }

    #[test]
    fn test_parse_question_batch_skips_mistyped_entries() {
        let good = r#"{"content":"1+1=?","options":["1","2","3","4"],"correctAnswer":1}"#;
        let string_answer = r#"{"content":"2+2=?","options":["1","2","3","4"],"correctAnswer":"3"}"#;
        let null_options = r#"{"content":"3+3=?","options":null,"correctAnswer":2}"#;
        let response = format!(r#"{{"questions":[{}, {}, {}]}}"#, good, string_answer, null_options);

        let batch = parse_question_batch(&response).unwrap();
        assert_eq!(batch.questions.len(), 1);
        assert_eq!(batch.questions[0].content.as_deref(), Some("1+1=?"));
    }

    #[test]
    fn test_parse_question_batch_invalid_json() {
        let err = parse_question_batch("Xin lỗi, tôi không thể").unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::JsonParseFailed { .. })));
    }

    #[test]
    fn test_missing_key_fails_credential_check() {
        let service = LlmService::new(&Config::default());
        assert!(matches!(service.check_credentials(), Err(AppError::MissingCredential)));

        let config = Config {
            llm_api_key: Some("test-key".to_string()),
            ..Config::default()
        };
        assert!(LlmService::new(&config).check_credentials().is_ok());
    }

    /// 真实调用 LLM 出题
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_generate_questions_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_generate_questions_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let service = LlmService::new(&Config::from_env());
        let matrix = default_exam_matrix();

        let batch = service.generate_questions(&matrix[2]).await.unwrap();
        println!("生成 {} 道题", batch.questions.len());
        assert!(!batch.questions.is_empty());
    }
}
