use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 缺少访问凭证，出题前即失败
    #[error("缺少 LLM 访问凭证 (API Key)")]
    MissingCredential,
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 所有分类均未生成题目
    #[error("无法生成试卷: 没有可用的题目")]
    EmptyExam,
    /// 文件操作错误
    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 返回内容不是合法的题目 JSON
    #[error("LLM返回的JSON无法解析: {source}")]
    JsonParseFailed {
        #[source]
        source: serde_json::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 矩阵文件解析失败
    #[error("出题矩阵文件解析失败 ({path}): {message}")]
    MatrixParseFailed { path: String, message: String },
    /// 矩阵为空
    #[error("出题矩阵为空")]
    EmptyMatrix,
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Llm(LlmError::JsonParseFailed { source: err })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 显示在首页的提示信息
    pub fn user_message(&self) -> String {
        match self {
            AppError::MissingCredential => "Thiếu API Key. Vui lòng cấu hình LLM_API_KEY.".to_string(),
            AppError::EmptyExam => "Không thể tạo đề thi. Vui lòng kiểm tra API Key.".to_string(),
            other => format!("Đã có lỗi xảy ra: {}", other),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_for_missing_credential() {
        let msg = AppError::MissingCredential.user_message();
        assert!(msg.contains("API Key"));
    }

    #[test]
    fn test_json_error_maps_to_llm_error() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, AppError::Llm(LlmError::JsonParseFailed { .. })));
    }
}
