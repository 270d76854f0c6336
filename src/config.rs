/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    /// 访问凭证，缺失时任何出题请求都会失败
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    /// 单个分类请求失败后的最大重试次数
    pub max_retries: usize,
    // --- 考试配置 ---
    /// 考试时长（秒）
    pub exam_duration_seconds: u32,
    /// 预期题目总数（仅用于显示）
    pub total_questions: usize,
    /// 每题分值
    pub score_per_question: f64,
    /// 自定义出题矩阵 TOML 文件
    pub matrix_file: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: None,
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-3-flash-preview".to_string(),
            llm_temperature: 0.7,
            llm_max_tokens: 16384,
            max_retries: 1,
            exam_duration_seconds: 90 * 60,
            total_questions: 50,
            score_per_question: 0.2,
            matrix_file: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: non_empty_var("LLM_API_KEY").or_else(|| non_empty_var("API_KEY")),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
            llm_max_tokens: std::env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_tokens),
            max_retries: std::env::var("MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_retries),
            exam_duration_seconds: std::env::var("EXAM_DURATION_SECONDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.exam_duration_seconds),
            total_questions: std::env::var("TOTAL_QUESTIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.total_questions),
            score_per_question: std::env::var("SCORE_PER_QUESTION").ok().and_then(|v| v.parse().ok()).unwrap_or(default.score_per_question),
            matrix_file: non_empty_var("EXAM_MATRIX_FILE"),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 状态机只关心的考试参数
    pub fn exam_settings(&self) -> ExamSettings {
        ExamSettings {
            duration_seconds: self.exam_duration_seconds,
            total_questions: self.total_questions,
            score_per_question: self.score_per_question,
        }
    }
}

/// 考试参数（时长、题量、分值）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExamSettings {
    pub duration_seconds: u32,
    pub total_questions: usize,
    pub score_per_question: f64,
}

impl Default for ExamSettings {
    fn default() -> Self {
        Config::default().exam_settings()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
