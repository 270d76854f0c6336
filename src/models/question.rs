use phf::phf_map;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::text::strip_xml_prolog;

/// 每道题固定的选项数量
pub const OPTION_COUNT: usize = 4;

/// 难度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// 识记（Nhận biết）
    #[serde(rename = "Nhận biết")]
    Knowing,
    /// 理解（Thông hiểu）
    #[serde(rename = "Thông hiểu")]
    Understanding,
    /// 应用（Vận dụng）
    #[serde(rename = "Vận dụng")]
    Applying,
}

/// 难度标签表，键均为小写
static DIFFICULTY_LABELS: phf::Map<&'static str, Difficulty> = phf_map! {
    "nhận biết" => Difficulty::Knowing,
    "nb" => Difficulty::Knowing,
    "knowing" => Difficulty::Knowing,
    "thông hiểu" => Difficulty::Understanding,
    "th" => Difficulty::Understanding,
    "understanding" => Difficulty::Understanding,
    "vận dụng" => Difficulty::Applying,
    "vd" => Difficulty::Applying,
    "applying" => Difficulty::Applying,
};

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Knowing,
        Difficulty::Understanding,
        Difficulty::Applying,
    ];

    /// 提示词和界面中使用的标准标签
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Knowing => "Nhận biết",
            Difficulty::Understanding => "Thông hiểu",
            Difficulty::Applying => "Vận dụng",
        }
    }

    /// 英文说明
    pub fn english(self) -> &'static str {
        match self {
            Difficulty::Knowing => "Knowing",
            Difficulty::Understanding => "Understanding",
            Difficulty::Applying => "Applying",
        }
    }

    /// 宽松解析 LLM 返回的难度标签
    pub fn from_label(s: &str) -> Option<Self> {
        DIFFICULTY_LABELS.get(s.trim().to_lowercase().as_str()).copied()
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 知识板块
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicCategory {
    /// Số và Đại số
    Algebra,
    /// Hình học và Đo lường
    Geometry,
    /// Thống kê và Xác suất
    Statistics,
}

impl TopicCategory {
    /// 标准名称
    pub fn name(self) -> &'static str {
        match self {
            TopicCategory::Algebra => "Số và Đại số",
            TopicCategory::Geometry => "Hình học và Đo lường",
            TopicCategory::Statistics => "Thống kê và Xác suất",
        }
    }

    /// 用于生成题目 ID 的短代码
    pub fn code(self) -> &'static str {
        match self {
            TopicCategory::Algebra => "algebra",
            TopicCategory::Geometry => "geometry",
            TopicCategory::Statistics => "statistics",
        }
    }
}

impl std::fmt::Display for TopicCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 试卷中的一道选择题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// 本场考试内唯一
    pub id: String,
    pub category: TopicCategory,
    pub topic: String,
    pub difficulty: Difficulty,
    /// 题干，可能包含 LaTeX
    pub content: String,
    /// 恰好 4 个选项
    pub options: Vec<String>,
    /// 正确答案下标 0-3
    pub correct_answer: usize,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_method2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_svg: Option<String>,
}

impl Question {
    /// 选项字母 A-D
    pub fn option_letter(index: usize) -> char {
        (b'A' + (index as u8 % 26)) as char
    }

    pub fn is_correct(&self, answer: Option<usize>) -> bool {
        answer == Some(self.correct_answer)
    }
}

/// LLM 返回的一批题目
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionBatch {
    #[serde(default)]
    pub questions: Vec<RawQuestion>,
}

/// LLM 返回的原始题目，字段全部宽松解析
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<i64>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub solution_method2: Option<String>,
    #[serde(default)]
    pub geometry_svg: Option<String>,
}

/// 原始题目被丢弃的原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("题干为空")]
    EmptyContent,
    #[error("选项数量为 {0}，应为 4")]
    WrongOptionCount(usize),
    #[error("缺少正确答案")]
    MissingAnswer,
    #[error("正确答案下标 {0} 超出范围 [0, 3]")]
    AnswerOutOfRange(i64),
    #[error("无法识别的难度: {0:?}")]
    UnknownDifficulty(Option<String>),
}

impl RawQuestion {
    /// 校验并转换为标准题目
    pub fn into_question(self, id: String, category: TopicCategory) -> Result<Question, RejectReason> {
        let content = non_blank(self.content).ok_or(RejectReason::EmptyContent)?;

        if self.options.len() != OPTION_COUNT {
            return Err(RejectReason::WrongOptionCount(self.options.len()));
        }

        let correct_answer = self.correct_answer.ok_or(RejectReason::MissingAnswer)?;
        if !(0..OPTION_COUNT as i64).contains(&correct_answer) {
            return Err(RejectReason::AnswerOutOfRange(correct_answer));
        }

        let difficulty = self
            .difficulty
            .as_deref()
            .and_then(Difficulty::from_label)
            .ok_or_else(|| RejectReason::UnknownDifficulty(self.difficulty.clone()))?;

        Ok(Question {
            id,
            category,
            topic: non_blank(self.topic).unwrap_or_else(|| category.name().to_string()),
            difficulty,
            content,
            options: self.options,
            correct_answer: correct_answer as usize,
            explanation: self.explanation.unwrap_or_default(),
            solution_method2: non_blank(self.solution_method2),
            geometry_svg: non_blank(self.geometry_svg.map(|svg| strip_xml_prolog(&svg))),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
