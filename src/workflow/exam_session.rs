//! 考试状态机
//!
//! 考试进度的唯一数据源。每次状态转换都是 `(旧状态, 意图) -> (新状态, 副作用)`，
//! 副作用（开始组卷、启动/停止倒计时）交给编排层执行。
//!
//! ```text
//! Intro --StartRequested--> Generating --成功--> Exam --Submit / 时间到--> Result
//!   ^                           |                                        |
//!   +---------失败或为空----------+                                        |
//!   +-------------------------------NewExam-------------------------------+
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::config::ExamSettings;
use crate::error::AppError;
use crate::models::Question;
use crate::utils::logging::log_exam_finished;

/// 考试阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamPhase {
    Intro,
    Generating,
    Exam,
    Result,
}

/// 用户或系统发出的意图
#[derive(Debug, Clone)]
pub enum ExamIntent {
    /// 点击"开始"
    StartRequested,
    /// 组卷结束；错误为展示给用户的文案
    GenerationFinished(Result<Vec<Question>, String>),
    SelectOption {
        question_index: usize,
        option_index: usize,
    },
    Submit,
    /// 倒计时的一次跳动，`epoch` 标识它属于哪一场考试
    Tick { epoch: u64 },
    NewExam,
}

/// 状态转换产生的副作用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEffect {
    BeginAssembly,
    StartCountdown { epoch: u64 },
    StopCountdown,
}

/// 一场考试的全部状态
#[derive(Debug, Clone, PartialEq)]
pub struct ExamSession {
    settings: ExamSettings,
    phase: ExamPhase,
    questions: Vec<Question>,
    /// question id -> 选项下标
    answers: HashMap<String, usize>,
    time_left: u32,
    score: f64,
    correct_count: usize,
    error: Option<String>,
    /// 每进入一次 Exam 阶段加一
    epoch: u64,
}

impl ExamSession {
    pub fn new(settings: ExamSettings) -> Self {
        Self {
            settings,
            phase: ExamPhase::Intro,
            questions: Vec::new(),
            answers: HashMap::new(),
            time_left: settings.duration_seconds,
            score: 0.0,
            correct_count: 0,
            error: None,
            epoch: 0,
        }
    }

    pub fn phase(&self) -> ExamPhase {
        self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &HashMap<String, usize> {
        &self.answers
    }

    pub fn answer_for(&self, question: &Question) -> Option<usize> {
        self.answers.get(&question.id).copied()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn settings(&self) -> &ExamSettings {
        &self.settings
    }

    /// 应用一个意图。当前阶段不接受的意图不改变状态。
    pub fn apply(self, intent: ExamIntent) -> (Self, Option<SessionEffect>) {
        match (self.phase, intent) {
            (ExamPhase::Intro, ExamIntent::StartRequested) => (
                Self {
                    phase: ExamPhase::Generating,
                    error: None,
                    ..self
                },
                Some(SessionEffect::BeginAssembly),
            ),
            (ExamPhase::Generating, ExamIntent::GenerationFinished(Ok(questions))) => {
                if questions.is_empty() {
                    (self.back_to_intro(AppError::EmptyExam.user_message()), None)
                } else {
                    self.install(questions)
                }
            }
            (ExamPhase::Generating, ExamIntent::GenerationFinished(Err(message))) => {
                (self.back_to_intro(message), None)
            }
            (
                ExamPhase::Exam,
                ExamIntent::SelectOption {
                    question_index,
                    option_index,
                },
            ) => (self.select_option(question_index, option_index), None),
            (ExamPhase::Exam, ExamIntent::Submit) => {
                (self.finish(), Some(SessionEffect::StopCountdown))
            }
            (ExamPhase::Exam, ExamIntent::Tick { epoch }) if epoch == self.epoch => self.tick(),
            (ExamPhase::Result, ExamIntent::NewExam) => (
                Self {
                    epoch: self.epoch,
                    ..Self::new(self.settings)
                },
                None,
            ),
            (phase, intent) => {
                debug!("忽略意图 {} (当前阶段: {:?})", intent_name(&intent), phase);
                (self, None)
            }
        }
    }

    fn back_to_intro(self, message: String) -> Self {
        Self {
            phase: ExamPhase::Intro,
            error: Some(message),
            ..self
        }
    }

    fn install(self, questions: Vec<Question>) -> (Self, Option<SessionEffect>) {
        let epoch = self.epoch + 1;
        let session = Self {
            phase: ExamPhase::Exam,
            questions,
            answers: HashMap::new(),
            time_left: self.settings.duration_seconds,
            score: 0.0,
            correct_count: 0,
            error: None,
            epoch,
            settings: self.settings,
        };
        (session, Some(SessionEffect::StartCountdown { epoch }))
    }

    fn select_option(mut self, question_index: usize, option_index: usize) -> Self {
        let Some(question) = self.questions.get(question_index) else {
            debug!("题号 {} 超出范围", question_index + 1);
            return self;
        };
        if option_index >= question.options.len() {
            debug!("选项 {} 超出范围", option_index);
            return self;
        }
        self.answers.insert(question.id.clone(), option_index);
        self
    }

    fn tick(mut self) -> (Self, Option<SessionEffect>) {
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            (self.finish(), Some(SessionEffect::StopCountdown))
        } else {
            (self, None)
        }
    }

    fn finish(self) -> Self {
        let correct_count = count_correct(&self.questions, &self.answers);
        let score = compute_score(correct_count, self.settings.score_per_question);
        log_exam_finished(correct_count, self.questions.len(), score);
        Self {
            phase: ExamPhase::Result,
            score,
            correct_count,
            ..self
        }
    }
}

/// 答对的题数；未作答算错
pub fn count_correct(questions: &[Question], answers: &HashMap<String, usize>) -> usize {
    questions
        .iter()
        .filter(|q| q.is_correct(answers.get(&q.id).copied()))
        .count()
}

/// 得分保留两位小数
pub fn compute_score(correct_count: usize, score_per_question: f64) -> f64 {
    (correct_count as f64 * score_per_question * 100.0).round() / 100.0
}

fn intent_name(intent: &ExamIntent) -> &'static str {
    match intent {
        ExamIntent::StartRequested => "StartRequested",
        ExamIntent::GenerationFinished(_) => "GenerationFinished",
        ExamIntent::SelectOption { .. } => "SelectOption",
        ExamIntent::Submit => "Submit",
        ExamIntent::Tick { .. } => "Tick",
        ExamIntent::NewExam => "NewExam",
    }
}
