//! # Math Exam Trainer
//!
//! 一个用 LLM 自动生成九年级数学选择题试卷、限时作答并评分的终端应用
//!
//! ## 架构设计
//!
//! ### ① 数据层（Models）
//! - `models/` - `Question`、`ExamMatrixEntry`，以及出题矩阵的 TOML 加载
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个分类
//! - `QuestionProvider` - 出题能力抽象
//! - `LlmService` - 基于 OpenAI 兼容接口的出题实现
//!
//! ### ③ 流程层（Workflow）
//! - `ExamAssembler` - 并发请求各分类，清洗、合并、打乱
//! - `ExamSession` - 考试状态机（intro → generating → exam → result）
//! - `Countdown` - 绑定在一场考试上的可取消倒计时
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator::App` - 单任务事件循环，持有会话并执行副作用
//!
//! ### 界面（UI）
//! - `ui/` - 渲染各阶段视图、解析终端输入

pub mod config;
pub mod error;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod ui;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, ExamSettings};
pub use error::{AppError, AppResult};
pub use models::{Difficulty, ExamMatrixEntry, Question, TopicCategory};
pub use orchestrator::App;
pub use services::{LlmService, QuestionProvider};
pub use workflow::{ExamAssembler, ExamIntent, ExamPhase, ExamSession};
