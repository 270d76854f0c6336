//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (事件循环，持有 ExamSession)
//!     ↓
//! workflow (ExamSession 状态机 / ExamAssembler 组卷 / Countdown 倒计时)
//!     ↓
//! services (能力层：QuestionProvider / LlmService)
//!     ↓
//! models (Question / ExamMatrixEntry)
//! ```
//!
//! ui 只负责渲染和解析输入，不修改状态。

pub mod app;

pub use app::{App, AppEvent, Flow};
