//! 各阶段的终端界面
//!
//! 只读取 `ExamSession`，返回要打印的文本。题干中的 LaTeX 与 SVG 原样输出。

use std::fmt::Write as _;
use std::time::Duration;

use crate::models::Question;
use crate::workflow::exam_session::compute_score;
use crate::workflow::ExamSession;

const RULE_WIDTH: usize = 60;
const BAR_WIDTH: usize = 20;

/// 组卷时轮换显示的状态文字：(出现时间, 文案)
pub const GENERATING_STEPS: [(Duration, &str); 4] = [
    (Duration::from_millis(0), "AI đang phân tích ma trận đề thi..."),
    (Duration::from_millis(1500), "Đang tạo câu hỏi Đại số..."),
    (Duration::from_millis(3500), "Đang vẽ hình và tạo câu hỏi Hình học..."),
    (Duration::from_millis(6000), "Đang tổng hợp đề thi..."),
];

/// 剩余时间的颜色档位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerBand {
    Normal,
    Warning,
    Critical,
}

impl TimerBand {
    /// 低于 20% 为危险，低于 50% 为警告
    pub fn from_remaining(seconds: u32, total_seconds: u32) -> Self {
        let percent = remaining_percent(seconds, total_seconds);
        if percent < 20.0 {
            TimerBand::Critical
        } else if percent < 50.0 {
            TimerBand::Warning
        } else {
            TimerBand::Normal
        }
    }

    fn marker(self) -> &'static str {
        match self {
            TimerBand::Normal => "🟦",
            TimerBand::Warning => "🟨",
            TimerBand::Critical => "🟥",
        }
    }
}

/// 秒数格式化为 mm:ss
pub fn format_time(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

fn remaining_percent(seconds: u32, total_seconds: u32) -> f64 {
    if total_seconds == 0 {
        return 0.0;
    }
    seconds as f64 / total_seconds as f64 * 100.0
}

/// 满分（题量 × 每题分值）
fn max_score(session: &ExamSession) -> f64 {
    let settings = session.settings();
    compute_score(settings.total_questions, settings.score_per_question)
}

pub fn render_intro(session: &ExamSession) -> String {
    let settings = session.settings();
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out, "🧠 Luyện Thi Toán Vào 10");
    let _ = writeln!(out, "Hệ thống tự động sinh đề thi dựa trên cấu trúc ma trận chuẩn.");
    let _ = writeln!(
        out,
        "{} câu hỏi • {} phút • Giải chi tiết • Vẽ hình tự động",
        settings.total_questions,
        settings.duration_seconds / 60
    );
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    if let Some(error) = session.error() {
        let _ = writeln!(out, "⚠️  {}", error);
    }
    let _ = writeln!(out, "Nhấn Enter (hoặc gõ 'start') để bắt đầu làm bài, 'quit' để thoát.");
    out
}

pub fn render_generating(status: &str) -> String {
    format!("⏳ Đang tạo đề thi: {}", status)
}

/// 顶部计时条
pub fn render_timer_bar(session: &ExamSession) -> String {
    let total = session.settings().duration_seconds;
    let seconds = session.time_left();
    let percent = remaining_percent(seconds, total);
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "{} ⏱ {} [{}{}] Đề thi tuyển sinh vào lớp 10 - Môn Toán",
        TimerBand::from_remaining(seconds, total).marker(),
        format_time(seconds),
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled)
    )
}

pub fn render_status(session: &ExamSession) -> String {
    format!(
        "{}\nĐã làm: {}/{}",
        render_timer_bar(session),
        session.answered_count(),
        session.questions().len()
    )
}

/// 单道题；复习模式下显示答案与解析
pub fn render_question(index: usize, question: &Question, selected: Option<usize>, review: bool) -> String {
    let mut out = String::new();
    let status = if !review {
        String::new()
    } else if question.is_correct(selected) {
        " ✅".to_string()
    } else if selected.is_none() {
        " ⬜ (chưa làm)".to_string()
    } else {
        " ❌".to_string()
    };

    let _ = writeln!(
        out,
        "Câu {} [{} • {} • {}]{}",
        index + 1,
        question.category,
        question.topic,
        question.difficulty,
        status
    );
    let _ = writeln!(out, "{}", question.content);

    if let (false, Some(svg)) = (review, question.geometry_svg.as_deref()) {
        let _ = writeln!(out, "  [Hình vẽ]\n{}", indent(svg, 4));
    }

    for (i, option) in question.options.iter().enumerate() {
        let mark = match (review, selected == Some(i), i == question.correct_answer) {
            (true, _, true) => "✔",
            (true, true, false) => "✘",
            (_, true, _) => "●",
            _ => "○",
        };
        let _ = writeln!(out, "  {} {}. {}", mark, Question::option_letter(i), option);
    }

    if review {
        let _ = writeln!(
            out,
            "  Đáp án đúng: {}",
            Question::option_letter(question.correct_answer)
        );
        if !question.explanation.is_empty() {
            let _ = writeln!(out, "  Lời giải:\n{}", indent(&question.explanation, 4));
        }
        if let Some(method2) = &question.solution_method2 {
            let _ = writeln!(out, "  Cách 2:\n{}", indent(method2, 4));
        }
        if let Some(svg) = &question.geometry_svg {
            let _ = writeln!(out, "  Hình minh họa:\n{}", indent(svg, 4));
        }
    }
    out
}

pub fn render_exam(session: &ExamSession) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", render_timer_bar(session));
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out, "Bài thi trắc nghiệm");
    let _ = writeln!(
        out,
        "Đã làm: {}/{}   (gõ 'submit' để nộp bài sớm)",
        session.answered_count(),
        session.questions().len()
    );
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));

    for (index, question) in session.questions().iter().enumerate() {
        let _ = writeln!(
            out,
            "{}",
            render_question(index, question, session.answer_for(question), false)
        );
    }

    let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));
    let _ = writeln!(out, "{}", exam_help());
    let _ = writeln!(out, "Gõ 'submit' để nộp bài và xem kết quả.");
    out
}

pub fn exam_help() -> &'static str {
    "Chọn đáp án: '<số câu> <A-D>' (vd: 12 B) • 'show [n]' xem lại • 'status' thời gian • 'submit' nộp bài"
}

pub fn render_result(session: &ExamSession) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(
        out,
        "🏆 Điểm số của bạn: {:.2} / {}",
        session.score(),
        max_score(session)
    );
    let _ = writeln!(
        out,
        "Số câu đúng: {}/{}",
        session.correct_count(),
        session.questions().len()
    );
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out, "🧠 Tổng kết");
    let _ = writeln!(
        out,
        "Bạn đã hoàn thành bài thi. Dưới đây là đáp án chi tiết và giải thích cho từng câu hỏi.\n"
    );

    for (index, question) in session.questions().iter().enumerate() {
        let _ = writeln!(
            out,
            "{}",
            render_question(index, question, session.answer_for(question), true)
        );
    }

    let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));
    let _ = writeln!(out, "Gõ 'new' để làm đề mới, 'quit' để thoát.");
    out
}

fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExamSettings;
    use crate::models::{Difficulty, TopicCategory};
    use crate::workflow::ExamIntent;

    fn question(id: &str, correct_answer: usize) -> Question {
        Question {
            id: id.to_string(),
            category: TopicCategory::Geometry,
            topic: "Đường tròn".to_string(),
            difficulty: Difficulty::Understanding,
            content: "Cho đường tròn $(O; R)$...".to_string(),
            options: vec!["1".into(), "2".into(), "3".into(), "4".into()],
            correct_answer,
            explanation: "Vì...".to_string(),
            solution_method2: Some("Cách khác".to_string()),
            geometry_svg: Some("<svg viewBox=\"0 0 200 200\"></svg>".to_string()),
        }
    }

    fn finished_session() -> ExamSession {
        let session = ExamSession::new(ExamSettings::default());
        let (session, _) = session.apply(ExamIntent::StartRequested);
        let (session, _) =
            session.apply(ExamIntent::GenerationFinished(Ok(vec![question("q1", 2), question("q2", 0)])));
        let (session, _) = session.apply(ExamIntent::SelectOption {
            question_index: 0,
            option_index: 2,
        });
        session.apply(ExamIntent::Submit).0
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(5400), "90:00");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(0), "00:00");
    }

    #[test]
    fn test_timer_band() {
        assert_eq!(TimerBand::from_remaining(100, 100), TimerBand::Normal);
        assert_eq!(TimerBand::from_remaining(40, 100), TimerBand::Warning);
        assert_eq!(TimerBand::from_remaining(19, 100), TimerBand::Critical);
        assert_eq!(TimerBand::from_remaining(0, 0), TimerBand::Critical);
    }

    #[test]
    fn test_intro_shows_error() {
        let session = ExamSession::new(ExamSettings::default());
        let (session, _) = session.apply(ExamIntent::StartRequested);
        let (session, _) = session.apply(ExamIntent::GenerationFinished(Err("Thiếu API Key".into())));
        let text = render_intro(&session);
        assert!(text.contains("Thiếu API Key"));
        assert!(text.contains("50 câu hỏi • 90 phút"));
    }

    #[test]
    fn test_exam_view_hides_answers() {
        let session = ExamSession::new(ExamSettings::default());
        let (session, _) = session.apply(ExamIntent::StartRequested);
        let (session, _) = session.apply(ExamIntent::GenerationFinished(Ok(vec![question("q1", 2)])));
        let text = render_exam(&session);
        assert!(text.contains("Đã làm: 0/1"));
        assert!(text.contains("90:00"));
        assert!(!text.contains("Đáp án đúng"));
    }

    #[test]
    fn test_answered_counter_uses_delivered_questions() {
        let session = ExamSession::new(ExamSettings::default());
        let (session, _) = session.apply(ExamIntent::StartRequested);
        let (session, _) =
            session.apply(ExamIntent::GenerationFinished(Ok(vec![question("q1", 2), question("q2", 0)])));
        let (session, _) = session.apply(ExamIntent::SelectOption {
            question_index: 0,
            option_index: 1,
        });
        let (session, _) = session.apply(ExamIntent::SelectOption {
            question_index: 1,
            option_index: 0,
        });
        assert!(render_status(&session).contains("Đã làm: 2/2"));
    }

    #[test]
    fn test_result_view_reviews_answers() {
        let text = render_result(&finished_session());
        assert!(text.contains("Điểm số của bạn: 0.20 / 10"));
        assert!(text.contains("Số câu đúng: 1/2"));
        assert!(text.contains("Đáp án đúng: C"));
        assert!(text.contains("Cách 2"));
        assert!(text.contains("<svg viewBox"));
        assert!(text.contains("chưa làm"));
    }
}
