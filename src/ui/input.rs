//! 终端输入解析

use regex::Regex;
use std::sync::OnceLock;

use crate::models::question::OPTION_COUNT;

static SELECT_RE: OnceLock<Regex> = OnceLock::new();

/// 一行输入对应的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 空行
    Empty,
    Start,
    /// 题号和选项都从 0 开始
    Select {
        question_index: usize,
        option_index: usize,
    },
    /// 重新显示试卷或某一题（从 0 开始）
    Show(Option<usize>),
    Status,
    Submit,
    NewExam,
    Help,
    Quit,
    Unknown(String),
}

/// 解析一行输入
///
/// 选题格式：`12 B`、`12b`、`12.b`、`12 2`（题号从 1 开始，选项为 A-D 或 1-4）
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    let lower = line.to_lowercase();
    match lower.as_str() {
        "start" | "s" | "bắt đầu" | "batdau" => return Command::Start,
        "submit" | "nộp" | "nop" | "nộp bài" => return Command::Submit,
        "new" | "mới" | "moi" | "làm đề mới" => return Command::NewExam,
        "status" | "time" | "t" => return Command::Status,
        "show" | "ls" => return Command::Show(None),
        "help" | "h" | "?" => return Command::Help,
        "quit" | "exit" | "q" => return Command::Quit,
        _ => {}
    }

    if let Some(rest) = lower.strip_prefix("show ") {
        if let Some(index) = parse_question_number(rest) {
            return Command::Show(Some(index));
        }
    }

    let re = SELECT_RE.get_or_init(|| {
        Regex::new(r"^(\d+)\s*[.:)]?\s*([a-d1-4])$").expect("选题正则无效")
    });
    if let Some(caps) = re.captures(&lower) {
        let question_index = parse_question_number(&caps[1]);
        let option_index = parse_option(&caps[2]);
        if let (Some(question_index), Some(option_index)) = (question_index, option_index) {
            return Command::Select {
                question_index,
                option_index,
            };
        }
    }

    Command::Unknown(line.to_string())
}

fn parse_question_number(s: &str) -> Option<usize> {
    s.trim().parse::<usize>().ok().and_then(|n| n.checked_sub(1))
}

fn parse_option(s: &str) -> Option<usize> {
    let c = s.chars().next()?;
    let index = match c {
        'a'..='d' => c as usize - 'a' as usize,
        '1'..='4' => c as usize - '1' as usize,
        _ => return None,
    };
    (index < OPTION_COUNT).then_some(index)
}
