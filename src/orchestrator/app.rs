//! 应用事件循环 - 编排层
//!
//! ## 职责
//!
//! - 唯一持有 `ExamSession`，所有修改都经过 `ExamSession::apply`
//! - 执行状态机返回的副作用：启动组卷任务、启动/停止倒计时
//! - 把终端输入翻译为意图，把状态渲染到输出
//!
//! 所有事件（输入、组卷结果、倒计时跳动、加载文案）都经同一个通道进入循环，
//! 由单个任务顺序处理。

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::models::resolve_exam_matrix;
use crate::services::{LlmService, QuestionProvider};
use crate::ui::views::{self, GENERATING_STEPS};
use crate::ui::{parse_command, Command};
use crate::utils::logging::log_startup;
use crate::workflow::{
    Countdown, ExamAssembler, ExamIntent, ExamPhase, ExamSession, SessionEffect, TICK_PERIOD,
};

/// 事件循环中的消息
#[derive(Debug)]
pub enum AppEvent {
    Intent(ExamIntent),
    /// 终端输入的一行
    Input(String),
    /// 输入流结束
    InputClosed,
    /// 组卷中轮换的状态文案
    GeneratingStatus { generation: u64, step: usize },
}

impl From<ExamIntent> for AppEvent {
    fn from(intent: ExamIntent) -> Self {
        AppEvent::Intent(intent)
    }
}

/// 处理完一个事件后是否继续
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// 应用主结构
pub struct App<P, W> {
    session: ExamSession,
    assembler: Arc<ExamAssembler<P>>,
    countdown: Option<Countdown>,
    tick_period: Duration,
    /// 每次开始组卷加一，用于丢弃过期的状态文案
    generation: u64,
    input_closed: bool,
    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,
    out: W,
}

impl App<LlmService, std::io::Stdout> {
    /// 初始化应用：加载出题矩阵，创建 LLM 服务
    pub async fn initialize(config: Config) -> Result<Self> {
        let matrix = resolve_exam_matrix(config.matrix_file.as_deref()).await;
        log_startup(&config, matrix.len());

        let assembler = ExamAssembler::new(LlmService::new(&config), matrix)
            .with_max_retries(config.max_retries);

        Ok(App::new(&config, assembler, std::io::stdout()))
    }

    /// 运行应用主逻辑，直到用户退出
    pub async fn run(mut self) -> Result<()> {
        spawn_input_reader(self.tx.clone());
        self.render_phase()?;

        while let Some(event) = self.rx.recv().await {
            if self.handle_event(event)? == Flow::Quit {
                break;
            }
        }

        self.shutdown().await;
        info!("👋 程序结束");
        Ok(())
    }
}

impl<P, W> App<P, W>
where
    P: QuestionProvider + 'static,
    W: Write,
{
    pub fn new(config: &Config, assembler: ExamAssembler<P>, out: W) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: ExamSession::new(config.exam_settings()),
            assembler: Arc::new(assembler),
            countdown: None,
            tick_period: TICK_PERIOD,
            generation: 0,
            input_closed: false,
            tx,
            rx,
            out,
        }
    }

    /// 自定义倒计时间隔
    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }

    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn has_active_countdown(&self) -> bool {
        self.countdown.is_some()
    }

    /// 等待并处理下一个事件
    pub async fn step(&mut self) -> Result<Flow> {
        match self.rx.recv().await {
            Some(event) => self.handle_event(event),
            None => Ok(Flow::Quit),
        }
    }

    /// 取消倒计时并等待其退出
    pub async fn shutdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.stop().await;
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Result<Flow> {
        match event {
            AppEvent::Intent(intent) => self.dispatch(intent),
            AppEvent::Input(line) => self.handle_command(parse_command(&line)),
            AppEvent::InputClosed => {
                debug!("输入流已关闭");
                self.input_closed = true;
                Ok(self.flow_after_input_closed())
            }
            AppEvent::GeneratingStatus { generation, step } => {
                if self.session.phase() == ExamPhase::Generating && generation == self.generation {
                    if let Some((_, text)) = GENERATING_STEPS.get(step) {
                        writeln!(self.out, "{}", views::render_generating(text))?;
                    }
                }
                Ok(Flow::Continue)
            }
        }
    }

    /// 把意图交给状态机，执行副作用，阶段变化时重新渲染
    fn dispatch(&mut self, intent: ExamIntent) -> Result<Flow> {
        let announce_tick = matches!(intent, ExamIntent::Tick { .. });
        let selection = match &intent {
            ExamIntent::SelectOption { question_index, .. } => Some(*question_index),
            _ => None,
        };

        let previous_phase = self.session.phase();
        let previous_time = self.session.time_left();
        let settings = *self.session.settings();
        let session = std::mem::replace(&mut self.session, ExamSession::new(settings));
        let (session, effect) = session.apply(intent);
        self.session = session;

        if let Some(effect) = effect {
            self.run_effect(effect);
        }

        if self.session.phase() != previous_phase {
            self.render_phase()?;
            return Ok(self.flow_after_input_closed());
        }

        if announce_tick && self.session.time_left() != previous_time && should_announce(self.session.time_left()) {
            writeln!(self.out, "{}", views::render_timer_bar(&self.session))?;
        }

        if let Some(index) = selection {
            self.confirm_selection(index)?;
        }

        Ok(Flow::Continue)
    }

    fn run_effect(&mut self, effect: SessionEffect) {
        match effect {
            SessionEffect::BeginAssembly => self.begin_assembly(),
            SessionEffect::StartCountdown { epoch } => {
                debug!("启动倒计时 #{}", epoch);
                // 替换时旧的倒计时被 drop 并取消
                self.countdown = Some(Countdown::start(epoch, self.tick_period, self.tx.clone()));
            }
            SessionEffect::StopCountdown => {
                if let Some(countdown) = self.countdown.take() {
                    debug!("停止倒计时 #{}", countdown.epoch());
                }
            }
        }
    }

    /// 后台组卷，结果作为意图送回事件循环
    fn begin_assembly(&mut self) {
        self.generation += 1;
        let generation = self.generation;

        let assembler = Arc::clone(&self.assembler);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            info!("📝 开始组卷 (第 {} 次)", generation);
            let mut rng = StdRng::from_entropy();
            let result = assembler.generate_exam(&mut rng).await.map_err(|e| {
                error!("❌ 组卷失败: {}", e);
                e.user_message()
            });
            if tx.send(ExamIntent::GenerationFinished(result).into()).is_err() {
                warn!("事件循环已退出，丢弃组卷结果");
            }
        });

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let started = tokio::time::Instant::now();
            for (step, (offset, _)) in GENERATING_STEPS.iter().enumerate().skip(1) {
                tokio::time::sleep_until(started + *offset).await;
                if tx.send(AppEvent::GeneratingStatus { generation, step }).is_err() {
                    break;
                }
            }
        });
    }

    fn handle_command(&mut self, command: Command) -> Result<Flow> {
        if command == Command::Quit {
            return Ok(Flow::Quit);
        }

        match (self.session.phase(), command) {
            (ExamPhase::Intro, Command::Empty | Command::Start) => self.dispatch(ExamIntent::StartRequested),
            (ExamPhase::Intro, Command::Help) => self.render_phase().map(|_| Flow::Continue),

            (ExamPhase::Generating, _) => {
                writeln!(self.out, "Đang tạo đề thi, vui lòng chờ...")?;
                Ok(Flow::Continue)
            }

            (
                ExamPhase::Exam,
                Command::Select {
                    question_index,
                    option_index,
                },
            ) => {
                if question_index >= self.session.questions().len() {
                    writeln!(
                        self.out,
                        "Không có câu {} (đề có {} câu).",
                        question_index + 1,
                        self.session.questions().len()
                    )?;
                    return Ok(Flow::Continue);
                }
                self.dispatch(ExamIntent::SelectOption {
                    question_index,
                    option_index,
                })
            }
            (ExamPhase::Exam, Command::Submit) => self.dispatch(ExamIntent::Submit),
            (ExamPhase::Exam, Command::Show(None)) => self.render_phase().map(|_| Flow::Continue),
            (ExamPhase::Exam, Command::Show(Some(index))) => {
                match self.session.questions().get(index) {
                    Some(question) => {
                        let text = views::render_question(index, question, self.session.answer_for(question), false);
                        writeln!(self.out, "{}", text)?;
                    }
                    None => writeln!(self.out, "Không có câu {}.", index + 1)?,
                }
                Ok(Flow::Continue)
            }
            (ExamPhase::Exam, Command::Status) => {
                writeln!(self.out, "{}", views::render_status(&self.session))?;
                Ok(Flow::Continue)
            }
            (ExamPhase::Exam, Command::Help) => {
                writeln!(self.out, "{}", views::exam_help())?;
                Ok(Flow::Continue)
            }
            (ExamPhase::Exam, Command::Empty) => Ok(Flow::Continue),

            (ExamPhase::Result, Command::NewExam) => self.dispatch(ExamIntent::NewExam),
            (ExamPhase::Result, Command::Show(_)) => self.render_phase().map(|_| Flow::Continue),

            (phase, command) => {
                debug!("忽略命令 {:?} (当前阶段: {:?})", command, phase);
                writeln!(self.out, "Lệnh không hợp lệ. Gõ 'help' để xem hướng dẫn.")?;
                Ok(Flow::Continue)
            }
        }
    }

    fn confirm_selection(&mut self, index: usize) -> Result<()> {
        let Some(question) = self.session.questions().get(index) else {
            return Ok(());
        };
        if let Some(option) = self.session.answer_for(question) {
            writeln!(
                self.out,
                "✓ Câu {}: {}   (Đã làm: {}/{})",
                index + 1,
                crate::models::Question::option_letter(option),
                self.session.answered_count(),
                self.session.questions().len()
            )?;
        }
        Ok(())
    }

    fn render_phase(&mut self) -> Result<()> {
        let text = match self.session.phase() {
            ExamPhase::Intro => views::render_intro(&self.session),
            ExamPhase::Generating => views::render_generating(GENERATING_STEPS[0].1),
            ExamPhase::Exam => views::render_exam(&self.session),
            ExamPhase::Result => views::render_result(&self.session),
        };
        writeln!(self.out, "{}", text)?;
        self.out.flush()?;
        Ok(())
    }

    /// 输入结束后，在没有进行中的组卷或考试时退出
    fn flow_after_input_closed(&self) -> Flow {
        match (self.input_closed, self.session.phase()) {
            (true, ExamPhase::Intro | ExamPhase::Result) => Flow::Quit,
            _ => Flow::Continue,
        }
    }
}

/// 考试中定期提示剩余时间
fn should_announce(time_left: u32) -> bool {
    time_left % 600 == 0 || time_left == 300 || time_left == 60 || time_left <= 10
}

/// 用独立线程读取标准输入，避免阻塞运行时退出
fn spawn_input_reader(tx: UnboundedSender<AppEvent>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            match line {
                Ok(line) => {
                    if tx.send(AppEvent::Input(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    warn!("读取输入失败: {}", e);
                    break;
                }
            }
        }
        let _ = tx.send(AppEvent::InputClosed);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_announce() {
        assert!(should_announce(5400));
        assert!(should_announce(300));
        assert!(should_announce(7));
        assert!(!should_announce(299));
        assert!(!should_announce(61));
    }
}
