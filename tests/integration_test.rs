use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use math_exam_trainer::error::AppError;
use math_exam_trainer::models::{
    DifficultyDistribution, ExamMatrixEntry, QuestionBatch, RawQuestion, TopicCategory,
};
use math_exam_trainer::orchestrator::{App, AppEvent, Flow};
use math_exam_trainer::{AppResult, Config, ExamAssembler, ExamPhase, Question, QuestionProvider};

/// 测试用出题器
struct FakeProvider {
    fail_all: bool,
    credentials: bool,
}

impl FakeProvider {
    fn ok() -> Self {
        Self {
            fail_all: false,
            credentials: true,
        }
    }
}

#[async_trait]
impl QuestionProvider for FakeProvider {
    fn check_credentials(&self) -> AppResult<()> {
        if self.credentials {
            Ok(())
        } else {
            Err(AppError::MissingCredential)
        }
    }

    async fn generate_questions(&self, entry: &ExamMatrixEntry) -> anyhow::Result<QuestionBatch> {
        if self.fail_all {
            return Err(anyhow!("quota exceeded"));
        }
        let questions = (0..entry.count)
            .map(|i| RawQuestion {
                topic: entry.topics.first().cloned(),
                difficulty: Some("Nhận biết".to_string()),
                content: format!("{} câu {}", entry.category, i + 1).into(),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_answer: Some((i % 4) as i64),
                explanation: Some("Lời giải".to_string()),
                solution_method2: None,
                geometry_svg: None,
            })
            .collect();
        Ok(QuestionBatch { questions })
    }
}

fn small_matrix() -> Vec<ExamMatrixEntry> {
    [TopicCategory::Algebra, TopicCategory::Geometry, TopicCategory::Statistics]
        .into_iter()
        .map(|category| ExamMatrixEntry {
            category,
            count: 1,
            topics: vec![format!("{} topic", category.code())],
            difficulty: DifficultyDistribution { nb: 1, th: 0, vd: 0 },
        })
        .collect()
}

fn test_config(duration: u32) -> Config {
    Config {
        llm_api_key: Some("test-key".to_string()),
        exam_duration_seconds: duration,
        total_questions: 3,
        ..Config::default()
    }
}

fn app_with(provider: FakeProvider, duration: u32) -> App<FakeProvider, Vec<u8>> {
    let assembler = ExamAssembler::new(provider, small_matrix());
    App::new(&test_config(duration), assembler, Vec::new())
}

fn output(app: &App<FakeProvider, Vec<u8>>) -> String {
    String::from_utf8_lossy(app.output()).to_string()
}

fn input(app: &mut App<FakeProvider, Vec<u8>>, line: &str) -> Flow {
    app.handle_event(AppEvent::Input(line.to_string())).unwrap()
}

async fn run_while(app: &mut App<FakeProvider, Vec<u8>>, phase: ExamPhase) {
    while app.session().phase() == phase {
        app.step().await.unwrap();
    }
}

/// 处理剩余事件，直到一段时间内没有新事件
async fn drain(app: &mut App<FakeProvider, Vec<u8>>) {
    while let Ok(result) = tokio::time::timeout(Duration::from_secs(30), app.step()).await {
        result.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_exam_with_timer_expiry() {
    let mut app = app_with(FakeProvider::ok(), 3);

    input(&mut app, "start");
    assert_eq!(app.session().phase(), ExamPhase::Generating);

    run_while(&mut app, ExamPhase::Generating).await;
    assert_eq!(app.session().phase(), ExamPhase::Exam);
    assert_eq!(app.session().questions().len(), 3);
    assert_eq!(app.session().time_left(), 3);
    assert!(app.has_active_countdown());

    // 第 1 题答对，第 2 题答错，第 3 题不答
    let first = app.session().questions()[0].clone();
    let second = app.session().questions()[1].clone();
    let wrong = (second.correct_answer + 1) % 4;
    input(&mut app, &format!("1 {}", Question::option_letter(first.correct_answer)));
    input(&mut app, &format!("2 {}", Question::option_letter(wrong)));
    assert_eq!(app.session().answered_count(), 2);

    run_while(&mut app, ExamPhase::Exam).await;
    assert_eq!(app.session().phase(), ExamPhase::Result);
    assert_eq!(app.session().time_left(), 0);
    assert_eq!(app.session().correct_count(), 1);
    assert_eq!(app.session().score(), 0.2);
    assert!(!app.has_active_countdown());

    // 时间继续流逝也不会再次提交
    let frozen = app.session().clone();
    drain(&mut app).await;
    assert_eq!(app.session(), &frozen);

    let text = output(&app);
    assert!(text.contains("Bài thi trắc nghiệm"));
    assert!(text.contains("Điểm số của bạn: 0.20 / 0.6"));
    assert_eq!(text.matches("Điểm số của bạn").count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_submit_then_new_exam() {
    let mut app = app_with(FakeProvider::ok(), 600);

    input(&mut app, "");
    run_while(&mut app, ExamPhase::Generating).await;
    let first_epoch = app.session().epoch();

    input(&mut app, "submit");
    assert_eq!(app.session().phase(), ExamPhase::Result);
    assert_eq!(app.session().score(), 0.0);
    assert!(!app.has_active_countdown());

    // 结果页再次提交无效
    input(&mut app, "submit");
    assert_eq!(app.session().phase(), ExamPhase::Result);

    input(&mut app, "new");
    assert_eq!(app.session().phase(), ExamPhase::Intro);
    assert!(app.session().questions().is_empty());

    input(&mut app, "start");
    run_while(&mut app, ExamPhase::Generating).await;
    assert_eq!(app.session().phase(), ExamPhase::Exam);
    assert_eq!(app.session().epoch(), first_epoch + 1);
    assert_eq!(app.session().time_left(), 600);
    assert_eq!(app.session().answered_count(), 0);

    app.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_all_categories_failing_returns_to_intro() {
    let provider = FakeProvider {
        fail_all: true,
        credentials: true,
    };
    let mut app = app_with(provider, 60);

    input(&mut app, "start");
    run_while(&mut app, ExamPhase::Generating).await;

    assert_eq!(app.session().phase(), ExamPhase::Intro);
    assert!(app.session().error().is_some());
    assert!(!app.has_active_countdown());
    assert!(output(&app).contains("Không thể tạo đề thi"));
}

#[tokio::test(start_paused = true)]
async fn test_missing_credential_returns_to_intro() {
    let provider = FakeProvider {
        fail_all: false,
        credentials: false,
    };
    let mut app = app_with(provider, 60);

    input(&mut app, "start");
    run_while(&mut app, ExamPhase::Generating).await;

    assert_eq!(app.session().phase(), ExamPhase::Intro);
    assert!(app.session().error().unwrap_or_default().contains("API Key"));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_selection_is_reported() {
    let mut app = app_with(FakeProvider::ok(), 60);
    input(&mut app, "start");
    run_while(&mut app, ExamPhase::Generating).await;

    input(&mut app, "9 A");
    assert_eq!(app.session().answered_count(), 0);
    assert!(output(&app).contains("Không có câu 9"));

    input(&mut app, "xyz");
    assert!(output(&app).contains("Lệnh không hợp lệ"));

    app.shutdown().await;
}

#[tokio::test]
async fn test_input_closed_in_intro_quits() {
    let mut app = app_with(FakeProvider::ok(), 60);
    assert_eq!(app.handle_event(AppEvent::InputClosed).unwrap(), Flow::Quit);
    assert_eq!(input(&mut app, "quit"), Flow::Quit);
}
