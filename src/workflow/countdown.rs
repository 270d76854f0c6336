//! 考试倒计时
//!
//! 每场考试一个后台任务，每秒发送一次 `Tick { epoch }`。
//! 离开考试阶段时取消；被 drop 时同样取消，旧任务不会再发送跳动。

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::workflow::exam_session::ExamIntent;

/// 默认跳动间隔
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// 绑定在一场考试上的可取消周期任务
pub struct Countdown {
    epoch: u64,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Countdown {
    /// 启动倒计时，第一次跳动在一个周期之后
    pub fn start<E>(epoch: u64, period: Duration, tx: UnboundedSender<E>) -> Self
    where
        E: From<ExamIntent> + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = child.cancelled() => break,
                    _ = interval.tick() => {
                        if tx.send(ExamIntent::Tick { epoch }.into()).is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("倒计时 #{} 已停止", epoch);
        });

        Self {
            epoch,
            token,
            handle: Some(handle),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 取消并等待任务退出
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("⚠️ 倒计时任务异常退出 (epoch {}): {}", self.epoch, e);
            }
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
