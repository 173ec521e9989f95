/// 주기 렌더링 스케줄러
/// 카운트다운 화면을 일정 주기로 다시 그리기 위한 취소 가능한 타이머.
/// 핸들(또는 스트림)이 drop되면 타이머도 멈춘다.
// region:    --- Imports
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_stream::Stream;
use tracing::debug;

// endregion: --- Imports

// region:    --- Render Ticker
pub struct RenderTicker;

impl RenderTicker {
    /// 주기마다 tick 실행. 이전 tick이 끝나기 전에는 다음 tick을 시작하지 않는다
    pub fn start<F, Fut>(period: Duration, mut tick: F) -> TickerHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        let period = period.max(Duration::from_millis(1));

        let join = tokio::spawn(async move {
            let mut interval = interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    // 취소 신호 또는 sender drop
                    _ = &mut cancel_rx => break,
                    _ = interval.tick() => tick().await,
                }
            }
            debug!("{:<12} --> 렌더 타이머 종료", "Scheduler");
        });

        TickerHandle {
            cancel: Some(cancel_tx),
            join: Some(join),
        }
    }

    /// 주기마다 render 결과를 내보내는 스트림. None이면 그 주기는 건너뛴다
    pub fn stream<F, Fut, T>(period: Duration, mut render: F) -> TickerStream<T>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Option<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, receiver) = mpsc::channel(1);
        let ticker = Self::start(period, move || {
            let tx = tx.clone();
            let frame = render();
            async move {
                if let Some(frame) = frame.await {
                    // 수신자가 사라진 경우는 스트림 drop과 함께 타이머도 멈춘다
                    let _ = tx.send(frame).await;
                }
            }
        });
        TickerStream {
            receiver,
            _ticker: ticker,
        }
    }
}

// endregion: --- Render Ticker

// region:    --- Ticker Handle
pub struct TickerHandle {
    cancel: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl TickerHandle {
    /// 타이머를 멈추고 진행 중인 tick이 끝날 때까지 기다린다
    pub async fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

// endregion: --- Ticker Handle

// region:    --- Ticker Stream
pub struct TickerStream<T> {
    receiver: mpsc::Receiver<T>,
    _ticker: TickerHandle,
}

impl<T> Stream for TickerStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

// endregion: --- Ticker Stream
