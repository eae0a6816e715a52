// src/downloader/mod.rs

mod namer;
mod task_runner;
pub mod transfer;

pub use namer::FileNamer;

use crate::{
    client::DiskClient,
    error::{AppError, AppResult},
    models::{DownloadOutcome, OutcomeStatus, Progress, RunEvent, RunSummary, ShareLink},
    resolver::{LinkResolver, YandexResolver},
};
use anyhow::anyhow;
use itertools::Itertools;
use log::{error, info};
use std::{
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

/// 一次运行内的计数器与结果列表，所有 worker 共享。
#[derive(Clone)]
pub struct RunStats {
    progress: Arc<Mutex<Progress>>,
    outcomes: Arc<Mutex<Vec<DownloadOutcome>>>,
}

impl RunStats {
    pub fn new(total: usize) -> Self {
        Self {
            progress: Arc::new(Mutex::new(Progress {
                total,
                ..Default::default()
            })),
            outcomes: Arc::new(Mutex::new(Vec::with_capacity(total))),
        }
    }

    /// 记录一个结果并返回更新后的进度快照
    pub fn record(&self, outcome: DownloadOutcome) -> Progress {
        let snapshot = {
            let mut progress = self.progress.lock().unwrap_or_else(PoisonError::into_inner);
            progress.completed += 1;
            if outcome.is_success() {
                progress.successes += 1;
            } else {
                progress.failures += 1;
            }
            *progress
        };
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(outcome);
        snapshot
    }

    pub fn snapshot(&self) -> Progress {
        *self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn summarize(&self, cancel_requested: bool) -> RunSummary {
        let progress = self.snapshot();
        let outcomes = self
            .outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let interrupted = progress.completed < progress.total
            || outcomes.iter().any(|o| o.status == OutcomeStatus::Cancelled);
        RunSummary {
            total: progress.total,
            attempted: progress.completed,
            successes: progress.successes,
            failures: progress.failures,
            cancelled: cancel_requested && interrupted,
            outcomes,
        }
    }
}

/// 传递给每个处理步骤的运行上下文
#[derive(Clone)]
pub(crate) struct RunContext {
    pub http_client: Arc<DiskClient>,
    pub resolver: Arc<dyn LinkResolver>,
    pub namer: Arc<FileNamer>,
    pub stats: RunStats,
    pub destination: Arc<PathBuf>,
    pub cancel: CancellationToken,
    pub events: UnboundedSender<RunEvent>,
    pub max_workers: usize,
    pub item_delay: Duration,
}

/// 下载流水线。同一时间只允许一次运行：`Idle -> Running -> Idle`。
pub struct Pipeline {
    http_client: Arc<DiskClient>,
    resolver: Arc<dyn LinkResolver>,
    running: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new(http_client: Arc<DiskClient>) -> Self {
        let resolver = Arc::new(YandexResolver::new(http_client.clone()));
        Self::with_resolver(http_client, resolver)
    }

    pub fn with_resolver(http_client: Arc<DiskClient>, resolver: Arc<dyn LinkResolver>) -> Self {
        Self {
            http_client,
            resolver,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// 开始一次运行。必须在 tokio 运行时中调用。
    ///
    /// 重复的链接只处理一次。保存目录不存在时会先创建；创建失败则不处理任何链接。
    pub fn start_run(
        &self,
        links: Vec<ShareLink>,
        destination: &Path,
        cancel: CancellationToken,
    ) -> AppResult<RunHandle> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AppError::AlreadyRunning);
        }
        let guard = RunningGuard(self.running.clone());

        let destination = prepare_destination(destination)?;
        let links: Vec<ShareLink> = links.into_iter().unique().collect();
        info!("文件将保存到目录: \"{}\"", destination.display());

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let stats = RunStats::new(links.len());
        let config = self.http_client.config();
        let context = RunContext {
            http_client: self.http_client.clone(),
            resolver: self.resolver.clone(),
            namer: Arc::new(FileNamer::new()),
            stats: stats.clone(),
            destination: Arc::new(destination.clone()),
            cancel: cancel.clone(),
            events: events_tx,
            max_workers: config.max_workers.max(1),
            item_delay: config.item_delay,
        };

        let join = tokio::spawn(async move {
            let _guard = guard;
            task_runner::execute_links(context, links).await
        });

        Ok(RunHandle {
            cancel,
            stats,
            destination,
            events: Some(events_rx),
            join,
        })
    }
}

/// 运行结束（包括 panic）时把流水线恢复为空闲状态
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn prepare_destination(dir: &Path) -> AppResult<PathBuf> {
    let to_error = |source| {
        error!("无法准备保存目录 {:?}: {}", dir, source);
        AppError::DestinationCreate {
            path: dir.to_path_buf(),
            source,
        }
    };
    std::fs::create_dir_all(dir).map_err(to_error)?;
    dunce::canonicalize(dir).map_err(to_error)
}

/// 正在进行的一次运行
pub struct RunHandle {
    cancel: CancellationToken,
    stats: RunStats,
    destination: PathBuf,
    events: Option<UnboundedReceiver<RunEvent>>,
    join: JoinHandle<RunSummary>,
}

impl RunHandle {
    pub fn cancel(&self) {
        info!("收到取消请求");
        self.cancel.cancel();
    }

    pub fn progress(&self) -> Progress {
        self.stats.snapshot()
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// 取出事件接收端，只能取一次
    pub fn take_events(&mut self) -> Option<UnboundedReceiver<RunEvent>> {
        self.events.take()
    }

    pub async fn wait(self) -> AppResult<RunSummary> {
        self.join
            .await
            .map_err(|e| AppError::Other(anyhow!("下载任务异常终止: {}", e)))
    }
}
