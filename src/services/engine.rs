//! Analytics Task Engine
//!
//! Bounded task queue plus a fixed pool of workers that compute metrics and
//! run market-data refresh passes against the portfolio store. Results are
//! delivered through per-task callbacks; errors are never raised out of a
//! worker.

use crate::config::EngineConfig;
use crate::error::{AnalyticsError, Result};
use crate::provider::MarketDataProvider;
use crate::services::PortfolioStore;
use crate::types::{AnalyticsTask, TaskCallback, TaskKind, TaskOutput};
use std::sync::{Arc, RwLock};
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, info, warn};

/// Concurrent analytics engine over a shared portfolio store.
///
/// Lifecycle is Stopped -> Running -> Stopped. `queue_task` never blocks:
/// a full queue rejects the task immediately and retry policy is the
/// caller's. `stop` only prevents further dispatch — tasks a worker has
/// already pulled run to completion on their own schedule.
pub struct AnalyticsEngine {
    store: Arc<PortfolioStore>,
    provider: Arc<dyn MarketDataProvider>,
    config: EngineConfig,
    queue_tx: mpsc::Sender<AnalyticsTask>,
    /// Shared by all workers; each takes the lock only long enough to pull
    /// one task.
    queue_rx: Arc<Mutex<mpsc::Receiver<AnalyticsTask>>>,
    shutdown_tx: broadcast::Sender<()>,
    running: RwLock<bool>,
}

impl AnalyticsEngine {
    /// Create a stopped engine. Call [`start`](Self::start) to spawn workers.
    ///
    /// A configured queue capacity of 0 is treated as 1: the channel
    /// requires a positive bound, and a misread env var should not panic a
    /// constructor.
    pub fn new(
        store: Arc<PortfolioStore>,
        provider: Arc<dyn MarketDataProvider>,
        config: EngineConfig,
    ) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_capacity.max(1));
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            store,
            provider,
            config,
            queue_tx,
            queue_rx: Arc::new(Mutex::new(queue_rx)),
            shutdown_tx,
            running: RwLock::new(false),
        }
    }

    /// The store this engine computes against.
    pub fn store(&self) -> Arc<PortfolioStore> {
        Arc::clone(&self.store)
    }

    /// Whether the engine is accepting tasks.
    pub fn is_running(&self) -> bool {
        *self.running.read().unwrap()
    }

    /// Start the worker pool.
    pub fn start(&self) -> Result<()> {
        if self.config.workers == 0 {
            // An engine with no workers would accept tasks that never run.
            return Err(AnalyticsError::InvalidArgument(
                "worker count must be at least 1".to_string(),
            ));
        }

        let mut running = self.running.write().unwrap();
        if *running {
            return Err(AnalyticsError::AlreadyRunning);
        }
        *running = true;

        info!(workers = self.config.workers, "starting analytics engine");
        for worker_id in 0..self.config.workers {
            let store = Arc::clone(&self.store);
            let provider = Arc::clone(&self.provider);
            let queue_rx = Arc::clone(&self.queue_rx);
            let shutdown_rx = self.shutdown_tx.subscribe();
            tokio::spawn(worker_loop(worker_id, store, provider, queue_rx, shutdown_rx));
        }

        Ok(())
    }

    /// Signal all workers to exit. No-op when already stopped. In-flight
    /// tasks are neither awaited nor cancelled.
    pub fn stop(&self) {
        let mut running = self.running.write().unwrap();
        if !*running {
            return;
        }
        *running = false;

        info!("stopping analytics engine");
        let _ = self.shutdown_tx.send(());
    }

    /// Enqueue a task for asynchronous processing. Fails fast: `NotRunning`
    /// when stopped, `QueueFull` when the bounded queue has no room.
    pub fn queue_task(
        &self,
        kind: TaskKind,
        portfolio_id: impl Into<String>,
        callback: TaskCallback,
    ) -> Result<()> {
        if !self.is_running() {
            return Err(AnalyticsError::NotRunning);
        }

        let task = AnalyticsTask {
            kind,
            portfolio_id: portfolio_id.into(),
            callback,
        };

        self.queue_tx.try_send(task).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => AnalyticsError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => AnalyticsError::NotRunning,
        })
    }
}

/// One worker: pull tasks until shutdown, dispatch, deliver via callback.
async fn worker_loop(
    worker_id: usize,
    store: Arc<PortfolioStore>,
    provider: Arc<dyn MarketDataProvider>,
    queue_rx: Arc<Mutex<mpsc::Receiver<AnalyticsTask>>>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    debug!(worker_id, "analytics worker started");
    loop {
        let task = tokio::select! {
            _ = shutdown_rx.recv() => break,
            task = async { queue_rx.lock().await.recv().await } => match task {
                Some(task) => task,
                None => break,
            },
        };

        debug!(worker_id, kind = %task.kind, portfolio_id = %task.portfolio_id, "running task");
        let result = run_task(&store, provider.as_ref(), task.kind, &task.portfolio_id).await;
        if let Err(err) = &result {
            debug!(worker_id, portfolio_id = %task.portfolio_id, %err, "task failed");
        }
        (task.callback)(result);
    }
    debug!(worker_id, "analytics worker exited");
}

async fn run_task(
    store: &PortfolioStore,
    provider: &dyn MarketDataProvider,
    kind: TaskKind,
    portfolio_id: &str,
) -> Result<TaskOutput> {
    match kind {
        TaskKind::Performance => store
            .performance_metrics(portfolio_id)
            .map(TaskOutput::Performance),
        TaskKind::Risk => store.risk_metrics(portfolio_id).map(TaskOutput::Risk),
        TaskKind::UpdatePrices => refresh_prices(store, provider, portfolio_id)
            .await
            .map(|_| TaskOutput::PricesRefreshed),
        TaskKind::UpdateGreeks => refresh_greeks(store, provider, portfolio_id)
            .await
            .map(|_| TaskOutput::GreeksRefreshed),
    }
}

/// Pull current prices for every open position in a portfolio.
///
/// Best-effort contract: provider calls run sequentially and the pass
/// aborts on the first failure. Prices fetched before the failure are still
/// applied (and the caches evicted); later positions keep their stale
/// prices. No lock is held across provider calls.
pub(crate) async fn refresh_prices(
    store: &PortfolioStore,
    provider: &dyn MarketDataProvider,
    portfolio_id: &str,
) -> Result<()> {
    let open = store.open_positions(portfolio_id)?;

    let mut updates = Vec::with_capacity(open.len());
    let mut first_err = None;
    for position in &open {
        match provider.current_price(&position.symbol, &position.exchange).await {
            Ok(price) => updates.push((position.id.clone(), price)),
            Err(err) => {
                warn!(portfolio_id, symbol = %position.symbol, %err, "price refresh aborted");
                first_err = Some(err);
                break;
            }
        }
    }

    if let Some(err) = first_err {
        if !updates.is_empty() {
            store.apply_prices(portfolio_id, &updates)?;
        }
        return Err(err);
    }

    store.apply_prices(portfolio_id, &updates)?;
    debug!(portfolio_id, count = updates.len(), "refreshed position prices");
    Ok(())
}

/// Pull Greeks for every open option position in a portfolio.
///
/// Same sequential, abort-on-first-failure contract as
/// [`refresh_prices`]; positions without complete option descriptors are
/// skipped. Only the risk cache is evicted.
pub(crate) async fn refresh_greeks(
    store: &PortfolioStore,
    provider: &dyn MarketDataProvider,
    portfolio_id: &str,
) -> Result<()> {
    let open = store.open_positions(portfolio_id)?;

    let mut updates = Vec::new();
    let mut first_err = None;
    for position in &open {
        if !position.is_option() {
            continue;
        }
        let (Some(strike), Some(expiry), Some(kind)) = (
            position.strike_price,
            position.expiry_date,
            position.option_kind,
        ) else {
            continue;
        };

        match provider
            .greeks(&position.symbol, &position.exchange, strike, expiry, kind)
            .await
        {
            Ok(greeks) => updates.push((position.id.clone(), greeks)),
            Err(err) => {
                warn!(portfolio_id, symbol = %position.symbol, %err, "greeks refresh aborted");
                first_err = Some(err);
                break;
            }
        }
    }

    if let Some(err) = first_err {
        if !updates.is_empty() {
            store.apply_greeks(portfolio_id, &updates)?;
        }
        return Err(err);
    }

    store.apply_greeks(portfolio_id, &updates)?;
    debug!(portfolio_id, count = updates.len(), "refreshed position greeks");
    Ok(())
}
