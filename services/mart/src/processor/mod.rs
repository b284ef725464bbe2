//! Order Processor: polls Accrual for each pending order and settles the
//! result into the owning user's balance.

use std::sync::Arc;

use gophermart_core::accrual_client::{AccrualClient, AccrualStatus};
use gophermart_core::error::AccrualClientError;
use gophermart_core::queue::Fifo;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::db::Store;
use crate::models::{Order, OrderStatus};

const WORKER_COUNT: usize = 2;

/// Worker pool that drains a FIFO of pending orders against the Accrual
/// client, one poll per dequeue, re-enqueuing until an order reaches a
/// terminal status.
///
/// `workers` sits behind a `Mutex` so `close` only needs `&self`: the
/// processor is shared through the same `Arc<AppState>` as every handler,
/// and shutdown has no exclusive handle to reach for.
pub struct Processor {
    queue: Arc<Fifo<Order>>,
    token: CancellationToken,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Processor {
    /// Spawns the worker pool. `start` is separate from `new` so callers
    /// can seed the queue (e.g. a boot-time rescan) before workers start
    /// draining it — though since enqueue never blocks that ordering
    /// isn't required for correctness, only for clean logs.
    pub fn start(store: Arc<Store>, client: Arc<dyn AccrualClient>) -> Self {
        let queue = Arc::new(Fifo::new());
        let token = CancellationToken::new();

        let mut workers = Vec::with_capacity(WORKER_COUNT);
        for _ in 0..WORKER_COUNT {
            let queue = Arc::clone(&queue);
            let store = Arc::clone(&store);
            let client = Arc::clone(&client);
            let token = token.clone();
            workers.push(tokio::spawn(run_worker(queue, store, client, token)));
        }

        Processor { queue, token, workers: Mutex::new(workers) }
    }

    /// Enqueues an order for polling. Callers persist the order at `NEW`
    /// before calling this.
    pub async fn submit(&self, order: Order) {
        if self.queue.enqueue(&self.token, order).await.is_err() {
            debug!("submit called after close; order dropped");
        }
    }

    /// Signals all workers to stop and blocks until they exit. Idempotent.
    pub async fn close(&self) {
        if self.token.is_cancelled() {
            return;
        }
        self.token.cancel();
        let mut workers = self.workers.lock().await;
        for handle in workers.drain(..) {
            let _ = handle.await;
        }
    }
}

async fn run_worker(
    queue: Arc<Fifo<Order>>,
    store: Arc<Store>,
    client: Arc<dyn AccrualClient>,
    token: CancellationToken,
) {
    loop {
        let order = match queue.dequeue(&token).await {
            Ok(order) => order,
            Err(_) => break,
        };

        match try_process_order(&store, &client, &token, order).await {
            Ok(Some(order)) => {
                if queue.enqueue(&token, order).await.is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(ProcessOutcome::Canceled) => break,
            Err(ProcessOutcome::Requeue(order, err)) => {
                debug!(error = %err, "order processing deferred, re-enqueuing");
                if queue.enqueue(&token, order).await.is_err() {
                    break;
                }
            }
            Err(ProcessOutcome::Dropped(number, err)) => {
                warn!(order = %number, error = %err, "order dropped by accrual, staying at NEW");
            }
        }
    }
}

enum ProcessOutcome {
    Canceled,
    Requeue(Order, AccrualClientError),
    Dropped(String, AccrualClientError),
}

/// One poll-and-react cycle. Returns `Ok(Some(order))` to re-enqueue
/// (possibly mutated), `Ok(None)` once the order has reached a terminal
/// status, or an error variant describing how to react.
async fn try_process_order(
    store: &Store,
    client: &Arc<dyn AccrualClient>,
    token: &CancellationToken,
    mut order: Order,
) -> Result<Option<Order>, ProcessOutcome> {
    let info = match client.get_accrual_info(token, &order.number).await {
        Ok(info) => info,
        Err(AccrualClientError::ResourceExhausted { retry_after, .. }) => {
            tokio::select! {
                _ = token.cancelled() => return Err(ProcessOutcome::Canceled),
                _ = tokio::time::sleep(retry_after) => {}
            }
            return Ok(Some(order));
        }
        Err(AccrualClientError::OrderNotRegistered) => {
            return Err(ProcessOutcome::Dropped(order.number, AccrualClientError::OrderNotRegistered));
        }
        Err(AccrualClientError::Canceled) => return Err(ProcessOutcome::Canceled),
        Err(err @ (AccrualClientError::InternalServerError | AccrualClientError::Other(_))) => {
            return Err(ProcessOutcome::Requeue(order, err));
        }
    };

    match info.status {
        AccrualStatus::Unknown => Ok(Some(order)),
        AccrualStatus::Invalid => {
            match store.update_order_status(order.id, OrderStatus::Invalid).await {
                Ok(()) => Ok(None),
                Err(e) => Err(ProcessOutcome::Requeue(order, AccrualClientError::Other(e.into()))),
            }
        }
        AccrualStatus::Registered | AccrualStatus::Processing => {
            if order.status == OrderStatus::New {
                match store.update_order_status(order.id, OrderStatus::Processing).await {
                    Ok(()) => {
                        order.status = OrderStatus::Processing;
                        Ok(Some(order))
                    }
                    Err(e) => Err(ProcessOutcome::Requeue(order, AccrualClientError::Other(e.into()))),
                }
            } else {
                Ok(Some(order))
            }
        }
        AccrualStatus::Processed => {
            match store.process_order(order.user_id, order.id, info.accrual).await {
                Ok(()) => Ok(None),
                Err(e) => Err(ProcessOutcome::Requeue(order, AccrualClientError::Other(e.into()))),
            }
        }
    }
}
