mod task_atomics;

pub(crate) use task_atomics::Sample;

use crate::transaction::TRANSACTION_HOOK;
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use task_atomics::TaskAtomics;
use tokio::task::JoinHandle;
use tracing::{debug_span, error, trace, warn, Instrument};

struct VirtualUser {
    handle: JoinHandle<()>,
    running: Arc<AtomicBool>,
}

/// The set of virtual users currently executing a scenario.
///
/// Each VU runs the scenario function in a loop until told to stop. Stopped VUs are not aborted,
/// they are left to finish their current iteration and are tracked as retiring until they exit.
pub(crate) struct VirtualUserPool<T> {
    scenario: T,
    active: Vec<VirtualUser>,
    retiring: Vec<JoinHandle<()>>,
    task_atomics: TaskAtomics,
    next_id: u64,
}

impl<T, F> VirtualUserPool<T>
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = ()> + Send + 'static,
{
    pub fn new(scenario: T, rps: Option<NonZeroU32>) -> Self {
        Self {
            scenario,
            active: vec![],
            retiring: vec![],
            task_atomics: TaskAtomics::new(rps),
            next_id: 0,
        }
    }

    pub async fn set_vus(&mut self, vus: usize) {
        self.retiring.retain(|handle| !handle.is_finished());

        let (alive, dead): (Vec<_>, Vec<_>) = self
            .active
            .drain(..)
            .partition(|vu| !vu.handle.is_finished());
        self.active = alive;
        for vu in dead {
            match vu.handle.await {
                Err(err) => error!("Virtual user died, replacing it: {err}"),
                Ok(()) => warn!("Virtual user exited while active, replacing it."),
            }
        }

        if self.active.len() == vus {
            return;
        }

        trace!("Adjusting VUs {} -> {vus}", self.active.len());
        if self.active.len() > vus {
            for vu in self.active.drain(vus..) {
                vu.running.store(false, Ordering::Relaxed);
                self.retiring.push(vu.handle);
            }
        } else {
            while self.active.len() < vus {
                let vu = self.spawn_vu();
                self.active.push(vu);
            }
        }
    }

    fn spawn_vu(&mut self) -> VirtualUser {
        let id = self.next_id;
        self.next_id += 1;

        let scenario = self.scenario.clone();
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let transaction_data = self.task_atomics.clone_to_transaction_data();
        let iterations = self.task_atomics.iteration_counter();

        let handle = tokio::spawn(
            TRANSACTION_HOOK
                .scope(transaction_data, async move {
                    while flag.load(Ordering::Relaxed) {
                        scenario().await;
                        iterations.fetch_add(1, Ordering::Relaxed);
                        // NOTE: Scenarios which never await would otherwise starve the controller.
                        tokio::task::yield_now().await;
                    }
                })
                .instrument(debug_span!("vu", id)),
        );

        VirtualUser { handle, running }
    }

    /// Number of VUs accepting new iterations.
    pub fn vus(&self) -> usize {
        self.active.len()
    }

    /// Number of VUs still running an iteration, including those ramping down.
    pub fn in_flight(&self) -> usize {
        self.active.len() + self.retiring.iter().filter(|h| !h.is_finished()).count()
    }

    pub fn collect(&self) -> Sample {
        self.task_atomics.collect()
    }

    /// Stop every VU, give in-flight iterations `grace` to complete, and abort the rest.
    ///
    /// Returns the number of aborted iterations.
    pub async fn shutdown(&mut self, grace: Duration) -> u64 {
        self.set_vus(0).await;
        let mut handles: Vec<_> = self.retiring.drain(..).collect();

        let drained = tokio::time::timeout(grace, async {
            for handle in handles.iter_mut() {
                if let Err(err) = handle.await {
                    if err.is_panic() {
                        error!("Virtual user panicked: {err}");
                    }
                }
            }
        })
        .await;

        if drained.is_ok() {
            return 0;
        }

        let mut interrupted = 0;
        for handle in handles {
            if !handle.is_finished() {
                handle.abort();
                interrupted += 1;
            }
        }
        warn!(
            "{interrupted} iterations did not finish within {} and were interrupted.",
            humantime::format_duration(grace)
        );
        interrupted
    }
}
