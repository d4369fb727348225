use anyhow::Result;
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock, Weak};
use std::thread;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

pub const FLUSH_PERIOD: Duration = Duration::from_secs(1);

pub trait Flushable: Send + Sync {
    /// Called once per period. Writes out bytes that have been pending for a whole period.
    fn tick(&self) -> Result<()>;

    fn flush(&self) -> Result<()>;
}

/// Streams that the periodic flush job visits. Members are held weakly.
#[derive(Default)]
pub struct FlushRegistry {
    members: Mutex<Vec<Weak<dyn Flushable>>>,
}

impl FlushRegistry {
    /// The registry every encoder joins. Its job thread starts on first use.
    pub fn global() -> &'static Arc<FlushRegistry> {
        static GLOBAL: OnceLock<Arc<FlushRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Self::spawn(FLUSH_PERIOD))
    }

    /// Starts a job thread that ticks the new registry until the registry is dropped.
    pub fn spawn(period: Duration) -> Arc<Self> {
        let registry = Arc::new(Self::default());

        let job = PeriodicFlushJob {
            registry: Arc::downgrade(&registry),
            period,
        };
        let res = thread::Builder::new()
            .name(String::from("binlog-flush"))
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                {
                    Err(e) => {
                        tracing::error!(error = %e, "Cannot start the periodic flush runtime.");
                        return;
                    }
                    Ok(rt) => rt,
                };
                rt.block_on(job.run());
            });
        if let Err(e) = res {
            tracing::error!(error = %e, "Cannot spawn the periodic flush thread.");
        }

        registry
    }

    pub fn register(&self, member: Weak<dyn Flushable>) {
        self.members.lock().push(member);
    }

    fn live_members(&self) -> Vec<Arc<dyn Flushable>> {
        let mut members = self.members.lock();
        members.retain(|member| member.strong_count() > 0);
        members.iter().filter_map(Weak::upgrade).collect()
    }

    pub fn tick_all(&self) {
        // The registry lock is not held while members take their own locks.
        for member in self.live_members() {
            if let Err(e) = member.tick() {
                tracing::warn!(error = ?e, "Periodic flush failed.");
            }
        }
    }

    pub fn flush_all(&self) {
        for member in self.live_members() {
            if let Err(e) = member.flush() {
                tracing::warn!(error = ?e, "Flush failed.");
            }
        }
    }

    pub fn member_count(&self) -> usize {
        self.live_members().len()
    }
}

struct PeriodicFlushJob {
    registry: Weak<FlushRegistry>,
    period: Duration,
}

impl PeriodicFlushJob {
    async fn run(self) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match self.registry.upgrade() {
                None => break,
                Some(registry) => registry.tick_all(),
            }
        }

        tracing::debug!("Periodic flush job is exiting.");
    }
}
