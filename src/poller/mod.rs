pub mod dispatch;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use poise::serenity_prelude as serenity;
use tokio::sync::watch;

use crate::bot::Data;
use crate::sources::{self, Item, Source};
use crate::store::ConfigStore;

/// Outcome of a single poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    /// The tick ran; number of channel deliveries made.
    Delivered(usize),
    /// A tick for this source was already in flight; nothing was done.
    InFlight,
    /// The tick started but aborted on an error; details are in the logs.
    Failed,
}

/// Runtime controls for one source's poll loop.
pub struct PollerHandle {
    enabled: AtomicBool,
    in_flight: AtomicBool,
    period: watch::Sender<Duration>,
}

impl PollerHandle {
    fn new(period: Duration) -> Self {
        Self {
            enabled: AtomicBool::new(true),
            in_flight: AtomicBool::new(false),
            period: watch::channel(period).0,
        }
    }

    pub fn period(&self) -> Duration {
        *self.period.borrow()
    }

    /// The wait in progress restarts with the new period, so the next tick
    /// fires a full period after the change, never sooner.
    pub fn set_period(&self, period: Duration) {
        self.period.send_replace(period);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Claims the in-flight slot. False means a tick is already running.
    fn try_begin_tick(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn end_tick(&self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }

    fn subscribe(&self) -> watch::Receiver<Duration> {
        self.period.subscribe()
    }
}

pub struct Pollers {
    handles: HashMap<Source, PollerHandle>,
    started: AtomicBool,
}

impl Pollers {
    /// Seeds each source's period from the stored interval config.
    pub fn new(store: &ConfigStore) -> Self {
        let handles = Source::ALL
            .iter()
            .map(|&source| {
                let secs = store.interval_for(source).unwrap_or_else(|e| {
                    tracing::warn!(
                        source = source.key(),
                        error = %e,
                        "falling back to default interval"
                    );
                    source.default_interval_secs()
                });
                (source, PollerHandle::new(Duration::from_secs(secs)))
            })
            .collect();
        Self {
            handles,
            started: AtomicBool::new(false),
        }
    }

    pub fn handle(&self, source: Source) -> &PollerHandle {
        &self.handles[&source]
    }

    /// Spawns one poll loop per source. Safe to call on every Ready event;
    /// only the first call starts anything.
    pub fn spawn_all(&self, ctx: &serenity::Context, data: &Data) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        for &source in Source::ALL.iter() {
            let ctx = ctx.clone();
            let data = data.clone();
            tokio::spawn(async move {
                run_poll_loop(source, ctx, data).await;
            });
        }
    }
}

async fn run_poll_loop(source: Source, ctx: serenity::Context, data: Data) {
    let mut period_rx = data.pollers.handle(source).subscribe();
    tracing::info!(
        source = source.key(),
        period_secs = period_rx.borrow().as_secs(),
        "poller started"
    );
    loop {
        let period = *period_rx.borrow_and_update();
        tokio::select! {
            _ = tokio::time::sleep(period) => {}
            Ok(_) = period_rx.changed() => {
                // Interval changed mid-wait; restart the wait with the new
                // period.
                continue;
            }
        }
        if !data.pollers.handle(source).is_enabled() {
            continue;
        }
        tick(source, &ctx, &data).await;
    }
}

/// Runs one guarded tick. A tick already in flight is skipped, never queued.
pub async fn tick(source: Source, ctx: &serenity::Context, data: &Data) -> TickResult {
    let handle = data.pollers.handle(source);
    if !handle.try_begin_tick() {
        tracing::warn!(
            source = source.key(),
            "tick skipped, previous tick still in flight"
        );
        return TickResult::InFlight;
    }
    let result = run_tick(source, ctx, data).await;
    handle.end_tick();
    match result {
        Ok(delivered) => TickResult::Delivered(delivered),
        Err(e) => {
            tracing::warn!(source = source.key(), error = %e, "tick aborted");
            TickResult::Failed
        }
    }
}

async fn run_tick(
    source: Source,
    ctx: &serenity::Context,
    data: &Data,
) -> anyhow::Result<usize> {
    let batch = sources::fetch_latest_batch(source, &data.http, &data.config).await;
    if batch.is_empty() {
        return Ok(0);
    }

    let cursor = data.store.cursor(source)?;
    let fresh = fresh_items(batch, cursor.as_deref());

    let mut delivered = 0;
    for item in fresh {
        delivered += dispatch::deliver(ctx, &data.store, source, &item).await;
        // The cursor advances only after the dispatch attempt: a crash here
        // redelivers this item rather than losing it.
        data.store.set_cursor(source, &item.id)?;
        tracing::debug!(source = source.key(), id = %item.id, "cursor advanced");
    }
    Ok(delivered)
}

/// The batch arrives newest first. Returns the items not yet delivered, in
/// oldest-first dispatch order. Everything at or past the cursor position in
/// the batch was already seen.
fn fresh_items(batch: Vec<Item>, cursor: Option<&str>) -> Vec<Item> {
    let mut fresh: Vec<Item> = match cursor {
        Some(cursor) => batch
            .into_iter()
            .take_while(|item| item.id != cursor)
            .collect(),
        None => batch,
    };
    fresh.reverse();
    fresh
}
