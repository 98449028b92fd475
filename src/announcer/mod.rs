//! Scheduling and dispatch for the announcement pipeline
//!
//! A fixed-interval timer fires discovery attempts; every tick spawns an
//! independent attempt (discover -> enrich -> compose) without waiting for
//! earlier ones. Each attempt pushes its resulting [`Message`] onto an
//! unbounded hand-off queue drained by exactly one dispatch task.
//!
//! The single consumer is the architectural invariant that keeps publish
//! calls and dedup writes from different attempts from racing: discovery may
//! run concurrently, delivery never does. Dispatch order follows attempt
//! completion order, not trigger order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::composer::Composer;
use crate::config::{Config, SchedulerConfig};
use crate::discovery::{DiscoveryEngine, DiscoveryOutcome};
use crate::models::{current_announcement_score, Message};
use crate::publisher::{ConsolePublisher, Publisher, WebhookPublisher};
use crate::source::{StatsClient, StatsSource, TrendingClient, TrendingSource};
use crate::storage::{AnnouncementStore, RedisStore};

/// Everything one spawned attempt needs; cheap to clone into the task
#[derive(Clone)]
struct AttemptContext {
    engine: Arc<DiscoveryEngine>,
    stats: Arc<dyn StatsSource>,
    composer: Arc<Composer>,
}

/// The announcement bot: schedules attempts and dispatches their messages
pub struct Announcer {
    context: AttemptContext,
    publisher: Arc<dyn Publisher>,
    store: Arc<dyn AnnouncementStore>,
    scheduler: SchedulerConfig,
    shutdown: watch::Sender<bool>,
}

impl Announcer {
    /// Assemble an announcer from its parts
    pub fn new(
        source: Arc<dyn TrendingSource>,
        stats: Arc<dyn StatsSource>,
        store: Arc<dyn AnnouncementStore>,
        publisher: Arc<dyn Publisher>,
        composer: Arc<Composer>,
        scheduler: SchedulerConfig,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        let engine = Arc::new(DiscoveryEngine::new(
            source,
            Arc::clone(&store),
            scheduler.max_scope,
        ));

        Self {
            context: AttemptContext {
                engine,
                stats,
                composer,
            },
            publisher,
            store,
            scheduler,
            shutdown,
        }
    }

    /// Build the full production wiring from configuration
    ///
    /// With `dry_run` the publication channel is the console: messages are
    /// logged rather than posted, but dedup records are still written.
    pub async fn from_config(config: &Config, dry_run: bool) -> crate::Result<Self> {
        let source: Arc<dyn TrendingSource> = Arc::new(TrendingClient::new(&config.source)?);
        let stats: Arc<dyn StatsSource> = Arc::new(StatsClient::new(&config.source)?);
        let store: Arc<dyn AnnouncementStore> =
            Arc::new(RedisStore::connect(&config.storage).await?);

        let publisher: Arc<dyn Publisher> = if dry_run {
            Arc::new(ConsolePublisher::new(
                config.publisher.default_short_url_width,
            ))
        } else {
            Arc::new(WebhookPublisher::new(&config.publisher)?)
        };

        let width = Arc::new(AtomicUsize::new(config.publisher.default_short_url_width));
        let composer = Arc::new(Composer::new(config.composer.char_budget, width));

        Ok(Self::new(
            source,
            stats,
            store,
            publisher,
            composer,
            config.scheduler.clone(),
        ))
    }

    /// Request a graceful stop of a running announcer
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Run one discovery-and-compose attempt without scheduling or dispatch
    ///
    /// Used for previews: nothing is published and nothing is recorded.
    pub async fn attempt_once(&self) -> Message {
        run_attempt(&self.context).await
    }

    /// Run the announcement loop until [`stop`](Self::stop) is called
    pub async fn run(&self) -> crate::Result<()> {
        // Pick up the channel's real shortener width before the first attempt
        refresh_short_url_width(
            self.publisher.as_ref(),
            &self.context.composer.short_url_width_handle(),
        )
        .await;

        let (tx, rx) = mpsc::unbounded_channel::<Message>();
        let dispatcher = tokio::spawn(dispatch_loop(
            rx,
            Arc::clone(&self.publisher),
            Arc::clone(&self.store),
        ));
        let refresher = self.spawn_width_refresh();

        let mut interval = tokio::time::interval(self.scheduler.poll_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The interval yields immediately once; swallow that so the first
        // attempt waits a full period after startup
        interval.tick().await;

        let mut shutdown_rx = self.shutdown.subscribe();
        tracing::info!(
            interval_secs = self.scheduler.poll_interval_secs,
            max_scope = self.scheduler.max_scope,
            "discovery schedule armed, waiting for the first trending project"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    tracing::debug!("tick: launching discovery attempt");
                    let context = self.context.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let message = run_attempt(&context).await;
                        if tx.send(message).is_err() {
                            tracing::warn!("dispatch queue closed, dropping message");
                        }
                    });
                }
                _ = shutdown_rx.changed() => {
                    tracing::info!("shutdown requested, draining dispatch queue");
                    break;
                }
            }
        }

        // Dropping our sender lets the dispatcher finish once in-flight
        // attempts (holding clones) have completed
        drop(tx);
        let _ = futures::future::join(refresher, dispatcher).await;

        Ok(())
    }

    /// Periodically re-read the channel configuration for the shortener width
    fn spawn_width_refresh(&self) -> JoinHandle<()> {
        let publisher = Arc::clone(&self.publisher);
        let width = self.context.composer.short_url_width_handle();
        let mut shutdown_rx = self.shutdown.subscribe();
        let period = self.scheduler.config_refresh_interval();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        refresh_short_url_width(publisher.as_ref(), &width).await;
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        })
    }
}

/// One full discovery-and-compose attempt
async fn run_attempt(context: &AttemptContext) -> Message {
    match context.engine.discover().await {
        DiscoveryOutcome::Exhausted => Message::none(),
        DiscoveryOutcome::Found(candidate) => {
            let stats = match context.stats.project_stats(&candidate.name).await {
                Ok(stats) => Some(stats),
                Err(e) => {
                    tracing::warn!(
                        project = %candidate.name,
                        error = %e,
                        "metadata lookup failed, composing without enrichment"
                    );
                    None
                }
            };

            context.composer.compose(&candidate, stats.as_ref())
        }
    }
}

/// Ask the channel for its current shortener width and store it
///
/// Failures keep the previous width; the composer budget stays usable.
async fn refresh_short_url_width(publisher: &dyn Publisher, width: &AtomicUsize) {
    match publisher.short_url_width().await {
        Ok(fresh) => {
            width.store(fresh, Ordering::Relaxed);
            tracing::info!(width = fresh, "publication channel configuration refreshed");
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                width = width.load(Ordering::Relaxed),
                "could not refresh channel configuration, keeping current width"
            );
        }
    }
}

/// Drain the hand-off queue; the only task allowed to publish and record
async fn dispatch_loop(
    mut rx: mpsc::UnboundedReceiver<Message>,
    publisher: Arc<dyn Publisher>,
    store: Arc<dyn AnnouncementStore>,
) {
    while let Some(message) = rx.recv().await {
        dispatch_one(&message, publisher.as_ref(), store.as_ref()).await;
    }
}

/// Publish one message and record the announcement on success
///
/// Empty-subject messages are discarded here, not upstream, so a fruitless
/// attempt still flows through the queue without producing an empty
/// announcement. A failed publish deliberately leaves the dedup store
/// untouched so a later cycle may retry the same candidate.
async fn dispatch_one(
    message: &Message,
    publisher: &dyn Publisher,
    store: &dyn AnnouncementStore,
) {
    if !message.has_subject() {
        tracing::info!("no project found this cycle, nothing to publish");
        return;
    }

    match publisher.publish(&message.body).await {
        Ok(id) => {
            tracing::info!(
                id = %id,
                project = %message.subject_name,
                chars = message.char_len(),
                channel = publisher.name(),
                "announcement published"
            );

            let score = current_announcement_score();
            match store.record_announcement(&message.subject_name, &score).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(
                        project = %message.subject_name,
                        "store did not accept the announcement record"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        project = %message.subject_name,
                        error = %e,
                        "failed to record announcement, a future duplicate is possible"
                    );
                }
            }
        }
        Err(e) => {
            tracing::warn!(
                project = %message.subject_name,
                error = %e,
                "publish failed, leaving candidate for a future cycle"
            );
        }
    }
}
