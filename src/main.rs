//! Ticktune demo host
//!
//! Drives the library the way a simulation server would: a fixed-rate
//! tick loop over a synthetic world, with settings reload on SIGHUP
//! and graceful shutdown on Ctrl+C / SIGTERM.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticktune::{spawn_cache_sweep, ConfigProvider, Position, ThrottleController, TtlCache};

/// 20 ticks per second, the usual simulation cadence.
const TICK_INTERVAL: Duration = Duration::from_millis(50);
const SUMMARY_EVERY_TICKS: u64 = 100;
const REPORT_EVERY_TICKS: u64 = 1_200;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const GRID_SIDE: i32 = 16;
const GRID_SPACING: f64 = 12.0;
const OBSERVER_COUNT: usize = 3;
const CATEGORIES: [&str; 4] = ["zombie", "skeleton", "creeper", "pig"];

/// Main entry point for the demo host.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load the settings document (path from the first CLI argument)
/// 3. Create the TTL cache and throttle controller
/// 4. Start the background expiration sweep
/// 5. Run the tick loop until a shutdown signal arrives
/// 6. Stop background tasks and print final statistics
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticktune=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ticktune demo host");

    let settings_path = env::args().nth(1).unwrap_or_else(|| "ticktune.yml".to_string());
    let provider = Arc::new(ConfigProvider::load(&settings_path));
    let settings = provider.snapshot();
    info!(
        cache_capacity = settings.cache.capacity(),
        cache_ttl_secs = settings.cache.default_ttl_secs,
        throttling_enabled = settings.throttling.enabled,
        "settings ready"
    );

    let cache: Arc<TtlCache<String>> = Arc::new(TtlCache::from_settings(&settings.cache));
    let controller = Arc::new(ThrottleController::new(provider.clone()));

    let mut sweep = spawn_cache_sweep(cache.clone(), settings.cache.sweep_interval());

    run_simulation(&cache, &controller, &provider).await?;

    sweep.shutdown(SHUTDOWN_GRACE).await;

    println!("{}", cache.report());
    println!("{}", controller.report());
    info!("Shutdown complete");
    Ok(())
}

/// Runs the tick loop until Ctrl+C or SIGTERM arrives.
///
/// SIGHUP reloads the settings document and reapplies it to the
/// controller without stopping the loop.
async fn run_simulation(
    cache: &TtlCache<String>,
    controller: &ThrottleController,
    provider: &ConfigProvider,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    #[cfg(unix)]
    let mut hangup = signal::unix::signal(signal::unix::SignalKind::hangup())
        .context("failed to install SIGHUP handler")?;

    let mut world = World::new();
    let mut shutdown = Box::pin(shutdown_signal());
    let mut tick: u64 = 0;

    loop {
        #[cfg(unix)]
        let reload = hangup.recv();
        #[cfg(not(unix))]
        let reload = std::future::pending::<Option<()>>();

        tokio::select! {
            _ = ticker.tick() => {
                tick += 1;
                world.advance(tick);
                let summary = world.run_tick(cache, controller);
                if tick % SUMMARY_EVERY_TICKS == 0 {
                    info!(
                        tick,
                        active = summary.active,
                        throttled = summary.throttled,
                        cache_size = cache.len(),
                        "tick summary"
                    );
                }
                if tick % REPORT_EVERY_TICKS == 0 {
                    info!("\n{}\n{}", cache.report().trim_end(), controller.report().trim_end());
                }
            }
            _ = reload => {
                info!("Received SIGHUP, reloading settings");
                if let Err(err) = provider.reload() {
                    warn!(%err, "settings reload failed, keeping previous settings");
                }
                controller.reload();
            }
            _ = &mut shutdown => {
                break;
            }
        }
    }

    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}

// == Synthetic World ==

/// One simulated entity: a fixed grid position and a category.
struct Entity {
    id: u32,
    category: &'static str,
    position: Position,
}

/// A fixed grid of entities plus observers orbiting the grid center,
/// so the set of entities near an observer shifts every tick.
struct World {
    entities: Vec<Entity>,
    observers: Vec<Position>,
}

struct TickSummary {
    active: usize,
    throttled: usize,
}

impl World {
    fn new() -> Self {
        let mut entities = Vec::with_capacity((GRID_SIDE * GRID_SIDE) as usize);
        let mut id = 0u32;
        for gx in 0..GRID_SIDE {
            for gz in 0..GRID_SIDE {
                let category = CATEGORIES[((gx + gz) % CATEGORIES.len() as i32) as usize];
                entities.push(Entity {
                    id,
                    category,
                    position: Position::new(
                        f64::from(gx) * GRID_SPACING,
                        64.0,
                        f64::from(gz) * GRID_SPACING,
                    ),
                });
                id += 1;
            }
        }
        Self {
            entities,
            observers: vec![Position::new(0.0, 64.0, 0.0); OBSERVER_COUNT],
        }
    }

    /// Moves each observer along its own orbit around the grid center.
    fn advance(&mut self, tick: u64) {
        let center = f64::from(GRID_SIDE - 1) * GRID_SPACING / 2.0;
        for (index, observer) in self.observers.iter_mut().enumerate() {
            let radius = 30.0 + 25.0 * index as f64;
            let angle = tick as f64 / 40.0 + index as f64 * 2.1;
            *observer = Position::new(
                center + radius * angle.cos(),
                64.0,
                center + radius * angle.sin(),
            );
        }
    }

    /// Runs one tick: every entity left active by the throttle performs
    /// its full update, which includes a cache-memoized profile lookup.
    fn run_tick(&self, cache: &TtlCache<String>, controller: &ThrottleController) -> TickSummary {
        let mut summary = TickSummary {
            active: 0,
            throttled: 0,
        };
        for entity in &self.entities {
            let throttled = controller.should_throttle(
                entity.category,
                Some(entity.position),
                &self.observers,
            );
            if throttled {
                summary.throttled += 1;
                continue;
            }
            summary.active += 1;

            let key = format!("profile:{}", entity.id);
            if cache.get(&key).is_none() {
                cache.put(key, expensive_profile(entity));
            }
        }
        summary
    }
}

/// Stand-in for a lookup worth memoizing.
fn expensive_profile(entity: &Entity) -> String {
    format!(
        "{}#{} at ({:.0}, {:.0})",
        entity.category, entity.id, entity.position.x, entity.position.z
    )
}
