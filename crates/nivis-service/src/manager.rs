use crate::{Error, Result, config::ServiceConfig, maintenance};
use core::fmt;
use nivis::{CounterGenerator, Identity, SnowflakeGenerator, SnowflakeLayout, SystemClock};
use std::{str::FromStr, sync::Arc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Reference bit split: 42 timestamp, 5 partition, 5 shard, 12 sequence.
const TIMESTAMP_BITS: u8 = 42;
const PARTITION_BITS: u8 = 5;
const SHARD_BITS: u8 = 5;

/// The id generation algorithms the service can run.
///
/// The set is closed: callers dispatch on the enum, and the wire names
/// survive only at the edge through [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Time-ordered snowflake ids from the clock-maintained generator.
    Snowflake,
    /// Plain process-local consecutive integers.
    Counter,
}

impl Algorithm {
    /// Every algorithm the service knows about.
    pub const ALL: [Self; 2] = [Self::Snowflake, Self::Counter];

    /// The wire name of the algorithm.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Snowflake => "snowflake",
            Self::Counter => "counter",
        }
    }

    /// Whether the algorithm's generator needs a clock maintenance task.
    pub const fn requires_clock_maintenance(self) -> bool {
        matches!(self, Self::Snowflake)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "snowflake" => Ok(Self::Snowflake),
            "counter" => Ok(Self::Counter),
            other => Err(Error::UnknownAlgorithm {
                name: other.to_owned(),
            }),
        }
    }
}

/// Owns one generator per [`Algorithm`] and the tasks that keep them
/// serviceable.
///
/// The generator set is fixed at construction. [`generate`] dispatches on
/// the enum without any lookup table; [`run`] fans out one clock
/// maintenance task per generator that needs one and converges on the
/// first fault or on cancellation.
///
/// [`generate`]: Self::generate
/// [`run`]: Self::run
#[derive(Debug)]
pub struct IdManager {
    snowflake: Arc<SnowflakeGenerator<SystemClock>>,
    counter: CounterGenerator,
}

impl IdManager {
    /// Builds the generator set for this deployment.
    ///
    /// The snowflake generator uses the reference 42/5/5 bit split with
    /// the partition/shard identity taken from `config`.
    ///
    /// # Errors
    /// Fails when a configured id does not fit its field.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let layout = SnowflakeLayout::new(TIMESTAMP_BITS, PARTITION_BITS, SHARD_BITS)?;
        let snowflake = SnowflakeGenerator::new(
            layout,
            config.data_center_id,
            config.service_id,
            SystemClock,
        )?;

        Ok(Self {
            snowflake: Arc::new(snowflake),
            counter: CounterGenerator::new(),
        })
    }

    /// Replaces the counter so it resumes from `next`, for hosts that
    /// persist the last issued value across restarts.
    #[must_use]
    pub fn starting_counter_at(mut self, next: u64) -> Self {
        self.counter = CounterGenerator::starting_at(next);
        self
    }

    /// Mints an id with the given algorithm.
    ///
    /// # Errors
    /// Forwards snowflake clock faults; the counter never fails.
    pub fn generate(&self, algorithm: Algorithm) -> Result<Identity> {
        match algorithm {
            Algorithm::Snowflake => Ok(self.snowflake.generate()?),
            Algorithm::Counter => Ok(self.counter.generate()),
        }
    }

    /// Mints an id for a caller that still speaks algorithm names.
    ///
    /// # Errors
    /// [`Error::UnknownAlgorithm`] for a name outside [`Algorithm::ALL`],
    /// otherwise as [`generate`](Self::generate).
    pub fn generate_named(&self, name: &str) -> Result<Identity> {
        self.generate(name.parse()?)
    }

    /// Resolves the clock-maintained generator behind an algorithm.
    ///
    /// # Errors
    /// [`Error::UnsupportedGenerator`] when the algorithm has no
    /// maintained clock (today: everything but snowflake).
    pub fn clock_maintained(
        &self,
        algorithm: Algorithm,
    ) -> Result<Arc<SnowflakeGenerator<SystemClock>>> {
        match algorithm {
            Algorithm::Snowflake => Ok(Arc::clone(&self.snowflake)),
            other => Err(Error::UnsupportedGenerator { algorithm: other }),
        }
    }

    /// Runs the clock maintenance tasks until cancellation or the first
    /// fault.
    ///
    /// One task is spawned per algorithm with a maintained clock. The
    /// first fault any task reports cancels the rest and becomes the
    /// return value; plain cancellation drains the tasks and returns `Ok`.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        let (fault_tx, mut fault_rx) = mpsc::channel::<Error>(Algorithm::ALL.len());
        let mut tasks = Vec::new();

        for algorithm in Algorithm::ALL {
            if !algorithm.requires_clock_maintenance() {
                continue;
            }
            let generator = self.clock_maintained(algorithm)?;
            let token = shutdown.clone();
            let fault_tx = fault_tx.clone();
            info!("Starting clock maintenance for `{algorithm}`");
            tasks.push(tokio::spawn(async move {
                if let Err(err) = maintenance::run(generator, token).await {
                    let _ = fault_tx.send(err).await;
                }
            }));
        }
        drop(fault_tx);

        let outcome = tokio::select! {
            () = shutdown.cancelled() => Ok(()),
            fault = fault_rx.recv() => match fault {
                Some(err) => {
                    error!("Clock maintenance failed: {err}");
                    Err(err)
                }
                // Every task ended quietly; keep running until told to stop.
                None => {
                    shutdown.cancelled().await;
                    Ok(())
                }
            },
        };

        shutdown.cancel();
        futures::future::join_all(tasks).await;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashSet, time::Duration};

    fn test_config() -> ServiceConfig {
        ServiceConfig {
            data_center_id: 3,
            service_id: 7,
        }
    }

    #[test]
    fn names_parse_into_the_closed_set() {
        assert_eq!(
            "snowflake".parse::<Algorithm>().unwrap(),
            Algorithm::Snowflake
        );
        assert_eq!("counter".parse::<Algorithm>().unwrap(), Algorithm::Counter);
        assert_eq!(Algorithm::Snowflake.to_string(), "snowflake");

        let err = "chrono".parse::<Algorithm>().unwrap_err();
        assert!(matches!(err, Error::UnknownAlgorithm { name } if name == "chrono"));
    }

    #[test]
    fn generates_for_every_known_algorithm() {
        let manager = IdManager::new(&test_config()).unwrap();
        for algorithm in Algorithm::ALL {
            manager.generate(algorithm).unwrap();
        }
    }

    #[test]
    fn snowflake_ids_carry_the_configured_identity() {
        let manager = IdManager::new(&test_config()).unwrap();
        let id = manager.generate_named("snowflake").unwrap();
        assert_eq!((id.value() >> 17) & 0x1F, 3);
        assert_eq!((id.value() >> 12) & 0x1F, 7);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let manager = IdManager::new(&test_config()).unwrap();
        let err = manager.generate_named("uuid").unwrap_err();
        assert!(matches!(err, Error::UnknownAlgorithm { .. }), "{err}");
    }

    #[test]
    fn counter_resumes_from_the_requested_point() {
        let manager = IdManager::new(&test_config())
            .unwrap()
            .starting_counter_at(100);
        assert_eq!(manager.generate(Algorithm::Counter).unwrap().value(), 100);
        assert_eq!(manager.generate(Algorithm::Counter).unwrap().value(), 101);
    }

    #[test]
    fn oversized_identities_fail_construction() {
        let config = ServiceConfig {
            data_center_id: 32,
            service_id: 0,
        };
        let err = IdManager::new(&config).unwrap_err();
        assert!(
            matches!(
                err,
                Error::Generator(nivis::Error::PartitionIdOutOfRange { id: 32, .. })
            ),
            "{err}"
        );
    }

    #[test]
    fn only_snowflake_has_a_maintained_clock() {
        let manager = IdManager::new(&test_config()).unwrap();
        assert!(manager.clock_maintained(Algorithm::Snowflake).is_ok());

        let err = manager.clock_maintained(Algorithm::Counter).unwrap_err();
        assert!(
            matches!(
                err,
                Error::UnsupportedGenerator {
                    algorithm: Algorithm::Counter
                }
            ),
            "{err}"
        );
    }

    #[tokio::test]
    async fn run_returns_cleanly_on_cancellation() {
        let manager = Arc::new(IdManager::new(&test_config()).unwrap());
        let shutdown = CancellationToken::new();

        let running = tokio::spawn({
            let manager = Arc::clone(&manager);
            let shutdown = shutdown.clone();
            async move { manager.run(shutdown).await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.cancel();
        running.await.unwrap().unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn maintenance_keeps_a_saturated_generator_live() {
        let manager = Arc::new(IdManager::new(&test_config()).unwrap());
        let shutdown = CancellationToken::new();

        let running = tokio::spawn({
            let manager = Arc::clone(&manager);
            let shutdown = shutdown.clone();
            async move { manager.run(shutdown).await }
        });

        // Far more ids than one millisecond window holds; progress depends
        // on the maintenance task feeding the generator fresh readings.
        let ids = tokio::task::spawn_blocking({
            let manager = Arc::clone(&manager);
            move || {
                (0..10_000)
                    .map(|_| manager.generate(Algorithm::Snowflake).unwrap().value())
                    .collect::<Vec<_>>()
            }
        })
        .await
        .unwrap();

        let unique: HashSet<u64> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());

        shutdown.cancel();
        running.await.unwrap().unwrap();
    }
}
