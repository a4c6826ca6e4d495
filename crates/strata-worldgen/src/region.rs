//! Background region generation on a worker pool.
//!
//! Regions are square blocks of columns generated on worker threads and
//! delivered through a bounded channel. Pending regions can be cancelled.
//! The column generator is shared as an `Arc` behind a lock; reseeding swaps
//! in a whole new generator, so a worker always finishes a region with the
//! generator it started with.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, bounded};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};

use crate::column::{ColumnGenerator, GeneratedColumn};
use crate::error::WorldGenError;

/// Columns along each side of a region.
pub const REGION_SIZE: i32 = 16;

/// Address of a region; column `(x, z)` lives in region
/// `(x.div_euclid(REGION_SIZE), z.div_euclid(REGION_SIZE))`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionCoord {
    pub x: i32,
    pub z: i32,
}

impl RegionCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Region containing column `(x, z)`.
    pub fn containing(x: i32, z: i32) -> Self {
        Self::new(x.div_euclid(REGION_SIZE), z.div_euclid(REGION_SIZE))
    }

    /// World coordinates of the region's first column.
    pub fn origin(self) -> (i32, i32) {
        (self.x * REGION_SIZE, self.z * REGION_SIZE)
    }
}

/// A fully generated region.
#[derive(Debug)]
pub struct GeneratedRegion {
    pub coord: RegionCoord,
    /// Seed of the generator that produced the region.
    pub seed: u64,
    /// Columns in row-major order: index `dz * REGION_SIZE + dx`.
    pub columns: Vec<GeneratedColumn>,
    /// Generation time in microseconds (for profiling).
    pub generation_time_us: u64,
}

impl GeneratedRegion {
    /// Column at offset `(dx, dz)` within the region.
    pub fn column(&self, dx: i32, dz: i32) -> Option<&GeneratedColumn> {
        if !(0..REGION_SIZE).contains(&dx) || !(0..REGION_SIZE).contains(&dz) {
            return None;
        }
        self.columns.get((dz * REGION_SIZE + dx) as usize)
    }
}

/// Internal wrapper that carries the coordinate and its cancellation flag.
struct RegionTask {
    coord: RegionCoord,
    cancelled: Arc<AtomicBool>,
}

type SharedGenerator = Arc<RwLock<Arc<ColumnGenerator>>>;

/// Manages background region generation across a thread pool.
pub struct RegionGenerator {
    task_sender: Sender<RegionTask>,
    result_receiver: Receiver<GeneratedRegion>,
    /// Shared cancellation flag per task.
    active_tasks: Arc<DashMap<RegionCoord, Arc<AtomicBool>>>,
    /// Current number of in-flight tasks.
    in_flight: Arc<AtomicU64>,
    generator: SharedGenerator,
}

impl RegionGenerator {
    /// Start a pool over a seeded `generator`.
    ///
    /// # Arguments
    /// - `thread_count`: Number of worker threads.
    /// - `max_concurrent`: Queue depth is `max_concurrent * 2`; excess submissions are rejected.
    /// - `result_capacity`: Bounded channel capacity for completed regions.
    ///
    /// # Errors
    ///
    /// Fails if `generator` has no seed, `thread_count` is zero, or a worker
    /// thread cannot be spawned.
    pub fn new(
        generator: ColumnGenerator,
        thread_count: usize,
        max_concurrent: usize,
        result_capacity: usize,
    ) -> Result<Self, WorldGenError> {
        if generator.seed().is_none() {
            return Err(WorldGenError::Unseeded);
        }
        if thread_count == 0 {
            return Err(WorldGenError::NoWorkers);
        }
        let (task_sender, task_receiver) = bounded::<RegionTask>(max_concurrent * 2);
        let (result_sender, result_receiver) = bounded::<GeneratedRegion>(result_capacity);
        let in_flight = Arc::new(AtomicU64::new(0));
        let generator: SharedGenerator = Arc::new(RwLock::new(Arc::new(generator)));

        for _ in 0..thread_count {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let shared = Arc::clone(&generator);

            std::thread::Builder::new()
                .name("region-gen-worker".into())
                .spawn(move || {
                    while let Ok(task) = receiver.recv() {
                        // Check cancellation before starting work.
                        if task.cancelled.load(Ordering::Relaxed) {
                            in_flight.fetch_sub(1, Ordering::Relaxed);
                            continue;
                        }

                        let generator = current(&shared);
                        let region = generate_region_sync(&generator, task.coord);

                        // Check cancellation after generation.
                        if !task.cancelled.load(Ordering::Relaxed) {
                            let _ = sender.send(region);
                        }

                        in_flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })?;
        }
        info!(thread_count, max_concurrent, "region workers started");

        Ok(Self {
            task_sender,
            result_receiver,
            active_tasks: Arc::new(DashMap::new()),
            in_flight,
            generator,
        })
    }

    /// Create a pool with a thread count based on CPU cores.
    pub fn with_defaults(generator: ColumnGenerator) -> Result<Self, WorldGenError> {
        let cpus = num_cpus::get().max(2);
        let threads = (cpus - 1).max(1);
        Self::new(generator, threads, 64, 128)
    }

    /// Submit a region for background generation.
    ///
    /// Returns `Err(coord)` if the queue is full or `coord` is already pending.
    pub fn submit(&self, coord: RegionCoord) -> Result<(), RegionCoord> {
        let cancelled = Arc::new(AtomicBool::new(false));
        match self.active_tasks.entry(coord) {
            Entry::Occupied(_) => return Err(coord),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&cancelled));
            }
        }
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        self.task_sender
            .try_send(RegionTask { coord, cancelled })
            .map_err(|e| {
                self.in_flight.fetch_sub(1, Ordering::Relaxed);
                let coord = e.into_inner().coord;
                self.active_tasks.remove(&coord);
                coord
            })
    }

    /// Cancel a pending or in-progress region.
    ///
    /// If the region has already completed, this is a no-op.
    pub fn cancel(&self, coord: &RegionCoord) {
        if let Some((_, cancelled)) = self.active_tasks.remove(coord) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Drain all completed regions from the result channel.
    pub fn drain_results(&self) -> Vec<GeneratedRegion> {
        let mut results = Vec::new();
        while let Ok(region) = self.result_receiver.try_recv() {
            self.active_tasks.remove(&region.coord);
            results.push(region);
        }
        results
    }

    /// Number of tasks currently in flight (queued or executing).
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns `true` if a task for `coord` is currently pending.
    pub fn is_pending(&self, coord: &RegionCoord) -> bool {
        self.active_tasks.contains_key(coord)
    }

    /// The generator new tasks will use.
    pub fn generator(&self) -> Arc<ColumnGenerator> {
        current(&self.generator)
    }

    /// Replace the generator, typically after building one for a new seed.
    /// Regions already being generated finish with the previous generator.
    ///
    /// # Errors
    ///
    /// Fails if `generator` has no seed.
    pub fn swap_generator(&self, generator: ColumnGenerator) -> Result<(), WorldGenError> {
        let seed = generator.seed().ok_or(WorldGenError::Unseeded)?;
        let next = Arc::new(generator);
        *self.generator.write().unwrap_or_else(PoisonError::into_inner) = next;
        debug!(seed, "region generator swapped");
        Ok(())
    }
}

fn current(shared: &SharedGenerator) -> Arc<ColumnGenerator> {
    Arc::clone(&shared.read().unwrap_or_else(PoisonError::into_inner))
}

/// Generate a region synchronously. This is the function worker threads run.
///
/// # Panics
///
/// Panics if `generator` has no seed.
pub fn generate_region_sync(generator: &ColumnGenerator, coord: RegionCoord) -> GeneratedRegion {
    let start = Instant::now();
    let (x0, z0) = coord.origin();
    let mut columns = Vec::with_capacity((REGION_SIZE * REGION_SIZE) as usize);
    for dz in 0..REGION_SIZE {
        for dx in 0..REGION_SIZE {
            columns.push(generator.generate(x0 + dx, z0 + dz));
        }
    }
    GeneratedRegion {
        coord,
        seed: generator.seed().unwrap_or_default(),
        columns,
        generation_time_us: start.elapsed().as_micros() as u64,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use strata_blocks::{BlockRegistry, MaterialPalette};
    use strata_config::WorldGenConfig;

    use super::*;

    fn column_generator(seed: u64) -> ColumnGenerator {
        let mut registry = BlockRegistry::new();
        let palette = MaterialPalette::register_defaults(&mut registry).unwrap();
        let mut generator = ColumnGenerator::new(&WorldGenConfig::default(), palette).unwrap();
        generator.set_seed(seed);
        generator
    }

    fn wait_for(generator: &RegionGenerator, count: usize, secs: u64) -> Vec<GeneratedRegion> {
        let mut results = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(secs);
        while results.len() < count && Instant::now() < deadline {
            results.extend(generator.drain_results());
            if results.len() < count {
                std::thread::sleep(Duration::from_millis(10));
            }
        }
        results
    }

    #[test]
    fn test_region_coord_containing() {
        assert_eq!(RegionCoord::containing(0, 15), RegionCoord::new(0, 0));
        assert_eq!(RegionCoord::containing(16, -1), RegionCoord::new(1, -1));
        assert_eq!(RegionCoord::containing(-16, -17), RegionCoord::new(-1, -2));
        assert_eq!(RegionCoord::new(-1, 2).origin(), (-16, 32));
    }

    #[test]
    fn test_sync_region_layout() {
        let generator = column_generator(9);
        let region = generate_region_sync(&generator, RegionCoord::new(2, -1));
        assert_eq!(region.columns.len(), (REGION_SIZE * REGION_SIZE) as usize);
        assert_eq!(region.seed, 9);
        let column = region.column(3, 5).unwrap();
        assert_eq!((column.x, column.z), (32 + 3, -16 + 5));
        assert!(region.column(REGION_SIZE, 0).is_none());
        assert!(region.column(0, -1).is_none());
    }

    #[test]
    fn test_concurrent_generation_is_safe() {
        let generator = RegionGenerator::new(column_generator(42), 4, 32, 64).unwrap();

        let mut submitted = 0;
        for x in 0..4 {
            for z in 0..4 {
                if generator.submit(RegionCoord::new(x, z)).is_ok() {
                    submitted += 1;
                }
            }
        }

        let results = wait_for(&generator, submitted, 60);
        assert_eq!(
            results.len(),
            submitted,
            "Should receive all submitted regions: got {}/{submitted}",
            results.len()
        );
    }

    #[test]
    fn test_async_matches_sync() {
        let generator = RegionGenerator::new(column_generator(7), 2, 8, 8).unwrap();
        let coord = RegionCoord::new(-3, 4);
        generator.submit(coord).unwrap();
        let results = wait_for(&generator, 1, 30);
        assert_eq!(results.len(), 1);

        let expected = generate_region_sync(&column_generator(7), coord);
        assert_eq!(results[0].columns, expected.columns);
    }

    #[test]
    fn test_cancellation_stops_generation() {
        let generator = RegionGenerator::new(column_generator(1), 2, 64, 64).unwrap();
        let coord = RegionCoord::new(50, 50);
        let _ = generator.submit(coord);

        // Immediately cancel.
        generator.cancel(&coord);
        assert!(!generator.is_pending(&coord));

        std::thread::sleep(Duration::from_millis(200));
        // Race condition is acceptable: the task may have finished before cancellation.
        let _ = generator.drain_results();
    }

    #[test]
    fn test_queue_full_rejects() {
        // One busy worker plus a queue of depth 2 cannot absorb ten regions
        // submitted back to back.
        let generator = RegionGenerator::new(column_generator(1), 1, 1, 16).unwrap();
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for z in 0..10 {
            let coord = RegionCoord::new(0, z);
            match generator.submit(coord) {
                Ok(()) => accepted.push(coord),
                Err(back) => {
                    assert_eq!(back, coord);
                    rejected.push(coord);
                }
            }
        }
        assert!(!accepted.is_empty());
        assert!(!rejected.is_empty());
        assert!(rejected.iter().all(|c| !generator.is_pending(c)));

        let results = wait_for(&generator, accepted.len(), 60);
        assert_eq!(results.len(), accepted.len());
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(matches!(
            RegionGenerator::new(column_generator(1), 0, 1, 4),
            Err(WorldGenError::NoWorkers)
        ));
    }

    #[test]
    fn test_duplicate_submit_rejected() {
        let generator = RegionGenerator::new(column_generator(4), 1, 8, 8).unwrap();
        let coord = RegionCoord::new(3, 3);
        generator.submit(coord).unwrap();
        assert_eq!(generator.submit(coord), Err(coord));
        assert!(generator.is_pending(&coord));

        let results = wait_for(&generator, 1, 30);
        assert_eq!(results.len(), 1);
        assert!(!generator.is_pending(&coord));
        std::thread::sleep(Duration::from_millis(50));
        assert!(generator.drain_results().is_empty());
    }

    #[test]
    fn test_in_flight_count() {
        let generator = RegionGenerator::new(column_generator(3), 1, 64, 64).unwrap();
        assert_eq!(generator.in_flight_count(), 0);

        for i in 0..3 {
            let _ = generator.submit(RegionCoord::new(i, 0));
        }
        assert!(generator.in_flight_count() > 0);

        let deadline = Instant::now() + Duration::from_secs(30);
        while generator.in_flight_count() > 0 && Instant::now() < deadline {
            let _ = generator.drain_results();
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(generator.in_flight_count(), 0);
    }

    #[test]
    fn test_swap_generator_reseeds_new_work() {
        let generator = RegionGenerator::new(column_generator(1), 1, 8, 8).unwrap();
        generator.swap_generator(column_generator(2)).unwrap();
        assert_eq!(generator.generator().seed(), Some(2));

        generator.submit(RegionCoord::new(0, 0)).unwrap();
        let results = wait_for(&generator, 1, 30);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].seed, 2);
    }

    #[test]
    fn test_unseeded_generator_rejected() {
        let mut registry = BlockRegistry::new();
        let palette = MaterialPalette::register_defaults(&mut registry).unwrap();
        let unseeded = ColumnGenerator::new(&WorldGenConfig::default(), palette).unwrap();
        assert!(matches!(
            RegionGenerator::new(unseeded, 1, 4, 4),
            Err(WorldGenError::Unseeded)
        ));

        let pool = RegionGenerator::new(column_generator(5), 1, 4, 4).unwrap();
        let mut registry = BlockRegistry::new();
        let palette = MaterialPalette::register_defaults(&mut registry).unwrap();
        let unseeded = ColumnGenerator::new(&WorldGenConfig::default(), palette).unwrap();
        assert!(matches!(pool.swap_generator(unseeded), Err(WorldGenError::Unseeded)));
        assert_eq!(pool.generator().seed(), Some(5));
    }
}
