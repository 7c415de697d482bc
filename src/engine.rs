//! Tile-parallel filter execution.
//!
//! [`TileEngine::process`] is the single entry point. In
//! [`Mode::Asynchronous`] the image is planned into tiles, one task per tile
//! is spawned on a bounded rayon pool, each finished tile is pushed to the
//! render queue straight away, and the calling thread waits for every task
//! before assembling the final image. [`Mode::Synchronous`] filters the whole
//! image inline and pushes it as one full-frame item.
//!
//! A failing or panicking filter only loses its own tile. There is no
//! per-tile timeout: a filter that never returns blocks the job forever.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use crate::assembler::{self, TileFailure};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, FilterError};
use crate::filters::Filter;
use crate::image::Image;
use crate::render_queue::{RenderItem, RenderSink, TileResult};
use crate::tiling::{self, Tile, TileGrid};

/// How [`TileEngine::process`] runs a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One inline pass over the whole image.
    Synchronous,
    /// Tiled, on the worker pool, with progressive rendering.
    Asynchronous,
}

/// Shared flag for stopping a job.
///
/// Cancelling stops new tile tasks from being submitted or started and stops
/// render-queue output for the job. Tasks already running finish normally.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How one tile task settled.
#[derive(Debug, Clone)]
pub enum TileOutcome {
    Done(TileResult),
    Failed { placement: Tile, error: FilterError },
    /// Skipped because the job was cancelled first.
    Cancelled(Tile),
}

impl TileOutcome {
    pub fn placement(&self) -> Tile {
        match self {
            TileOutcome::Done(result) => result.placement,
            TileOutcome::Failed { placement, .. } => *placement,
            TileOutcome::Cancelled(tile) => *tile,
        }
    }
}

/// Everything a finished job produced.
#[derive(Debug)]
pub struct JobReport {
    pub image: Image,
    pub mode: Mode,
    /// Tiles (or the single full frame) that were filtered successfully.
    pub tiles_rendered: usize,
    pub failures: Vec<TileFailure>,
    pub tiles_cancelled: usize,
    /// The render queue consumer went away during the job.
    pub display_disconnected: bool,
    pub elapsed: Duration,
}

/// Runs filters over images on a bounded worker pool.
#[derive(Debug)]
pub struct TileEngine {
    pool: rayon::ThreadPool,
    sink: RenderSink,
    config: EngineConfig,
}

impl TileEngine {
    pub fn new(config: EngineConfig, sink: RenderSink) -> EngineResult<Self> {
        config.validate()?;
        let pool = build_thread_pool(config.worker_threads)?;
        tracing::debug!(threads = pool.current_num_threads(), "tile engine ready");
        Ok(Self { pool, sink, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn worker_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Filter `image` and return the assembled result.
    ///
    /// `tile_edge` is ignored in synchronous mode.
    pub fn process_image(&self, image: &Image, tile_edge: u32, filter: &dyn Filter, mode: Mode) -> EngineResult<Image> {
        self.process(image, tile_edge, filter, mode, &CancelToken::new())
            .map(|report| report.image)
    }

    /// Filter `image`, honoring `cancel`, and report per-tile results.
    ///
    /// Asynchronous mode fails up front with [`EngineError::Tile`] when
    /// `tile_edge` doesn't divide the image; nothing is dispatched then.
    /// Tile failures do not fail the job; they are listed in the report and
    /// their regions stay transparent in the image.
    #[tracing::instrument(
        skip_all,
        fields(filter = filter.name(), ?mode, width = image.width(), height = image.height())
    )]
    pub fn process(
        &self,
        image: &Image,
        tile_edge: u32,
        filter: &dyn Filter,
        mode: Mode,
        cancel: &CancelToken,
    ) -> EngineResult<JobReport> {
        let started = Instant::now();

        let report = match mode {
            Mode::Synchronous => self.process_sync(image, filter, cancel, started)?,
            Mode::Asynchronous => {
                let grid = tiling::plan(image.width(), image.height(), tile_edge)?;
                self.process_async(image, &grid, filter, cancel, started)?
            }
        };

        tracing::info!(
            elapsed_ms = report.elapsed.as_millis() as u64,
            rendered = report.tiles_rendered,
            failed = report.failures.len(),
            cancelled = report.tiles_cancelled,
            "image processed"
        );
        Ok(report)
    }

    /// Run `filter` once over the whole image and enqueue it as a full frame.
    ///
    /// Nothing is enqueued if `cancel` is set by the time the filter returns.
    pub fn run_sync(&self, image: &Image, filter: &dyn Filter, cancel: &CancelToken) -> EngineResult<SyncRun> {
        let filtered = apply_guarded(filter, image)?;
        let result = TileResult::new(whole_image(image), filtered);
        let display_disconnected = if cancel.is_cancelled() {
            tracing::debug!("job cancelled, full frame not enqueued");
            false
        } else {
            match self.sink.enqueue(RenderItem::FullFrame(result.clone())) {
                Ok(()) => false,
                Err(err) => {
                    tracing::warn!(error = %err, "full frame not displayed");
                    true
                }
            }
        };
        Ok(SyncRun {
            image: Arc::try_unwrap(result.image).unwrap_or_else(|shared| (*shared).clone()),
            display_disconnected,
        })
    }

    /// Spawn one task per tile of `grid` and wait for all of them.
    ///
    /// Outcomes come back in grid order regardless of completion order.
    pub fn run_async(
        &self,
        image: &Image,
        grid: &TileGrid,
        filter: &dyn Filter,
        cancel: &CancelToken,
    ) -> EngineResult<AsyncRun> {
        let (grid_width, grid_height) = grid.dimensions();
        if (grid_width, grid_height) != (image.width(), image.height()) {
            return Err(EngineError::GridMismatch {
                grid_width,
                grid_height,
                width: image.width(),
                height: image.height(),
            });
        }

        let tiles = grid.tiles();
        let display_gone = AtomicBool::new(false);
        let (tx, rx) = mpsc::channel::<(usize, TileOutcome)>();

        let task = TileTask {
            source: image,
            filter,
            sink: &self.sink,
            cancel,
            display_gone: &display_gone,
        };

        // The scope returns once every spawned task has settled.
        self.pool.scope(|scope| {
            for (index, &tile) in tiles.iter().enumerate() {
                if cancel.is_cancelled() {
                    let _ = tx.send((index, TileOutcome::Cancelled(tile)));
                    continue;
                }
                let tx = tx.clone();
                let shared = &task;
                scope.spawn(move |_| {
                    let _ = tx.send((index, shared.run(tile)));
                });
            }
        });
        drop(tx);

        let mut slots: Vec<Option<TileOutcome>> = (0..tiles.len()).map(|_| None).collect();
        for (index, outcome) in rx {
            slots[index] = Some(outcome);
        }
        let outcomes = slots
            .into_iter()
            .zip(tiles)
            .map(|(slot, &tile)| {
                slot.unwrap_or_else(|| TileOutcome::Failed {
                    placement: tile,
                    error: FilterError::failed(filter.name(), "tile task did not report"),
                })
            })
            .collect();

        Ok(AsyncRun {
            outcomes,
            display_disconnected: display_gone.load(Ordering::SeqCst),
        })
    }

    fn process_sync(
        &self,
        image: &Image,
        filter: &dyn Filter,
        cancel: &CancelToken,
        started: Instant,
    ) -> EngineResult<JobReport> {
        if cancel.is_cancelled() {
            return Ok(JobReport {
                image: Image::new(image.width(), image.height()),
                mode: Mode::Synchronous,
                tiles_rendered: 0,
                failures: Vec::new(),
                tiles_cancelled: 1,
                display_disconnected: false,
                elapsed: started.elapsed(),
            });
        }

        let run = self.run_sync(image, filter, cancel)?;
        Ok(JobReport {
            image: run.image,
            mode: Mode::Synchronous,
            tiles_rendered: 1,
            failures: Vec::new(),
            tiles_cancelled: 0,
            display_disconnected: run.display_disconnected,
            elapsed: started.elapsed(),
        })
    }

    fn process_async(
        &self,
        image: &Image,
        grid: &TileGrid,
        filter: &dyn Filter,
        cancel: &CancelToken,
        started: Instant,
    ) -> EngineResult<JobReport> {
        tracing::debug!(tiles = grid.len(), tile_edge = grid.tile_edge(), "dispatching tiles");
        let run = self.run_async(image, grid, filter, cancel)?;
        let assembly = assembler::assemble(image.width(), image.height(), &run.outcomes);

        Ok(JobReport {
            image: assembly.image,
            mode: Mode::Asynchronous,
            tiles_rendered: assembly.tiles_painted,
            failures: assembly.failures,
            tiles_cancelled: assembly.tiles_cancelled,
            display_disconnected: run.display_disconnected,
            elapsed: started.elapsed(),
        })
    }
}

/// Result of [`TileEngine::run_sync`].
#[derive(Debug)]
pub struct SyncRun {
    pub image: Image,
    pub display_disconnected: bool,
}

/// Result of [`TileEngine::run_async`].
#[derive(Debug)]
pub struct AsyncRun {
    /// One outcome per tile, in grid order.
    pub outcomes: Vec<TileOutcome>,
    pub display_disconnected: bool,
}

/// Borrowed state shared by every tile task of one job.
struct TileTask<'a> {
    source: &'a Image,
    filter: &'a dyn Filter,
    sink: &'a RenderSink,
    cancel: &'a CancelToken,
    display_gone: &'a AtomicBool,
}

impl TileTask<'_> {
    fn run(&self, tile: Tile) -> TileOutcome {
        if self.cancel.is_cancelled() {
            return TileOutcome::Cancelled(tile);
        }

        let region = self.source.region(tile);
        let filtered = match apply_guarded(self.filter, &region) {
            Ok(filtered) => filtered,
            Err(error) => {
                tracing::warn!(x = tile.x, y = tile.y, error = %error, "tile failed");
                return TileOutcome::Failed { placement: tile, error };
            }
        };

        let result = TileResult::new(tile, filtered);
        tracing::debug!(x = tile.x, y = tile.y, "tile done");

        if !self.cancel.is_cancelled() && !self.display_gone.load(Ordering::SeqCst) {
            if let Err(err) = self.sink.enqueue(RenderItem::Tile(result.clone())) {
                // Only the first task to notice logs it
                if !self.display_gone.swap(true, Ordering::SeqCst) {
                    tracing::warn!(error = %err, "render queue closed, continuing without display");
                }
            }
        }

        TileOutcome::Done(result)
    }
}

/// Apply `filter`, turning a panic into [`FilterError::Panicked`] and
/// rejecting output whose size differs from the input.
fn apply_guarded(filter: &dyn Filter, image: &Image) -> Result<Image, FilterError> {
    let output = panic::catch_unwind(AssertUnwindSafe(|| filter.apply(image))).unwrap_or_else(|payload| {
        Err(FilterError::Panicked {
            filter: filter.name().to_string(),
            message: panic_message(payload.as_ref()),
        })
    })?;

    if (output.width(), output.height()) != (image.width(), image.height()) {
        return Err(FilterError::failed(
            filter.name(),
            format!(
                "returned {}x{} for a {}x{} input",
                output.width(),
                output.height(),
                image.width(),
                image.height()
            ),
        ));
    }
    Ok(output)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn whole_image(image: &Image) -> Tile {
    Tile {
        x: 0,
        y: 0,
        width: image.width(),
        height: image.height(),
    }
}

fn build_thread_pool(threads: Option<usize>) -> EngineResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("tilestag-worker-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| EngineError::ThreadPool(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TileError;
    use crate::filters::{Grayscale, Sepia};
    use crate::render_queue;

    fn engine(threads: usize) -> (TileEngine, render_queue::RenderQueue) {
        let (sink, queue) = render_queue::channel();
        let engine = TileEngine::new(EngineConfig::default().with_worker_threads(threads), sink).unwrap();
        (engine, queue)
    }

    #[test]
    fn test_new_rejects_zero_threads() {
        let (sink, _queue) = render_queue::channel();
        let config = EngineConfig {
            worker_threads: Some(0),
            ..EngineConfig::default()
        };
        assert!(matches!(TileEngine::new(config, sink), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_pool_size_from_config() {
        let (engine, _queue) = engine(3);
        assert_eq!(engine.worker_threads(), 3);
    }

    #[test]
    fn test_async_invalid_tile_edge_dispatches_nothing() {
        let (engine, queue) = engine(2);
        let img = Image::filled(50, 80, [1, 2, 3, 255]);
        let err = engine
            .process_image(&img, 7, &Grayscale, Mode::Asynchronous)
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Tile(TileError::Indivisible {
                remainder_w: 1,
                remainder_h: 3,
                ..
            })
        ));
        assert!(queue.try_dequeue_next().is_none());
    }

    #[test]
    fn test_sync_ignores_tile_edge_and_enqueues_full_frame() {
        let (engine, queue) = engine(2);
        let img = Image::filled(50, 80, [255, 0, 0, 255]);
        let out = engine.process_image(&img, 7, &Grayscale, Mode::Synchronous).unwrap();
        assert_eq!(out.pixel(10, 10), [54, 54, 54, 255]);

        match queue.try_dequeue_next() {
            Some(RenderItem::FullFrame(result)) => {
                assert_eq!(result.placement, whole_image(&img));
                assert_eq!(*result.image, out);
            }
            other => panic!("expected full frame, got {other:?}"),
        }
        assert!(queue.try_dequeue_next().is_none());
    }

    #[test]
    fn test_async_outcomes_in_grid_order() {
        let (engine, _queue) = engine(4);
        let img = Image::filled(60, 40, [10, 20, 30, 255]);
        let grid = tiling::plan(60, 40, 20).unwrap();
        let run = engine.run_async(&img, &grid, &Sepia, &CancelToken::new()).unwrap();
        let placements: Vec<Tile> = run.outcomes.iter().map(TileOutcome::placement).collect();
        assert_eq!(placements, grid.tiles());
        assert!(!run.display_disconnected);
    }

    #[test]
    fn test_run_async_rejects_mismatched_grid() {
        let (engine, _queue) = engine(1);
        let img = Image::new(40, 40);
        let grid = tiling::plan(20, 20, 10).unwrap();
        assert!(matches!(
            engine.run_async(&img, &grid, &Sepia, &CancelToken::new()),
            Err(EngineError::GridMismatch { .. })
        ));
    }

    #[test]
    fn test_dropped_display_is_not_fatal() {
        let (engine, queue) = engine(2);
        drop(queue);
        let img = Image::filled(40, 40, [255, 0, 0, 255]);
        let report = engine
            .process(&img, 20, &Grayscale, Mode::Asynchronous, &CancelToken::new())
            .unwrap();
        assert!(report.display_disconnected);
        assert_eq!(report.tiles_rendered, 4);
        assert_eq!(report.image.pixel(39, 39), [54, 54, 54, 255]);
    }

    #[test]
    fn test_sync_cancelled_before_start() {
        let (engine, queue) = engine(1);
        let cancel = CancelToken::new();
        cancel.cancel();
        let img = Image::filled(4, 4, [9, 9, 9, 255]);
        let report = engine.process(&img, 2, &Grayscale, Mode::Synchronous, &cancel).unwrap();
        assert_eq!(report.tiles_cancelled, 1);
        assert_eq!(report.tiles_rendered, 0);
        assert!(queue.try_dequeue_next().is_none());
    }

    /// Cancels the job it belongs to from inside `apply`.
    struct CancelsItsJob(CancelToken);

    impl Filter for CancelsItsJob {
        fn name(&self) -> &str {
            "Cancels Its Job"
        }

        fn apply(&self, image: &Image) -> Result<Image, FilterError> {
            self.0.cancel();
            Ok(image.clone())
        }
    }

    #[test]
    fn test_sync_cancelled_during_filter_enqueues_nothing() {
        let (engine, queue) = engine(1);
        let cancel = CancelToken::new();
        let filter = CancelsItsJob(cancel.clone());
        let img = Image::filled(4, 4, [9, 9, 9, 255]);

        let report = engine.process(&img, 2, &filter, Mode::Synchronous, &cancel).unwrap();

        assert!(cancel.is_cancelled());
        assert_eq!(report.image, img);
        assert!(!report.display_disconnected);
        assert!(queue.try_dequeue_next().is_none());
    }

    #[test]
    fn test_discarding_sink_is_not_a_disconnect() {
        let engine = TileEngine::new(
            EngineConfig::default().with_worker_threads(2),
            render_queue::RenderSink::discard(),
        )
        .unwrap();
        let img = Image::filled(40, 40, [255, 0, 0, 255]);
        let report = engine
            .process(&img, 20, &Grayscale, Mode::Asynchronous, &CancelToken::new())
            .unwrap();
        assert!(!report.display_disconnected);
        assert_eq!(report.tiles_rendered, 4);
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }
}
