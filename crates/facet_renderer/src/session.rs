//! Background render passes with a double-buffered output.
//!
//! A [`RenderSession`] owns the front buffer a display loop reads from. Each
//! request snapshots the scene, renders into a fresh back buffer on a worker
//! thread and, only if the pass finishes, publishes it by swapping the front
//! buffer's `Arc` under a write lock. Readers holding an older `Arc` keep a
//! complete frame; nobody ever sees a half-written one.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use facet_core::{Mesh, RenderParameters};

use crate::framebuffer::FrameBuffer;
use crate::renderer::{render, RenderConfig, RenderError, RenderResult};
use crate::scene::Scene;

/// Shared flag asking a render pass to stop early.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What to do with a running pass when a new request arrives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InFlightPolicy {
    /// Let the running pass finish and publish first
    #[default]
    Wait,
    /// Cancel the running pass unless it has already published
    Discard,
}

struct Worker {
    generation: u64,
    cancel: CancelToken,
    handle: JoinHandle<RenderResult<()>>,
}

/// Owner of the published frame and the render pass in flight.
pub struct RenderSession {
    front: Arc<RwLock<Arc<FrameBuffer>>>,
    published: Arc<AtomicU64>,
    generation: u64,
    worker: Option<Worker>,
}

impl RenderSession {
    /// Create a session whose front buffer starts out black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            front: Arc::new(RwLock::new(Arc::new(FrameBuffer::new(width, height)))),
            published: Arc::new(AtomicU64::new(0)),
            generation: 0,
            worker: None,
        }
    }

    /// The most recently published frame.
    ///
    /// Cheap: clones an `Arc`. The frame stays valid after later publishes.
    pub fn front(&self) -> Arc<FrameBuffer> {
        let guard = self.front.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Generation of the most recent request (0 before the first).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Generation of the frame currently in the front buffer (0 = blank).
    pub fn published_generation(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }

    /// Whether a pass is still running.
    pub fn is_rendering(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    /// Start a new render pass and return its generation.
    ///
    /// The scene is rebuilt from `meshes` and `params` on the calling thread,
    /// so callers may change both as soon as this returns. A pass already in
    /// flight is first finished or cancelled according to `policy`.
    pub fn request(
        &mut self,
        meshes: &[Mesh],
        params: &RenderParameters,
        config: RenderConfig,
        policy: InFlightPolicy,
    ) -> RenderResult<u64> {
        config.validate()?;

        match policy {
            InFlightPolicy::Wait => {
                if let Err(err) = self.wait() {
                    log::warn!("Previous render pass did not publish: {}", err);
                }
            }
            InFlightPolicy::Discard => self.cancel(),
        }

        let scene = Scene::build(meshes, params);
        let params = params.clone();

        self.generation += 1;
        let generation = self.generation;
        let cancel = CancelToken::new();

        let front = Arc::clone(&self.front);
        let published = Arc::clone(&self.published);
        let token = cancel.clone();

        let handle = thread::Builder::new()
            .name(format!("facet-render-{}", generation))
            .spawn(move || {
                let start = Instant::now();
                let frame = render(&scene, &params, &config, &token)?;

                // A cancel that lands after the last row still wins
                if token.is_cancelled() {
                    return Err(RenderError::Cancelled);
                }

                let mut guard = front.write().unwrap_or_else(PoisonError::into_inner);
                *guard = Arc::new(frame);
                published.store(generation, Ordering::Release);
                drop(guard);

                log::debug!("Published frame {} after {:?}", generation, start.elapsed());
                Ok(())
            })?;

        self.worker = Some(Worker {
            generation,
            cancel,
            handle,
        });

        Ok(generation)
    }

    /// Block until the running pass (if any) ends.
    ///
    /// Returns the pass's own result: `Ok` once its frame is published, or
    /// [`RenderError::Cancelled`] if it was cancelled.
    pub fn wait(&mut self) -> RenderResult<()> {
        match self.worker.take() {
            Some(worker) => worker.handle.join().map_err(|_| RenderError::WorkerPanicked)?,
            None => Ok(()),
        }
    }

    /// Cancel the running pass (if any) and wait for its thread to exit.
    ///
    /// The front buffer keeps the last published frame.
    pub fn cancel(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.cancel.cancel();
            match worker.handle.join() {
                Ok(Ok(())) => log::debug!("Frame {} finished before cancel", worker.generation),
                Ok(Err(err)) => log::debug!("Frame {} discarded: {}", worker.generation, err),
                Err(_) => log::warn!("Render thread for frame {} panicked", worker.generation),
            }
        }
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        self.cancel();
    }
}
