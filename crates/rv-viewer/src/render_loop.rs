//! Render loop with dirty-flag coordination.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use rv_scene::{MeshStore, Scene};

use crate::viewer::SharedState;

/// The rendering collaborator boundary.
///
/// A concrete backend owns the camera/controls, the window or texture
/// target, and the draw calls; the loop only decides when work happens.
pub trait RenderSurface: Send + 'static {
    /// Advances camera/interaction state for this tick. Returns true when
    /// user interaction changed what should appear on screen.
    fn advance_controls(&mut self) -> bool;

    /// Applies a viewport size change.
    fn resize(&mut self, width: u32, height: u32);

    /// Performs one redraw of the scene.
    fn redraw(&mut self, scene: &Scene, meshes: &MeshStore);
}

/// One scheduling tick.
///
/// The dirty flag is the only signal consulted to decide whether the
/// expensive redraw happens; it is cleared immediately after the redraw and
/// never without one.
pub(crate) fn tick<S: RenderSurface>(state: &SharedState, surface: &mut S) {
    let mut guard = state.lock();
    let state = &mut *guard;

    if surface.advance_controls() {
        state.scene.mark_dirty();
    }

    if let Some((width, height)) = state.pending_resize.take() {
        surface.resize(width, height);
        state.scene.mark_dirty();
    }

    if state.scene.is_dirty() {
        if state.show_shadow {
            let level = state
                .scene
                .compute_bounds(&state.meshes)
                .map(|b| b.min_y())
                .unwrap_or(0.0);
            state.scene.set_ground_level(level);
        }
        surface.redraw(&state.scene, &state.meshes);
        state.scene.mark_clean();
    }
}

/// Owns the render loop task for the lifetime the component is displayed.
///
/// Starting is guarded so a second start before a stop does not spawn a
/// duplicate loop; stopping is idempotent and the loop can be restarted
/// afterwards.
pub struct RenderLoop {
    handle: Option<JoinHandle<()>>,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Spawns the loop task unless one is already running.
    pub(crate) fn start<S: RenderSurface>(
        &mut self,
        state: SharedState,
        mut surface: S,
        interval: Duration,
    ) {
        if self.is_running() {
            tracing::debug!("render loop already running, ignoring start");
            return;
        }

        tracing::info!(?interval, "starting render loop");
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                tick(&state, &mut surface);
            }
        }));
    }

    /// Returns true while the loop task is alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the loop. Safe to call repeatedly or without a prior start.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            tracing::info!("stopping render loop");
            handle.abort();
        }
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
