//! The viewer component and its load state machine.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

use rv_model::{Geometry, MeshProvider, ModelError, ModelNode, ModelSource, RobotBuilder};
use rv_scene::{BoundingBox, MeshStore, Scene, SceneNode, UpAxis};

use crate::aggregator::MeshLoadAggregator;
use crate::config::ViewerConfig;
use crate::events::{self, ViewerEvent};
use crate::render_loop::{RenderLoop, RenderSurface};
use crate::robot::{JointState, RobotModel};

/// How a load request resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The model was built and attached to the scene.
    Applied,
    /// A newer request was issued while this one was in flight; its result
    /// was discarded without touching the scene.
    Superseded,
    /// The source matched the last initiated one; nothing happened.
    Unchanged,
}

/// Errors surfaced to whoever initiated a load.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ViewerError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Load task failed: {0}")]
    Task(String),
}

/// Shared mutable viewer state: the scene, its resources, the attached
/// robots, and the load generation counter.
pub(crate) struct ViewerState {
    pub(crate) scene: Scene,
    pub(crate) meshes: MeshStore,
    pub(crate) robots: Vec<RobotModel>,
    pub(crate) source: Option<ModelSource>,
    pub(crate) generation: u64,
    pub(crate) aggregator: MeshLoadAggregator,
    pub(crate) show_shadow: bool,
    pub(crate) pending_resize: Option<(u32, u32)>,
}

impl ViewerState {
    pub(crate) fn new(show_shadow: bool) -> Self {
        Self {
            scene: Scene::new(),
            meshes: MeshStore::new(),
            robots: Vec::new(),
            source: None,
            generation: 0,
            aggregator: MeshLoadAggregator::new(),
            show_shadow,
            pending_resize: None,
        }
    }
}

pub(crate) type SharedState = Arc<Mutex<ViewerState>>;

/// The viewer component.
///
/// Owns the live scene and coordinates the asynchronous load state machine:
/// every load request gets a fresh generation token, and only the latest
/// generation is allowed to mutate the scene or emit notifications.
pub struct RobotViewer {
    state: SharedState,
    builder: Arc<dyn RobotBuilder>,
    provider: Arc<dyn MeshProvider>,
    events: broadcast::Sender<ViewerEvent>,
    render_loop: RenderLoop,
    tick_interval: Duration,
}

impl RobotViewer {
    /// Creates a viewer with the given collaborators and configuration.
    pub fn new(
        builder: Arc<dyn RobotBuilder>,
        provider: Arc<dyn MeshProvider>,
        config: &ViewerConfig,
    ) -> Self {
        let mut state = ViewerState::new(config.show_shadow);
        state.scene.set_up_axis(UpAxis::parse(&config.up_axis));
        state.scene.mark_clean();

        let (events, _) = events::channel();
        Self {
            state: Arc::new(Mutex::new(state)),
            builder,
            provider,
            events,
            render_loop: RenderLoop::new(),
            tick_interval: Duration::from_millis(config.tick_interval_ms),
        }
    }

    /// Subscribes to viewer events.
    pub fn subscribe(&self) -> broadcast::Receiver<ViewerEvent> {
        self.events.subscribe()
    }

    /// Loads a robot model, superseding any load still in flight.
    ///
    /// Resolves once the model is attached (or discarded). Mesh geometry
    /// keeps streaming in afterwards; `GeometryLoaded` signals completion.
    /// On failure the previously displayed model stays attached.
    pub async fn load(&self, source: ModelSource) -> Result<LoadOutcome, ViewerError> {
        let token = {
            let mut st = self.state.lock();
            if st.source.as_ref() == Some(&source) {
                tracing::debug!(path = %source.model_path.display(), "source unchanged, skipping load");
                return Ok(LoadOutcome::Unchanged);
            }
            st.source = Some(source.clone());
            st.generation += 1;
            tracing::info!(
                generation = st.generation,
                path = %source.model_path.display(),
                "starting model load"
            );
            st.generation
        };

        let builder = Arc::clone(&self.builder);
        let build_source = source.clone();
        let trees = tokio::task::spawn_blocking(move || builder.build(&build_source))
            .await
            .map_err(|e| ViewerError::Task(e.to_string()))??;

        let pending = {
            let mut guard = self.state.lock();
            // Re-read the latest generation; a newer request may have been
            // issued while the build was in flight.
            if guard.generation != token {
                tracing::debug!(generation = token, "discarding superseded model");
                return Ok(LoadOutcome::Superseded);
            }

            let st = &mut *guard;

            // Dispose the previous robot set, children before parents.
            for robot in std::mem::take(&mut st.robots) {
                for root in &robot.roots {
                    st.scene.dispose(*root, &mut st.meshes);
                }
            }

            st.aggregator.reset(token);
            let mut pending = Vec::new();
            for tree in trees {
                let mut robot = RobotModel::new(&tree.name);
                let root_id = attach_tree(st, &mut robot, tree, None, &mut pending);
                robot.roots.push(root_id);
                st.robots.push(robot);
            }
            // The whole batch is registered under the attach lock; only
            // completions happen after this point, so a superseding reset
            // can never observe a partially registered generation.
            for _ in &pending {
                st.aggregator.add_requested();
            }
            st.scene.mark_dirty();
            pending
        };

        tracing::info!(generation = token, meshes = pending.len(), "model attached");
        let _ = self.events.send(ViewerEvent::ModelProcessed);

        for (node_id, path) in pending {
            self.spawn_mesh_load(token, node_id, path);
        }

        Ok(LoadOutcome::Applied)
    }

    fn spawn_mesh_load(&self, token: u64, node_id: Uuid, path: PathBuf) {
        let state = Arc::clone(&self.state);
        let provider = Arc::clone(&self.provider);
        let events = self.events.clone();

        tokio::spawn(async move {
            let decode_path = path.clone();
            let loaded = tokio::task::spawn_blocking(move || provider.load(&decode_path)).await;

            let fire = {
                let mut st = state.lock();
                // Latest generation, never the one captured at spawn time.
                if st.generation != token {
                    tracing::debug!(generation = token, "discarding superseded mesh");
                    return;
                }

                match loaded {
                    Ok(Ok(data)) => {
                        let handle = st.meshes.insert(data);
                        if let Some(node) = st.scene.node_mut(node_id) {
                            node.mesh = Some(handle);
                        }
                        st.scene.mark_shadow_casting(node_id);
                    }
                    Ok(Err(e)) => {
                        // Counts as completed; the node stays empty.
                        tracing::warn!(path = %path.display(), "mesh load failed: {e}");
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), "mesh task failed: {e}");
                    }
                }

                st.scene.mark_dirty();
                st.aggregator.add_completed()
            };

            if fire {
                let _ = events.send(ViewerEvent::GeometryLoaded);
            }
        });
    }

    /// Sets the up axis from a specifier string; invalid input falls back to
    /// the default `+Y`.
    pub fn set_up_axis(&self, spec: &str) {
        self.state.lock().scene.set_up_axis(UpAxis::parse(spec));
    }

    /// The current up axis.
    pub fn up_axis(&self) -> UpAxis {
        self.state.lock().scene.up_axis()
    }

    /// Sets one joint's value (degrees for rotational joints). Searches
    /// every attached robot; a name with no match is a silent no-op.
    pub fn set_joint_angle(&self, name: &str, value: f32) {
        let mut guard = self.state.lock();
        let st = &mut *guard;
        for robot in &mut st.robots {
            if robot.set_joint_value(&mut st.scene, name, value) {
                return;
            }
        }
        tracing::debug!(joint = name, "no attached robot has this joint");
    }

    /// Applies every entry of a name-to-value mapping.
    pub fn set_joint_angles(&self, angles: &HashMap<String, f32>) {
        for (name, value) in angles {
            self.set_joint_angle(name, *value);
        }
    }

    /// Snapshot of every joint's current value across all attached robots.
    pub fn joint_angles(&self) -> HashMap<String, f32> {
        let st = self.state.lock();
        let mut all = HashMap::new();
        for robot in &st.robots {
            all.extend(robot.joint_values());
        }
        all
    }

    /// Toggles the shadow ground plane.
    pub fn set_shadow(&self, show: bool) {
        let mut st = self.state.lock();
        st.show_shadow = show;
        st.scene.mark_dirty();
    }

    /// Requests a viewport resize, applied on the next render tick.
    pub fn request_resize(&self, width: u32, height: u32) {
        let mut st = self.state.lock();
        st.pending_resize = Some((width, height));
        st.scene.mark_dirty();
    }

    /// Names of the currently attached robots.
    pub fn robot_names(&self) -> Vec<String> {
        self.state.lock().robots.iter().map(|r| r.name.clone()).collect()
    }

    /// World-space bounds of the attached geometry.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let st = self.state.lock();
        st.scene.compute_bounds(&st.meshes)
    }

    /// Number of meshes currently resident.
    pub fn mesh_count(&self) -> usize {
        self.state.lock().meshes.len()
    }

    /// Starts the render loop on the given surface. A second start while
    /// running is a no-op.
    pub fn start_rendering<S: RenderSurface>(&mut self, surface: S) {
        self.render_loop
            .start(Arc::clone(&self.state), surface, self.tick_interval);
    }

    /// Stops the render loop. Idempotent; the loop can be restarted.
    pub fn stop_rendering(&mut self) {
        self.render_loop.stop();
    }

    /// Returns true while the render loop is running.
    pub fn is_rendering(&self) -> bool {
        self.render_loop.is_running()
    }
}

/// Walks a built model tree, creating scene nodes and collecting joints and
/// pending external meshes. Returns the created node's id.
fn attach_tree(
    st: &mut ViewerState,
    robot: &mut RobotModel,
    node: ModelNode,
    parent: Option<Uuid>,
    pending: &mut Vec<(Uuid, PathBuf)>,
) -> Uuid {
    let ModelNode {
        name,
        origin,
        geometry,
        color,
        joint,
        children,
    } = node;

    let mut scene_node = SceneNode::new(name)
        .with_transform(origin)
        .with_color(color);

    let mut external = None;
    match geometry {
        Some(Geometry::Inline(data)) => {
            let handle = st.meshes.insert(data);
            scene_node.mesh = Some(handle);
            scene_node.casts_shadow = true;
        }
        Some(Geometry::External { path }) => external = Some(path),
        None => {}
    }

    let id = st.scene.attach(scene_node, parent);

    if let Some(info) = joint {
        robot.insert_joint(
            JointState {
                node: id,
                joint_type: info.joint_type,
                axis: info.axis,
                origin,
                limits: info.limits,
                value: 0.0,
            },
            info.name,
        );
    }

    if let Some(path) = external {
        pending.push((id, path));
    }

    for child in children {
        attach_tree(st, robot, child, Some(id), pending);
    }

    id
}
