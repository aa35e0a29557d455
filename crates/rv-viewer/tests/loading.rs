//! End-to-end tests of the load state machine and render coordination,
//! driven through fake collaborators.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use glam::{Mat4, Vec3};
use tokio::time::timeout;

use rv_model::{
    Geometry, JointInfo, JointType, MeshProvider, ModelError, ModelNode, ModelSource,
    RobotBuilder,
};
use rv_scene::{MeshData, MeshStore, Scene};
use rv_viewer::{LoadOutcome, RenderSurface, RobotViewer, ViewerConfig, ViewerError, ViewerEvent};

/// Builds one-robot models named after the source file stem, with a single
/// revolute joint and a configurable number of external meshes.
struct FakeBuilder {
    delays: HashMap<PathBuf, Duration>,
    failing: HashSet<PathBuf>,
    meshes_per_model: usize,
}

impl FakeBuilder {
    fn new(meshes_per_model: usize) -> Self {
        Self {
            delays: HashMap::new(),
            failing: HashSet::new(),
            meshes_per_model,
        }
    }

    fn with_delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(PathBuf::from(path), delay);
        self
    }

    fn with_failure(mut self, path: &str) -> Self {
        self.failing.insert(PathBuf::from(path));
        self
    }
}

impl RobotBuilder for FakeBuilder {
    fn build(&self, source: &ModelSource) -> Result<Vec<ModelNode>, ModelError> {
        if let Some(delay) = self.delays.get(&source.model_path) {
            std::thread::sleep(*delay);
        }
        if self.failing.contains(&source.model_path) {
            return Err(ModelError::Parse("intentionally broken".into()));
        }

        let stem = source
            .model_path
            .file_stem()
            .unwrap()
            .to_string_lossy()
            .to_string();

        let joint_name = format!("{stem}_joint");
        let mut root = ModelNode::new(&stem).with_child(
            ModelNode::new(&joint_name)
                .with_origin(Mat4::from_translation(Vec3::Z))
                .with_joint(JointInfo {
                    name: joint_name.clone(),
                    joint_type: JointType::Revolute,
                    axis: Vec3::Z,
                    limits: None,
                }),
        );

        for i in 0..self.meshes_per_model {
            root = root.with_child(
                ModelNode::new(format!("{stem}_visual_{i}")).with_geometry(Geometry::External {
                    path: PathBuf::from(format!("/meshes/{stem}_{i}.stl")),
                }),
            );
        }

        Ok(vec![root])
    }
}

/// Serves a small triangle for every path, with an optional delay. Paths
/// containing the failure marker return an error instead.
struct FakeProvider {
    delay: Duration,
    fail_marker: Option<&'static str>,
}

impl FakeProvider {
    fn instant() -> Self {
        Self {
            delay: Duration::ZERO,
            fail_marker: None,
        }
    }

    fn slow(millis: u64) -> Self {
        Self {
            delay: Duration::from_millis(millis),
            fail_marker: None,
        }
    }
}

impl MeshProvider for FakeProvider {
    fn load(&self, path: &Path) -> Result<MeshData, ModelError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if let Some(marker) = self.fail_marker {
            if path.to_string_lossy().contains(marker) {
                return Err(ModelError::MeshLoad {
                    path: path.to_string_lossy().to_string(),
                    reason: "intentionally broken".into(),
                });
            }
        }
        Ok(MeshData::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0.0, 0.0, 1.0]; 3],
            vec![0, 1, 2],
        ))
    }
}

struct TestSurface {
    redraws: Arc<AtomicUsize>,
}

impl RenderSurface for TestSurface {
    fn advance_controls(&mut self) -> bool {
        false
    }

    fn resize(&mut self, _width: u32, _height: u32) {}

    fn redraw(&mut self, _scene: &Scene, _meshes: &MeshStore) {
        self.redraws.fetch_add(1, Ordering::SeqCst);
    }
}

fn make_viewer(builder: FakeBuilder, provider: FakeProvider) -> RobotViewer {
    let config = ViewerConfig {
        tick_interval_ms: 5,
        ..ViewerConfig::default()
    };
    RobotViewer::new(Arc::new(builder), Arc::new(provider), &config)
}

fn source(path: &str) -> ModelSource {
    ModelSource::new("/packages", path)
}

async fn recv_event(
    rx: &mut tokio::sync::broadcast::Receiver<ViewerEvent>,
) -> ViewerEvent {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

#[tokio::test(flavor = "multi_thread")]
async fn overlapping_loads_only_latest_attaches() {
    let builder = FakeBuilder::new(2).with_delay("/robots/a.urdf", Duration::from_millis(150));
    let viewer = make_viewer(builder, FakeProvider::instant());
    let mut rx = viewer.subscribe();

    let (first, second) = tokio::join!(
        viewer.load(source("/robots/a.urdf")),
        viewer.load(source("/robots/b.urdf")),
    );

    // The slow first request was superseded by the second.
    assert_eq!(first.unwrap(), LoadOutcome::Superseded);
    assert_eq!(second.unwrap(), LoadOutcome::Applied);

    assert_eq!(viewer.robot_names(), vec!["b".to_string()]);
    let angles = viewer.joint_angles();
    assert!(angles.contains_key("b_joint"));
    assert!(!angles.contains_key("a_joint"));

    // Exactly one generation's notifications fire.
    assert_eq!(recv_event(&mut rx).await, ViewerEvent::ModelProcessed);
    assert_eq!(recv_event(&mut rx).await, ViewerEvent::GeometryLoaded);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err());

    // Only the surviving generation's meshes are resident.
    assert_eq!(viewer.mesh_count(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn same_source_twice_is_a_noop() {
    let viewer = make_viewer(
        FakeBuilder::new(1),
        FakeProvider::instant(),
    );
    let mut rx = viewer.subscribe();

    let src = source("/robots/arm.urdf");
    assert_eq!(viewer.load(src.clone()).await.unwrap(), LoadOutcome::Applied);
    assert_eq!(recv_event(&mut rx).await, ViewerEvent::ModelProcessed);
    assert_eq!(recv_event(&mut rx).await, ViewerEvent::GeometryLoaded);

    let meshes_before = viewer.mesh_count();
    assert_eq!(viewer.load(src).await.unwrap(), LoadOutcome::Unchanged);

    // No new load, no disposal, no further events.
    assert_eq!(viewer.mesh_count(), meshes_before);
    assert_eq!(viewer.robot_names(), vec!["arm".to_string()]);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_load_keeps_previous_model_visible() {
    let builder = FakeBuilder::new(1).with_failure("/robots/broken.urdf");
    let viewer = make_viewer(builder, FakeProvider::instant());
    let mut rx = viewer.subscribe();

    assert_eq!(
        viewer.load(source("/robots/good.urdf")).await.unwrap(),
        LoadOutcome::Applied
    );
    assert_eq!(recv_event(&mut rx).await, ViewerEvent::ModelProcessed);
    assert_eq!(recv_event(&mut rx).await, ViewerEvent::GeometryLoaded);

    let result = viewer.load(source("/robots/broken.urdf")).await;
    assert!(matches!(result, Err(ViewerError::Model(_))));

    // The good model is still attached and articulable.
    assert_eq!(viewer.robot_names(), vec!["good".to_string()]);
    viewer.set_joint_angle("good_joint", 45.0);
    assert_eq!(viewer.joint_angles()["good_joint"], 45.0);

    // A failed load emits nothing.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn geometry_loaded_fires_exactly_once() {
    let viewer = make_viewer(
        FakeBuilder::new(4),
        FakeProvider::slow(10),
    );
    let mut rx = viewer.subscribe();

    viewer.load(source("/robots/arm.urdf")).await.unwrap();
    assert_eq!(recv_event(&mut rx).await, ViewerEvent::ModelProcessed);
    assert_eq!(recv_event(&mut rx).await, ViewerEvent::GeometryLoaded);

    // All four meshes completed; equality held once, the signal fired once.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(viewer.mesh_count(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn angle_mapping_round_trips() {
    let viewer = make_viewer(
        FakeBuilder::new(0),
        FakeProvider::instant(),
    );
    viewer.load(source("/robots/arm.urdf")).await.unwrap();

    let mut mapping = HashMap::new();
    mapping.insert("arm_joint".to_string(), -30.0_f32);
    mapping.insert("nonexistent".to_string(), 99.0);
    viewer.set_joint_angles(&mapping);

    let angles = viewer.joint_angles();
    assert_eq!(angles["arm_joint"], -30.0);
    assert!(!angles.contains_key("nonexistent"));

    // Unknown joints never throw and change nothing.
    viewer.set_joint_angle("also_missing", 10.0);
    assert_eq!(viewer.joint_angles()["arm_joint"], -30.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn supersede_during_mesh_streaming_still_completes() {
    // Load A attaches and starts streaming a large mesh batch; load B
    // supersedes it while those tasks are still in flight. A's discarded
    // tasks must not leak counts into B's generation: B's geometry signal
    // still fires, exactly once.
    let viewer = make_viewer(FakeBuilder::new(32), FakeProvider::slow(50));
    let mut rx = viewer.subscribe();

    assert_eq!(
        viewer.load(source("/robots/a.urdf")).await.unwrap(),
        LoadOutcome::Applied
    );
    assert_eq!(
        viewer.load(source("/robots/b.urdf")).await.unwrap(),
        LoadOutcome::Applied
    );

    assert_eq!(recv_event(&mut rx).await, ViewerEvent::ModelProcessed);
    assert_eq!(recv_event(&mut rx).await, ViewerEvent::ModelProcessed);
    assert_eq!(recv_event(&mut rx).await, ViewerEvent::GeometryLoaded);

    // Only B's robot and meshes survive, and no second signal arrives.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(viewer.robot_names(), vec!["b".to_string()]);
    assert_eq!(viewer.mesh_count(), 32);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_meshes_count_toward_completion() {
    let provider = FakeProvider {
        delay: Duration::ZERO,
        fail_marker: Some("_1"),
    };
    let viewer = make_viewer(FakeBuilder::new(3), provider);
    let mut rx = viewer.subscribe();

    viewer.load(source("/robots/arm.urdf")).await.unwrap();
    assert_eq!(recv_event(&mut rx).await, ViewerEvent::ModelProcessed);
    // One of three meshes fails, yet the batch still completes, once.
    assert_eq!(recv_event(&mut rx).await, ViewerEvent::GeometryLoaded);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());

    // The failed visual stays attached without geometry; the others loaded.
    assert_eq!(viewer.mesh_count(), 2);
    assert_eq!(viewer.robot_names(), vec!["arm".to_string()]);
    assert!(viewer.bounds().is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn render_loop_redraws_once_per_mutation() {
    let mut viewer = make_viewer(
        FakeBuilder::new(1),
        FakeProvider::instant(),
    );
    let mut rx = viewer.subscribe();
    let redraws = Arc::new(AtomicUsize::new(0));
    viewer.start_rendering(TestSurface {
        redraws: Arc::clone(&redraws),
    });
    assert!(viewer.is_rendering());

    viewer.load(source("/robots/arm.urdf")).await.unwrap();
    assert_eq!(recv_event(&mut rx).await, ViewerEvent::ModelProcessed);
    assert_eq!(recv_event(&mut rx).await, ViewerEvent::GeometryLoaded);

    // Let the loop drain the load's dirty flags, then verify idleness.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let settled = redraws.load(Ordering::SeqCst);
    assert!(settled >= 1);
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(redraws.load(Ordering::SeqCst), settled);

    // One mutation, one redraw.
    viewer.set_joint_angle("arm_joint", 15.0);
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(redraws.load(Ordering::SeqCst), settled + 1);

    viewer.stop_rendering();
    assert!(!viewer.is_rendering());
}
