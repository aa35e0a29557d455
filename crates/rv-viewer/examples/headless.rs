//! Headless viewer demo: loads a URDF file, streams its meshes, and logs
//! redraws instead of drawing.
//!
//! Usage: headless <robot.urdf> [package_root]

use std::sync::Arc;
use std::time::Duration;

use rv_model::{ModelSource, StlMeshProvider, UrdfBuilder};
use rv_scene::{MeshStore, Scene};
use rv_viewer::{RenderSurface, RobotViewer, ViewerConfig, ViewerEvent};

struct LoggingSurface;

impl RenderSurface for LoggingSurface {
    fn advance_controls(&mut self) -> bool {
        false
    }

    fn resize(&mut self, width: u32, height: u32) {
        tracing::info!(width, height, "viewport resized");
    }

    fn redraw(&mut self, scene: &Scene, meshes: &MeshStore) {
        tracing::info!(nodes = scene.len(), meshes = meshes.len(), "redraw");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rv_viewer=debug,rv_model=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let model_path = args
        .next()
        .ok_or("usage: headless <robot.urdf> [package_root]")?;
    let package_root = args.next().unwrap_or_else(|| ".".to_string());

    let config = ViewerConfig::default();
    let mut viewer = RobotViewer::new(
        Arc::new(UrdfBuilder {
            default_color: config.default_color,
        }),
        Arc::new(StlMeshProvider),
        &config,
    );
    let mut events = viewer.subscribe();

    viewer.start_rendering(LoggingSurface);
    viewer.load(ModelSource::new(package_root, model_path)).await?;

    // Wait for the mesh stream to finish, then articulate a bit. Models
    // built purely from primitives stream no meshes, hence the timeout.
    loop {
        match tokio::time::timeout(Duration::from_secs(10), events.recv()).await {
            Ok(event) => match event? {
                ViewerEvent::ModelProcessed => {
                    tracing::info!(robots = ?viewer.robot_names(), "model attached");
                }
                ViewerEvent::GeometryLoaded => break,
            },
            Err(_) => break,
        }
    }
    tracing::info!(meshes = viewer.mesh_count(), bounds = ?viewer.bounds(), "geometry loaded");

    for (name, _) in viewer.joint_angles() {
        viewer.set_joint_angle(&name, 30.0);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    tracing::info!(angles = ?viewer.joint_angles(), "final pose");

    viewer.stop_rendering();
    Ok(())
}
