//! URDF description parsing into model-node trees.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use glam::{Mat4, Quat, Vec3};

use crate::joint::{JointLimits, JointType};
use crate::model::{Geometry, JointInfo, ModelError, ModelNode, ModelSource, RobotBuilder};
use crate::primitive::{generate_box_mesh, generate_cylinder_mesh, generate_sphere_mesh};

/// Builds robot model trees from URDF files.
#[derive(Debug, Clone)]
pub struct UrdfBuilder {
    /// Color used when a visual has no material.
    pub default_color: [f32; 4],
}

impl Default for UrdfBuilder {
    fn default() -> Self {
        Self {
            default_color: [0.7, 0.7, 0.7, 1.0],
        }
    }
}

impl RobotBuilder for UrdfBuilder {
    fn build(&self, source: &ModelSource) -> Result<Vec<ModelNode>, ModelError> {
        tracing::debug!(path = %source.model_path.display(), "parsing robot description");
        let robot = urdf_rs::read_file(&source.model_path)
            .map_err(|e| ModelError::Parse(e.to_string()))?;
        self.build_robot(&robot, source)
    }
}

impl UrdfBuilder {
    /// Builds the model tree from an already-parsed robot description.
    pub fn build_robot(
        &self,
        robot: &urdf_rs::Robot,
        source: &ModelSource,
    ) -> Result<Vec<ModelNode>, ModelError> {
        if robot.links.is_empty() {
            return Err(ModelError::EmptyModel);
        }

        // Robot-level material colors by name.
        let material_colors: HashMap<String, [f32; 4]> = robot
            .materials
            .iter()
            .filter_map(|m| m.color.as_ref().map(|c| (m.name.clone(), rgba(&c.rgba))))
            .collect();

        let links_by_name: HashMap<&str, &urdf_rs::Link> = robot
            .links
            .iter()
            .map(|l| (l.name.as_str(), l))
            .collect();

        let mut joints_by_parent: HashMap<&str, Vec<&urdf_rs::Joint>> = HashMap::new();
        let mut child_links: HashSet<&str> = HashSet::new();
        for joint in &robot.joints {
            joints_by_parent
                .entry(joint.parent.link.as_str())
                .or_default()
                .push(joint);
            child_links.insert(joint.child.link.as_str());
        }

        // A description may contain several disconnected trees; every link
        // that is no joint's child is a root.
        let roots: Vec<&urdf_rs::Link> = robot
            .links
            .iter()
            .filter(|l| !child_links.contains(l.name.as_str()))
            .collect();

        roots
            .into_iter()
            .map(|link| {
                self.build_link(link, &links_by_name, &joints_by_parent, &material_colors, source)
            })
            .collect()
    }

    fn build_link(
        &self,
        link: &urdf_rs::Link,
        links_by_name: &HashMap<&str, &urdf_rs::Link>,
        joints_by_parent: &HashMap<&str, Vec<&urdf_rs::Joint>>,
        material_colors: &HashMap<String, [f32; 4]>,
        source: &ModelSource,
    ) -> Result<ModelNode, ModelError> {
        let mut node = ModelNode::new(&link.name);

        for (i, visual) in link.visual.iter().enumerate() {
            node = node.with_child(self.build_visual(visual, &link.name, i, material_colors, source)?);
        }

        for joint in joints_by_parent.get(link.name.as_str()).into_iter().flatten() {
            let child_link = links_by_name
                .get(joint.child.link.as_str())
                .ok_or_else(|| ModelError::LinkNotFound(joint.child.link.clone()))?;

            let child_node = self.build_link(
                child_link,
                links_by_name,
                joints_by_parent,
                material_colors,
                source,
            )?;

            let joint_type = JointType::from(&joint.joint_type);
            let axis = Vec3::new(
                joint.axis.xyz.0[0] as f32,
                joint.axis.xyz.0[1] as f32,
                joint.axis.xyz.0[2] as f32,
            );
            let limits = if matches!(joint_type, JointType::Revolute | JointType::Prismatic) {
                Some(JointLimits::new(
                    joint.limit.lower as f32,
                    joint.limit.upper as f32,
                ))
            } else {
                None
            };

            let joint_node = ModelNode::new(&joint.name)
                .with_origin(pose_to_mat4(&joint.origin))
                .with_joint(JointInfo {
                    name: joint.name.clone(),
                    joint_type,
                    axis: axis.try_normalize().unwrap_or(Vec3::X),
                    limits,
                })
                .with_child(child_node);

            node = node.with_child(joint_node);
        }

        Ok(node)
    }

    fn build_visual(
        &self,
        visual: &urdf_rs::Visual,
        link_name: &str,
        index: usize,
        material_colors: &HashMap<String, [f32; 4]>,
        source: &ModelSource,
    ) -> Result<ModelNode, ModelError> {
        let color = visual
            .material
            .as_ref()
            .and_then(|m| {
                m.color
                    .as_ref()
                    .map(|c| rgba(&c.rgba))
                    .or_else(|| material_colors.get(&m.name).copied())
            })
            .unwrap_or(self.default_color);

        let mut origin = pose_to_mat4(&visual.origin);

        let geometry = match &visual.geometry {
            urdf_rs::Geometry::Mesh { filename, scale } => {
                let path = resolve_mesh_path(filename, source)?;
                if let Some(s) = scale {
                    // Mesh scale folds into the visual node's transform; the
                    // provider decodes files unscaled.
                    origin *= Mat4::from_scale(Vec3::new(
                        s.0[0] as f32,
                        s.0[1] as f32,
                        s.0[2] as f32,
                    ));
                }
                Geometry::External { path }
            }
            urdf_rs::Geometry::Box { size } => Geometry::Inline(
                generate_box_mesh([size.0[0] as f32, size.0[1] as f32, size.0[2] as f32])
                    .with_color(color),
            ),
            urdf_rs::Geometry::Cylinder { radius, length } => Geometry::Inline(
                generate_cylinder_mesh(*radius as f32, *length as f32).with_color(color),
            ),
            urdf_rs::Geometry::Sphere { radius } => {
                Geometry::Inline(generate_sphere_mesh(*radius as f32).with_color(color))
            }
            urdf_rs::Geometry::Capsule { radius, length } => {
                // Approximated as a cylinder.
                Geometry::Inline(
                    generate_cylinder_mesh(*radius as f32, *length as f32).with_color(color),
                )
            }
        };

        Ok(ModelNode::new(format!("{link_name}_visual_{index}"))
            .with_origin(origin)
            .with_color(color)
            .with_geometry(geometry))
    }
}

/// Resolves a URDF mesh reference against the model source.
///
/// `package://` references resolve against the package root, `file://` is
/// stripped, and relative paths resolve against the description file's
/// directory. Existence is checked by the mesh provider at load time, not
/// here; the mesh may still be streaming in.
fn resolve_mesh_path(filename: &str, source: &ModelSource) -> Result<PathBuf, ModelError> {
    if let Some(stripped) = filename.strip_prefix("package://") {
        return Ok(source.package_root.join(stripped));
    }

    let path_str = filename.strip_prefix("file://").unwrap_or(filename);
    let path = Path::new(path_str);
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let base = source
            .model_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(base.join(path))
    }
}

fn rgba(color: &urdf_rs::Vec4) -> [f32; 4] {
    [
        color.0[0] as f32,
        color.0[1] as f32,
        color.0[2] as f32,
        color.0[3] as f32,
    ]
}

fn pose_to_mat4(pose: &urdf_rs::Pose) -> Mat4 {
    let translation = Vec3::new(
        pose.xyz.0[0] as f32,
        pose.xyz.0[1] as f32,
        pose.xyz.0[2] as f32,
    );
    let rotation = Quat::from_euler(
        glam::EulerRot::XYZ,
        pose.rpy.0[0] as f32,
        pose.rpy.0[1] as f32,
        pose.rpy.0[2] as f32,
    );
    Mat4::from_rotation_translation(rotation, translation)
}
