//! Scene graph with dirty-flag render coordination.

use std::collections::HashMap;

use glam::Mat4;
use uuid::Uuid;

use crate::bounds::BoundingBox;
use crate::mesh::MeshStore;
use crate::node::SceneNode;
use crate::up_axis::UpAxis;

/// The live scene.
///
/// Nodes are stored flat and addressed by id; topology lives in the
/// `children`/`parent` maps. The scene is the single source of truth for
/// what should appear on screen, and its dirty flag is the only signal the
/// render loop consults to decide whether a redraw is warranted.
pub struct Scene {
    nodes: HashMap<Uuid, SceneNode>,
    children: HashMap<Uuid, Vec<Uuid>>,
    parent: HashMap<Uuid, Uuid>,
    roots: Vec<Uuid>,
    up_axis: UpAxis,
    ground_level: f32,
    dirty: bool,
}

impl Scene {
    /// Creates an empty scene with the default (+Y) orientation.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            children: HashMap::new(),
            parent: HashMap::new(),
            roots: Vec::new(),
            up_axis: UpAxis::default(),
            ground_level: 0.0,
            dirty: false,
        }
    }

    /// Returns true if the scene has changed since the last redraw.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Marks the scene as needing a redraw.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clears the dirty flag. Called only after a redraw has been performed.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Attaches a node under a parent, or as a scene root when `parent` is
    /// `None`. Returns the node's id.
    pub fn attach(&mut self, node: SceneNode, parent: Option<Uuid>) -> Uuid {
        let id = node.id;
        self.nodes.insert(id, node);

        match parent {
            Some(parent_id) => {
                self.children.entry(parent_id).or_default().push(id);
                self.parent.insert(id, parent_id);
            }
            None => self.roots.push(id),
        }

        self.dirty = true;
        id
    }

    /// Gets a node by id.
    pub fn node(&self, id: Uuid) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Gets a mutable reference to a node (marks the scene dirty).
    pub fn node_mut(&mut self, id: Uuid) -> Option<&mut SceneNode> {
        self.dirty = true;
        self.nodes.get_mut(&id)
    }

    /// Returns true if the scene contains the node.
    pub fn contains(&self, id: Uuid) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes in the scene.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the scene has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The scene root ids, in attach order.
    pub fn roots(&self) -> &[Uuid] {
        &self.roots
    }

    /// Child ids of a node, in attach order.
    pub fn children_of(&self, id: Uuid) -> &[Uuid] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Collects a subtree in children-before-parent order.
    fn subtree_postorder(&self, id: Uuid) -> Vec<Uuid> {
        let mut order = Vec::new();
        self.collect_postorder(id, &mut order);
        order
    }

    fn collect_postorder(&self, id: Uuid, order: &mut Vec<Uuid>) {
        for child in self.children_of(id).to_vec() {
            self.collect_postorder(child, order);
        }
        order.push(id);
    }

    /// Detaches and disposes a subtree, releasing mesh resources.
    ///
    /// Children are removed before their parents so no child outlives its
    /// parent's disposal. Mesh handles are released into the store, dropping
    /// the underlying data.
    pub fn dispose(&mut self, id: Uuid, meshes: &mut MeshStore) {
        if !self.nodes.contains_key(&id) {
            return;
        }

        // Unlink from the parent side first.
        if let Some(parent_id) = self.parent.get(&id).copied() {
            if let Some(siblings) = self.children.get_mut(&parent_id) {
                siblings.retain(|c| *c != id);
            }
        }
        self.roots.retain(|r| *r != id);

        let mut released = 0;
        for node_id in self.subtree_postorder(id) {
            self.children.remove(&node_id);
            self.parent.remove(&node_id);
            if let Some(node) = self.nodes.remove(&node_id) {
                if let Some(handle) = node.mesh {
                    meshes.remove(handle);
                    released += 1;
                }
            }
        }

        tracing::debug!(%id, released, "disposed subtree");
        self.dirty = true;
    }

    /// World transform of a node: the root orientation composed with every
    /// local transform from the root down to the node.
    pub fn world_transform(&self, id: Uuid) -> Mat4 {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            chain.push(node_id);
            current = self.parent.get(&node_id).copied();
        }

        let mut transform = Mat4::from_quat(self.up_axis.orientation());
        for node_id in chain.into_iter().rev() {
            if let Some(node) = self.nodes.get(&node_id) {
                transform *= node.local_transform;
            }
        }
        transform
    }

    /// Marks a subtree's geometry as shadow-casting.
    pub fn mark_shadow_casting(&mut self, id: Uuid) {
        for node_id in self.subtree_postorder(id) {
            if let Some(node) = self.nodes.get_mut(&node_id) {
                if node.has_geometry() {
                    node.casts_shadow = true;
                }
            }
        }
    }

    /// Computes the world-space bounding box of all visible geometry.
    ///
    /// Returns `None` when nothing in the scene has a mesh.
    pub fn compute_bounds(&self, meshes: &MeshStore) -> Option<BoundingBox> {
        let mut result: Option<BoundingBox> = None;

        let mut stack: Vec<(Uuid, Mat4)> = self
            .roots
            .iter()
            .map(|id| (*id, Mat4::from_quat(self.up_axis.orientation())))
            .collect();

        while let Some((id, parent_transform)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            let world = parent_transform * node.local_transform;

            if node.visible {
                if let Some(data) = node.mesh.and_then(|h| meshes.get(h)) {
                    let world_bounds = data.bounds.transform(&world);
                    result = Some(match result {
                        Some(current) => current.union(&world_bounds),
                        None => world_bounds,
                    });
                }
            }

            for child in self.children_of(id) {
                stack.push((*child, world));
            }
        }

        result
    }

    /// Sets the up axis. The root orientation is always computed absolutely
    /// from the specifier, never relative to the previous orientation.
    pub fn set_up_axis(&mut self, up_axis: UpAxis) {
        self.up_axis = up_axis;
        self.dirty = true;
    }

    /// The current up axis.
    pub fn up_axis(&self) -> UpAxis {
        self.up_axis
    }

    /// Stores the shadow ground-plane level (world Y).
    pub fn set_ground_level(&mut self, level: f32) {
        self.ground_level = level;
    }

    /// The shadow ground-plane level.
    pub fn ground_level(&self) -> f32 {
        self.ground_level
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
