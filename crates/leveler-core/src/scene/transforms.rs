//! Object and world transform calculations

use glam::{EulerRot, Mat4, Quat};

use super::{Scene, SceneObject};

impl SceneObject {
    /// Rotation from the XYZ Euler angles
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation_euler.x,
            self.rotation_euler.y,
            self.rotation_euler.z,
        )
    }

    /// Transform from location, rotation and scale alone
    pub fn matrix_basis(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation(), self.location)
    }

    /// Transform relative to the parent (identity parent inverse for unparented objects)
    pub fn matrix_local(&self) -> Mat4 {
        self.parent_inverse * self.matrix_basis()
    }
}

impl Scene {
    /// Parent object, if the reference resolves
    pub fn parent_of(&self, object: &SceneObject) -> Option<&SceneObject> {
        object.parent.as_deref().and_then(|name| self.object(name))
    }

    /// World transform of an object
    ///
    /// Walks the parent chain and applies local transforms from the root down.
    /// A chain that loops back on itself is cut at the first repeated object.
    pub fn world_matrix(&self, object: &SceneObject) -> Mat4 {
        let mut chain: Vec<&SceneObject> = vec![object];
        let mut current = self.parent_of(object);
        while let Some(parent) = current {
            if chain.iter().any(|o| o.name == parent.name) {
                tracing::warn!("Parent cycle detected at '{}'", parent.name);
                break;
            }
            chain.push(parent);
            current = self.parent_of(parent);
        }

        chain
            .into_iter()
            .rev()
            .fold(Mat4::IDENTITY, |transform, o| transform * o.matrix_local())
    }
}
