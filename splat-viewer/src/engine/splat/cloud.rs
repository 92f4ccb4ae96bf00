use bevy::prelude::*;
use bevy::{render::mesh::PrimitiveTopology, render::render_asset::RenderAssetUsages};

/// Decoded splat centres with straight (non-premultiplied) RGBA colour.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplatCloud {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 4]>,
}

impl SplatCloud {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, position: [f32; 3], color: [f32; 4]) {
        self.positions.push(position);
        self.colors.push(color);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Axis-aligned extent of the splat centres, `None` for an empty cloud.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self.positions.iter().map(|p| Vec3::from_array(*p));
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    /// Build a point-list mesh carrying one vertex per splat.
    pub fn to_mesh(&self) -> Mesh {
        let mut mesh = Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::RENDER_WORLD);
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions.clone());
        mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, self.colors.clone());
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_all_points() {
        let mut cloud = SplatCloud::default();
        assert!(cloud.bounds().is_none());

        cloud.push([1.0, -2.0, 0.5], [1.0; 4]);
        cloud.push([-3.0, 4.0, 0.0], [1.0; 4]);
        let (min, max) = cloud.bounds().unwrap();
        assert_eq!(min, Vec3::new(-3.0, -2.0, 0.0));
        assert_eq!(max, Vec3::new(1.0, 4.0, 0.5));
    }

    #[test]
    fn mesh_has_one_vertex_per_splat() {
        let mut cloud = SplatCloud::with_capacity(3);
        for i in 0..3 {
            cloud.push([i as f32, 0.0, 0.0], [0.5, 0.5, 0.5, 1.0]);
        }
        let mesh = cloud.to_mesh();
        assert_eq!(mesh.primitive_topology(), PrimitiveTopology::PointList);
        assert_eq!(mesh.count_vertices(), 3);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_COLOR).is_some());
    }
}
