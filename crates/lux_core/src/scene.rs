//! The compiled scene and the builder that produces it.
//!
//! A [`Scene`] is immutable while rendering: shapes, materials and textures
//! live in flat arrays addressed by id, triangles sit behind a flat BVH, and
//! planes and spheres are kept in a short residual list that the kernel tests
//! linearly. Camera and sky may be replaced between passes.

use glam::{Vec2, Vec3};

use crate::error::{SceneError, SceneResult};
use crate::{
    Bvh, Camera, Material, MaterialId, Shape, ShapeId, ShapeRecord, SkyParams, SkySettings,
    Texture, TextureId, Triangle,
};

/// A compiled, validated scene.
#[derive(Debug, Clone)]
pub struct Scene {
    shapes: Vec<ShapeRecord>,
    materials: Vec<Material>,
    textures: Vec<Texture>,
    bvh: Bvh,
    /// Shapes not in the BVH (planes and spheres)
    unbounded: Vec<ShapeId>,
    camera: Camera,
    sky_settings: SkySettings,
    sky: SkyParams,
}

impl Scene {
    /// Get a shape record by id.
    #[inline]
    pub fn shape(&self, id: ShapeId) -> &ShapeRecord {
        &self.shapes[id.index()]
    }

    /// Get a material by id.
    #[inline]
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.index()]
    }

    /// Get a texture by id.
    #[inline]
    pub fn texture(&self, id: TextureId) -> &Texture {
        &self.textures[id.index()]
    }

    /// All shape records, indexed by `ShapeId`.
    pub fn shapes(&self) -> &[ShapeRecord] {
        &self.shapes
    }

    /// The flat BVH over triangles.
    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Shapes tested linearly after BVH traversal.
    pub fn unbounded(&self) -> &[ShapeId] {
        &self.unbounded
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn sky(&self) -> &SkyParams {
        &self.sky
    }

    pub fn sky_settings(&self) -> &SkySettings {
        &self.sky_settings
    }

    /// Replace the camera. Accumulated samples become stale; reset them.
    pub fn set_camera(&mut self, camera: Camera) -> SceneResult<()> {
        camera.validate()?;
        self.camera = camera;
        Ok(())
    }

    /// Replace sky settings and recompute the Perez coefficients.
    /// Accumulated samples become stale; reset them.
    pub fn set_sky(&mut self, settings: SkySettings) -> SceneResult<()> {
        settings.validate()?;
        self.sky_settings = settings;
        self.sky = SkyParams::new(&settings);
        Ok(())
    }

    /// Get the number of shapes.
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Get the number of triangles held by the BVH.
    pub fn triangle_count(&self) -> usize {
        self.bvh.leaf_shapes.len()
    }

    /// Check every cross-reference the kernel relies on.
    pub fn validate(&self) -> SceneResult<()> {
        self.camera.validate()?;
        self.sky_settings.validate()?;
        self.bvh.validate(self.shapes.len())?;

        for shape in &self.unbounded {
            if shape.index() >= self.shapes.len() {
                return Err(SceneError::ShapeOutOfRange {
                    shape: shape.0,
                    count: self.shapes.len(),
                });
            }
        }

        for (i, record) in self.shapes.iter().enumerate() {
            let shape = i as u32;
            if record.material.index() >= self.materials.len() {
                return Err(SceneError::MaterialOutOfRange {
                    shape,
                    material: record.material.0,
                    count: self.materials.len(),
                });
            }
            for texture in std::iter::once(record.albedo).chain(record.normal_map) {
                if texture.index() >= self.textures.len() {
                    return Err(SceneError::TextureOutOfRange {
                        shape,
                        texture: texture.0,
                        count: self.textures.len(),
                    });
                }
            }
        }

        for (i, texture) in self.textures.iter().enumerate() {
            if let Texture::Image(image) = texture {
                if image.pixels.is_empty() {
                    return Err(SceneError::EmptyImage(i as u32));
                }
                if image.pixels.len() != image.width as usize * image.height as usize {
                    return Err(SceneError::TextureSizeMismatch {
                        texture: i as u32,
                        width: image.width,
                        height: image.height,
                        pixels: image.pixels.len(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Collects scene data and compiles it into a [`Scene`].
#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    shapes: Vec<ShapeRecord>,
    materials: Vec<Material>,
    textures: Vec<Texture>,
    camera: Camera,
    sky: SkySettings,
}

impl SceneBuilder {
    /// Create an empty builder with a default camera and sky.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a texture and return its ID.
    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(texture);
        id
    }

    /// Add a material and return its ID.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(material);
        id
    }

    /// Add a shape and return its ID.
    pub fn add_shape(&mut self, record: ShapeRecord) -> ShapeId {
        let id = ShapeId(self.shapes.len() as u32);
        self.shapes.push(record);
        id
    }

    /// Add an indexed triangle mesh. Every triangle copies `template`'s
    /// material, textures and emission.
    ///
    /// Missing normals fall back to face normals and missing UVs to (0, 0).
    /// Returns the ids of the added triangles. Nothing is added if any index
    /// is out of range for its attribute array.
    pub fn add_mesh(
        &mut self,
        positions: &[Vec3],
        normals: Option<&[Vec3]>,
        uvs: Option<&[Vec2]>,
        indices: &[[u32; 3]],
        template: ShapeRecord,
    ) -> SceneResult<Vec<ShapeId>> {
        let triangles = indices
            .iter()
            .enumerate()
            .map(|(i, &corners)| -> SceneResult<Triangle> {
                let vertices = gather(positions, corners, i, "position")?;
                let face = (vertices[1] - vertices[0])
                    .cross(vertices[2] - vertices[0])
                    .normalize_or_zero();
                let normals = match normals {
                    Some(n) => gather(n, corners, i, "normal")?,
                    None => [face; 3],
                };
                let uvs = match uvs {
                    Some(t) => gather(t, corners, i, "uv")?,
                    None => [Vec2::ZERO; 3],
                };
                Ok(Triangle::new(vertices, normals, uvs))
            })
            .collect::<SceneResult<Vec<_>>>()?;

        Ok(triangles
            .into_iter()
            .map(|triangle| {
                self.add_shape(ShapeRecord {
                    shape: Shape::Triangle(triangle),
                    ..template
                })
            })
            .collect())
    }

    /// Set the camera.
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    /// Set the sky.
    pub fn with_sky(mut self, sky: SkySettings) -> Self {
        self.sky = sky;
        self
    }

    /// Build the BVH, compute sky coefficients and validate.
    pub fn build(self) -> SceneResult<Scene> {
        let mut bounded = Vec::new();
        let mut unbounded = Vec::new();

        for (i, record) in self.shapes.iter().enumerate() {
            let id = ShapeId(i as u32);
            match record.shape.bounding_box() {
                Some(bbox) if record.shape.is_bvh_candidate() => bounded.push((id, bbox)),
                _ => unbounded.push(id),
            }
        }

        let bvh = Bvh::build(bounded);

        log::info!(
            "Compiled scene: {} shapes ({} in BVH, {} linear), {} BVH nodes, {} materials, {} textures",
            self.shapes.len(),
            bvh.leaf_shapes.len(),
            unbounded.len(),
            bvh.len(),
            self.materials.len(),
            self.textures.len()
        );

        let scene = Scene {
            shapes: self.shapes,
            materials: self.materials,
            textures: self.textures,
            bvh,
            unbounded,
            camera: self.camera,
            sky: SkyParams::new(&self.sky),
            sky_settings: self.sky,
        };
        scene.validate()?;
        Ok(scene)
    }
}

/// Fetch the three corners of `triangle` from one mesh attribute array.
fn gather<T: Copy>(
    data: &[T],
    corners: [u32; 3],
    triangle: usize,
    attribute: &'static str,
) -> SceneResult<[T; 3]> {
    let get = |index: u32| {
        data.get(index as usize)
            .copied()
            .ok_or(SceneError::MeshIndexOutOfRange {
                triangle,
                attribute,
                index,
                len: data.len(),
            })
    };
    Ok([get(corners[0])?, get(corners[1])?, get(corners[2])?])
}
