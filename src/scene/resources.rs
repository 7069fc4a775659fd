//! Graphics resource ownership per scene generation.
//!
//! The renderer hands out opaque handles; everything allocated for one
//! `SceneData` is recorded in a [`ResourceBatch`], which must be released
//! exactly once (before the next generation allocates, or on unmount).

use super::palette::Color;

/// Geometry handle issued by a [`ResourceAllocator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub u64);

/// Material handle issued by a [`ResourceAllocator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum GeometryDesc {
    Terrain { vertices: usize, triangles: usize },
    /// Shared by every marker of a generation
    MarkerSphere { radius: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc {
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
}

/// Owner of device-side geometry and materials.
pub trait ResourceAllocator {
    fn create_geometry(&mut self, desc: &GeometryDesc) -> GeometryHandle;
    fn create_material(&mut self, desc: &MaterialDesc) -> MaterialHandle;
    fn release_geometry(&mut self, handle: GeometryHandle);
    fn release_material(&mut self, handle: MaterialHandle);
}

/// Handles owned by one generation.
///
/// Not `Clone`: [`release`](Self::release) takes `self`, so a batch can be
/// released at most once.
#[derive(Debug, Default)]
pub struct ResourceBatch {
    geometries: Vec<GeometryHandle>,
    materials: Vec<MaterialHandle>,
    released: bool,
}

impl ResourceBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn geometry<R: ResourceAllocator + ?Sized>(&mut self, alloc: &mut R, desc: &GeometryDesc) -> GeometryHandle {
        let handle = alloc.create_geometry(desc);
        self.geometries.push(handle);
        handle
    }

    pub fn material<R: ResourceAllocator + ?Sized>(&mut self, alloc: &mut R, desc: &MaterialDesc) -> MaterialHandle {
        let handle = alloc.create_material(desc);
        self.materials.push(handle);
        handle
    }

    pub fn len(&self) -> usize {
        self.geometries.len() + self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release every handle back to `alloc`.
    pub fn release<R: ResourceAllocator + ?Sized>(mut self, alloc: &mut R) {
        for handle in self.geometries.drain(..) {
            alloc.release_geometry(handle);
        }
        for handle in self.materials.drain(..) {
            alloc.release_material(handle);
        }
        self.released = true;
    }
}

impl Drop for ResourceBatch {
    fn drop(&mut self) {
        if !self.released && !self.is_empty() {
            log::error!(
                "Resource batch dropped without release: {} geometries, {} materials leaked",
                self.geometries.len(),
                self.materials.len()
            );
        }
    }
}

/// Allocator that only counts handles. Used when nothing device-side backs
/// the scene (the egui painter draws straight from the CPU-side meshes).
#[derive(Debug, Default)]
pub struct CountingAllocator {
    next_id: u64,
    live_geometries: usize,
    live_materials: usize,
}

impl CountingAllocator {
    pub fn live(&self) -> (usize, usize) {
        (self.live_geometries, self.live_materials)
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl ResourceAllocator for CountingAllocator {
    fn create_geometry(&mut self, _desc: &GeometryDesc) -> GeometryHandle {
        self.live_geometries += 1;
        GeometryHandle(self.next())
    }

    fn create_material(&mut self, _desc: &MaterialDesc) -> MaterialHandle {
        self.live_materials += 1;
        MaterialHandle(self.next())
    }

    fn release_geometry(&mut self, _handle: GeometryHandle) {
        self.live_geometries = self.live_geometries.saturating_sub(1);
    }

    fn release_material(&mut self, _handle: MaterialHandle) {
        self.live_materials = self.live_materials.saturating_sub(1);
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Event {
        CreateGeometry(GeometryHandle),
        CreateMaterial(MaterialHandle),
        ReleaseGeometry(GeometryHandle),
        ReleaseMaterial(MaterialHandle),
    }

    /// Test double logging every allocator call in order.
    #[derive(Debug, Default)]
    pub struct RecordingAllocator {
        next_id: u64,
        pub events: Vec<Event>,
    }

    impl RecordingAllocator {
        pub fn index_of(&self, event: &Event) -> Option<usize> {
            self.events.iter().position(|e| e == event)
        }

        pub fn created_geometries(&self) -> Vec<GeometryHandle> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::CreateGeometry(h) => Some(*h),
                    _ => None,
                })
                .collect()
        }

        pub fn created_materials(&self) -> Vec<MaterialHandle> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::CreateMaterial(h) => Some(*h),
                    _ => None,
                })
                .collect()
        }
    }

    impl ResourceAllocator for RecordingAllocator {
        fn create_geometry(&mut self, _desc: &GeometryDesc) -> GeometryHandle {
            self.next_id += 1;
            let h = GeometryHandle(self.next_id);
            self.events.push(Event::CreateGeometry(h));
            h
        }

        fn create_material(&mut self, _desc: &MaterialDesc) -> MaterialHandle {
            self.next_id += 1;
            let h = MaterialHandle(self.next_id);
            self.events.push(Event::CreateMaterial(h));
            h
        }

        fn release_geometry(&mut self, handle: GeometryHandle) {
            self.events.push(Event::ReleaseGeometry(handle));
        }

        fn release_material(&mut self, handle: MaterialHandle) {
            self.events.push(Event::ReleaseMaterial(handle));
        }
    }
}
