pub mod camera;
pub mod painter;

/// How the terrain surface is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Lambert-shaded filled triangles
    Shaded,
    /// Triangle edges only
    Wireframe,
}

impl Default for RenderMode {
    fn default() -> Self {
        Self::Shaded
    }
}

impl RenderMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Shaded => "Shaded",
            Self::Wireframe => "Wireframe",
        }
    }
}
