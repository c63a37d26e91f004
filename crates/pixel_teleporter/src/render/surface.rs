//! Drawing interface to the host graphics layer
//!
//! Backends never talk to a graphics API directly. They issue primitives to
//! a [`DrawSurface`], which the host application implements on top of
//! whatever it draws with. [`CommandRecorder`] is the headless
//! implementation: it records every call as a [`DrawCommand`] for tests,
//! logging and replay.

use crate::foundation::math::{Vec2, Vec3};

/// Opaque handle to a texture created on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// How drawn colors combine with what is already on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source over destination
    #[default]
    Normal,
    /// Colors add; overlapping lights brighten
    Additive,
}

/// Values fed to a point-sprite style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderUniforms {
    /// Sprite size
    pub weight: f32,
    /// Ambient light as a 0-1 fraction
    pub ambient: f32,
    /// Radial falloff exponent
    pub falloff: f32,
    /// Seconds since the surface started
    pub time: f32,
}

/// Single-channel intensity image uploaded as a texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Width in texels
    pub width: usize,
    /// Height in texels
    pub height: usize,
    /// Row-major intensities, `width * height` long
    pub texels: Vec<u8>,
}

impl Image {
    /// Intensity at `(x, y)`
    pub fn texel(&self, x: usize, y: usize) -> u8 {
        self.texels[y * self.width + x]
    }
}

/// Host graphics layer the backends draw through
pub trait DrawSurface {
    /// Filled circle in the x/y plane
    fn circle(&mut self, center: Vec2, diameter: f32, color: u32);

    /// Point sprite in space, drawn with the bound style
    fn point(&mut self, position: Vec3, size: f32, color: u32);

    /// Line segment in space
    fn line(&mut self, start: Vec3, end: Vec3, color: u32);

    /// Textured square centered at `center`, modulated by `tint`
    fn sprite(&mut self, texture: TextureId, center: Vec2, size: f32, tint: u32);

    /// Bind a named style for subsequent points
    fn bind_style(&mut self, style: &str, uniforms: &ShaderUniforms);

    /// Change the blend mode for subsequent primitives
    fn set_blend(&mut self, mode: BlendMode);

    /// Upload an image and return a handle for [`DrawSurface::sprite`]
    fn create_texture(&mut self, image: &Image) -> TextureId;

    /// Seconds since the surface started, used to animate styles
    fn elapsed_seconds(&self) -> f32;
}

/// One recorded surface call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// See [`DrawSurface::circle`]
    Circle {
        /// Center in the x/y plane
        center: Vec2,
        /// Diameter in world units
        diameter: f32,
        /// Packed fill color
        color: u32,
    },
    /// See [`DrawSurface::point`]
    Point {
        /// Position in world units
        position: Vec3,
        /// Sprite size
        size: f32,
        /// Packed color
        color: u32,
    },
    /// See [`DrawSurface::line`]
    Line {
        /// Start point
        start: Vec3,
        /// End point
        end: Vec3,
        /// Packed color
        color: u32,
    },
    /// See [`DrawSurface::sprite`]
    Sprite {
        /// Texture drawn
        texture: TextureId,
        /// Center in the x/y plane
        center: Vec2,
        /// Edge length in world units
        size: f32,
        /// Packed tint
        tint: u32,
    },
    /// See [`DrawSurface::bind_style`]
    BindStyle {
        /// Style identifier
        style: String,
        /// Uniform values
        uniforms: ShaderUniforms,
    },
    /// See [`DrawSurface::set_blend`]
    Blend(BlendMode),
    /// See [`DrawSurface::create_texture`]
    CreateTexture {
        /// Handle returned
        texture: TextureId,
        /// Width in texels
        width: usize,
        /// Height in texels
        height: usize,
    },
}

/// Surface that records every call instead of drawing
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
    next_texture: u32,
    elapsed: f32,
}

impl CommandRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded commands in call order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the recorder empty
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Forget recorded commands
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Set the time reported by [`DrawSurface::elapsed_seconds`]
    pub fn set_elapsed(&mut self, seconds: f32) {
        self.elapsed = seconds;
    }

    /// Number of recorded commands matching `predicate`
    pub fn count(&self, predicate: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|cmd| predicate(cmd)).count()
    }

    /// True if nothing was drawn since the last clear
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl DrawSurface for CommandRecorder {
    fn circle(&mut self, center: Vec2, diameter: f32, color: u32) {
        self.commands.push(DrawCommand::Circle { center, diameter, color });
    }

    fn point(&mut self, position: Vec3, size: f32, color: u32) {
        self.commands.push(DrawCommand::Point { position, size, color });
    }

    fn line(&mut self, start: Vec3, end: Vec3, color: u32) {
        self.commands.push(DrawCommand::Line { start, end, color });
    }

    fn sprite(&mut self, texture: TextureId, center: Vec2, size: f32, tint: u32) {
        self.commands.push(DrawCommand::Sprite {
            texture,
            center,
            size,
            tint,
        });
    }

    fn bind_style(&mut self, style: &str, uniforms: &ShaderUniforms) {
        self.commands.push(DrawCommand::BindStyle {
            style: style.to_string(),
            uniforms: *uniforms,
        });
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.commands.push(DrawCommand::Blend(mode));
    }

    fn create_texture(&mut self, image: &Image) -> TextureId {
        let texture = TextureId(self.next_texture);
        self.next_texture += 1;
        self.commands.push(DrawCommand::CreateTexture {
            texture,
            width: image.width,
            height: image.height,
        });
        texture
    }

    fn elapsed_seconds(&self) -> f32 {
        self.elapsed
    }
}
