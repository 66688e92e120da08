//! The flame emitter.
//!
//! [`Flame`] owns every GPU resource of one emitter and drives the two
//! passes of a frame:
//!
//! 1. the simulation pass reads the `current` buffer pair and appends into
//!    the `target` pair,
//! 2. the render pass draws the `target` pair with additive blending,
//! 3. the roles are swapped so the freshly written pair becomes the source.
//!
//! Both passes go into the caller's encoder, so the frame's render always sees
//! the output of the same frame's simulation.
//!
//! ```ignore
//! let mut flame = Flame::new(&device, &queue, surface_format, FlameConfig::default())?;
//! flame.set_viewport(width, height);
//!
//! // every frame
//! flame.update(delta_ms);
//! flame.render(&queue, &mut encoder, &view, delta_ms, camera.view_matrix(), projection);
//! queue.submit(Some(encoder.finish()));
//! ```

use glam::{Mat4, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::FlameConfig;
use crate::error::FlameError;
use crate::gpu::{ParticleStore, RandomTexture, RenderStage, RenderUniforms, SimulationStage, SpriteTexture};
use crate::motion::EmitterMotion;
use crate::random::RandomTable;
use crate::simulate::PassParams;
use crate::spawn;
use crate::store::BufferRoles;
use crate::textures::SpriteImage;
use crate::velocity::VelocityEnvelope;

const SPARK_SHARPNESS: f32 = 2.5;
const START_SHARPNESS: f32 = 1.2;

/// A GPU flame emitter.
pub struct Flame {
    config: FlameConfig,
    rng: StdRng,
    table: RandomTable,
    store: ParticleStore,
    simulation: SimulationStage,
    render: RenderStage,
    _random_texture: RandomTexture,
    _spark: SpriteTexture,
    _start: SpriteTexture,
    motion: EmitterMotion,
    viewport: Vec2,
}

impl Flame {
    /// Build an emitter seeded from `config.seed` (or OS entropy).
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        config: FlameConfig,
    ) -> Result<Self, FlameError> {
        let rng = config.rng();
        Self::with_rng(device, queue, format, config, rng)
    }

    /// Build an emitter that draws all its randomness from `rng`.
    pub fn with_rng(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        config: FlameConfig,
        mut rng: StdRng,
    ) -> Result<Self, FlameError> {
        config.validate()?;

        let table = RandomTable::build(config.random_texels, &mut rng)?;
        let random_texture = RandomTexture::new(device, queue, &table);

        let motion = EmitterMotion::new(config.position, config.velocity);
        let population = spawn::initial_population(&config, &motion.envelope(), &mut rng);
        let mut store = ParticleStore::new(device, config.capacity);
        store.initialize(queue, &population);

        let spark_image = SpriteImage::load_or_default(config.spark_texture.as_deref(), SPARK_SHARPNESS);
        let start_image = SpriteImage::load_or_default(config.start_texture.as_deref(), START_SHARPNESS);
        let spark = SpriteTexture::new(device, queue, &spark_image, "Flame Spark Texture");
        let start = SpriteTexture::new(device, queue, &start_image, "Flame Start Texture");

        let simulation = SimulationStage::new(device, &store, &random_texture);
        let render = RenderStage::new(device, format, &spark, &start);

        log::info!(
            "Flame ready: {} launchers, capacity {}, {} random texels",
            store.launcher_count(),
            config.capacity,
            table.len()
        );

        Ok(Self {
            motion,
            config,
            rng,
            table,
            store,
            simulation,
            render,
            _random_texture: random_texture,
            _spark: spark,
            _start: start,
            viewport: Vec2::new(1.0, 1.0),
        })
    }

    /// Move the emitter by its velocity and refresh the envelope.
    pub fn update(&mut self, delta_ms: f32) {
        self.motion.update(delta_ms);
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.motion.set_velocity(velocity);
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.motion.set_position(position);
    }

    /// Size of the render target in pixels. Sprite sizes are relative to it.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    }

    /// Parameters for the next simulation pass. Draws a fresh table offset.
    pub fn pass_params(&mut self, delta_ms: f32) -> PassParams {
        let seed = self.rng.gen::<f32>();
        PassParams::from_config(&self.config, self.motion.envelope(), delta_ms, seed)
    }

    /// Simulate, draw and swap.
    ///
    /// `view` is loaded, not cleared. Uniforms are uploaded through `queue`,
    /// so call this at most once per submitted encoder.
    pub fn render(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        delta_ms: f32,
        view_matrix: Mat4,
        projection: Mat4,
    ) {
        let params = self.pass_params(delta_ms);
        self.simulation.encode(queue, encoder, &mut self.store, &params);

        let uniforms = RenderUniforms::new(self.model_matrix(), view_matrix, projection, self.viewport);
        self.render.encode(queue, encoder, view, &self.store, &uniforms);

        self.store.swap();
    }

    /// Respawn the initial population and restart from the bootstrap pass.
    pub fn reset(&mut self, queue: &wgpu::Queue) {
        let envelope = self.motion.envelope();
        let population = spawn::initial_population(&self.config, &envelope, &mut self.rng);
        let count = self.store.initialize(queue, &population);
        log::debug!("Flame reset with {} launchers", count);
    }

    pub fn position(&self) -> Vec3 {
        self.motion.position()
    }

    pub fn velocity(&self) -> Vec3 {
        self.motion.velocity()
    }

    pub fn envelope(&self) -> VelocityEnvelope {
        self.motion.envelope()
    }

    pub fn motion(&self) -> &EmitterMotion {
        &self.motion
    }

    /// Translation to the emitter's current position.
    pub fn model_matrix(&self) -> Mat4 {
        self.motion.model_matrix()
    }

    pub fn roles(&self) -> BufferRoles {
        self.store.roles()
    }

    pub fn capacity(&self) -> u32 {
        self.store.capacity()
    }

    pub fn config(&self) -> &FlameConfig {
        &self.config
    }

    pub fn random_table(&self) -> &RandomTable {
        &self.table
    }
}
