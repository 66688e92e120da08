//! The simulation compute pass.
//!
//! Bind group 0 holds the per-pass parameters and the random texture. Bind
//! group 1 holds the source and destination buffer pairs; one is prebuilt for
//! each direction (`0 -> 1` and `1 -> 0`) and picked by the store's `current`
//! index at record time.

use bytemuck::{Pod, Zeroable};

use super::particle_store::ParticleStore;
use super::random_texture::RandomTexture;
use super::WORKGROUP_SIZE;
use crate::shader_gen;
use crate::simulate::PassParams;
use crate::store::InputRange;

/// Uniform block of the update shader. Mirrors `SimParams` in WGSL.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SimUniforms {
    pub envelope_min: [f32; 3],
    pub delta_ms: f32,
    pub envelope_delta: [f32; 3],
    pub seed: f32,
    pub anchor: [f32; 3],
    pub min_life: f32,
    pub max_life: f32,
    pub shell_jitter: f32,
    pub launcher_jitter: f32,
    pub jitter_samples: u32,
    pub shells_per_launcher: u32,
    pub capacity: u32,
    pub shell_limit: u32,
    pub input_count: u32,
    pub use_initial_count: u32,
    pub shell_size: f32,
    pub launcher_size: f32,
    pub end_size_ratio: f32,
    pub buoyancy: f32,
    pub drag: f32,
    pub _pad: [f32; 2],
}

impl SimUniforms {
    pub fn new(params: &PassParams, range: InputRange, capacity: u32, shell_limit: u32) -> Self {
        let (input_count, use_initial_count) = match range {
            InputRange::Initial(n) => (n, 1),
            InputRange::Captured => (0, 0),
        };
        Self {
            envelope_min: params.envelope.min.to_array(),
            delta_ms: params.delta_ms,
            envelope_delta: params.envelope.delta.to_array(),
            seed: params.seed,
            anchor: params.anchor.to_array(),
            min_life: params.min_life,
            max_life: params.max_life,
            shell_jitter: params.shell_jitter,
            launcher_jitter: params.launcher_jitter,
            jitter_samples: params.jitter_samples,
            shells_per_launcher: params.shells_per_launcher,
            capacity,
            shell_limit,
            input_count,
            use_initial_count,
            shell_size: params.shell_size,
            launcher_size: params.launcher_size,
            end_size_ratio: params.end_size_ratio,
            buoyancy: params.buoyancy,
            drag: params.drag,
            _pad: [0.0; 2],
        }
    }
}

/// Compute pipeline plus its bind groups.
pub struct SimulationStage {
    pipeline: wgpu::ComputePipeline,
    uniform_buffer: wgpu::Buffer,
    params_bind_group: wgpu::BindGroup,
    /// Indexed by the source pair.
    buffers_bind_groups: [wgpu::BindGroup; 2],
}

impl SimulationStage {
    pub fn new(device: &wgpu::Device, store: &ParticleStore, random: &RandomTexture) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Simulation Uniform Buffer"),
            size: std::mem::size_of::<SimUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Simulation Params Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D1,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let params_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Simulation Params Bind Group"),
            layout: &params_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&random.view),
                },
            ],
        });

        let storage = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let buffers_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Simulation Buffers Bind Group Layout"),
            entries: &[
                storage(0, true),  // src particles
                storage(1, true),  // src capture
                storage(2, false), // dst particles
                storage(3, false), // dst capture
            ],
        });

        let buffers_bind_group = |src: usize, dst: usize| {
            let (src, dst) = (store.pair(src), store.pair(dst));
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Simulation Buffers Bind Group"),
                layout: &buffers_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: src.particles.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: src.capture.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: dst.particles.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: dst.capture.as_entire_binding(),
                    },
                ],
            })
        };
        let buffers_bind_groups = [buffers_bind_group(0, 1), buffers_bind_group(1, 0)];

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Flame Update Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_gen::update_shader().into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Simulation Pipeline Layout"),
            bind_group_layouts: &[&params_layout, &buffers_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Simulation Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            params_bind_group,
            buffers_bind_groups,
        }
    }

    /// Record one pass from the store's `current` pair into its `target` pair.
    ///
    /// Writes the uniforms through the queue, so only one pass may be recorded
    /// per submitted encoder.
    pub fn encode(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        store: &mut ParticleStore,
        params: &PassParams,
    ) {
        let range = store.begin_pass();
        let uniforms = SimUniforms::new(params, range, store.capacity(), store.shell_limit());
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        store.clear_target_count(encoder);

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Flame Simulation Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.params_bind_group, &[]);
        pass.set_bind_group(1, &self.buffers_bind_groups[store.roles().current()], &[]);
        pass.dispatch_workgroups(store.capacity().div_ceil(WORKGROUP_SIZE), 1, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlameConfig;
    use crate::velocity::VelocityEnvelope;

    #[test]
    fn test_uniform_block_size() {
        // vec3 + f32 rows, padded to a multiple of 16.
        assert_eq!(std::mem::size_of::<SimUniforms>(), 112);
        assert_eq!(std::mem::offset_of!(SimUniforms, max_life), 48);
        assert_eq!(std::mem::offset_of!(SimUniforms, use_initial_count), 80);
    }

    #[test]
    fn test_input_range_flags() {
        let config = FlameConfig::default();
        let params = PassParams::from_config(&config, VelocityEnvelope::from_base(config.velocity), 16.0, 0.0);

        let first = SimUniforms::new(&params, InputRange::Initial(1000), 1800, 800);
        assert_eq!((first.input_count, first.use_initial_count), (1000, 1));

        let later = SimUniforms::new(&params, InputRange::Captured, 1800, 800);
        assert_eq!(later.use_initial_count, 0);
        assert_eq!(later.shell_limit, 800);
    }
}
