//! Double-buffered particle storage on the GPU.
//!
//! Each of the two pairs holds a state buffer of `capacity` records and a
//! capture target. The capture target doubles as the indirect draw arguments
//! for the render stage: the simulation pass counts captured rows into its
//! `instance_count`, and the render pass draws exactly that many instances
//! without a host readback.

use bytemuck::{Pod, Zeroable};

use crate::particle::{FlameParticle, PARTICLE_STRIDE};
use crate::store::{BufferRoles, InputRange};

/// Vertices per particle quad.
pub const QUAD_VERTICES: u32 = 6;

/// Byte offset of `instance_count` inside [`CaptureCounter`].
pub const INSTANCE_COUNT_OFFSET: wgpu::BufferAddress = 4;

/// Indirect draw arguments, laid out as `draw_indirect` expects.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct CaptureCounter {
    pub vertex_count: u32,
    pub instance_count: u32,
    pub first_vertex: u32,
    pub first_instance: u32,
}

impl CaptureCounter {
    pub fn new(instance_count: u32) -> Self {
        Self {
            vertex_count: QUAD_VERTICES,
            instance_count,
            first_vertex: 0,
            first_instance: 0,
        }
    }
}

/// State buffer plus its capture target.
pub struct BufferPair {
    pub particles: wgpu::Buffer,
    pub capture: wgpu::Buffer,
}

impl BufferPair {
    fn new(device: &wgpu::Device, capacity: u32, index: usize) -> Self {
        let particles = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("Particle State Buffer {index}")),
            size: capacity as u64 * PARTICLE_STRIDE as u64,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::VERTEX
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let capture = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("Capture Target {index}")),
            size: std::mem::size_of::<CaptureCounter>() as u64,
            usage: wgpu::BufferUsages::INDIRECT
                | wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { particles, capture }
    }
}

/// The two buffer pairs and the roles they currently play.
pub struct ParticleStore {
    pairs: [BufferPair; 2],
    roles: BufferRoles,
    capacity: u32,
    launcher_count: u32,
}

impl ParticleStore {
    pub fn new(device: &wgpu::Device, capacity: u32) -> Self {
        Self {
            pairs: [BufferPair::new(device, capacity, 0), BufferPair::new(device, capacity, 1)],
            roles: BufferRoles::new(),
            capacity,
            launcher_count: 0,
        }
    }

    /// Upload `population` into both pairs and arm the bootstrap pass.
    ///
    /// Rows beyond capacity are dropped with a warning. Returns the number of
    /// rows actually stored.
    pub fn initialize(&mut self, queue: &wgpu::Queue, population: &[FlameParticle]) -> u32 {
        let capacity = self.capacity as usize;
        if population.len() > capacity {
            log::warn!(
                "Initial population of {} exceeds capacity {}, truncating",
                population.len(),
                capacity
            );
        }
        let rows = &population[..population.len().min(capacity)];

        let mut state = vec![FlameParticle::zeroed(); capacity];
        state[..rows.len()].copy_from_slice(rows);
        let count = rows.len() as u32;
        let counter = CaptureCounter::new(count);

        for pair in &self.pairs {
            queue.write_buffer(&pair.particles, 0, bytemuck::cast_slice(&state));
            queue.write_buffer(&pair.capture, 0, bytemuck::bytes_of(&counter));
        }

        self.launcher_count = rows.iter().filter(|p| p.is_launcher()).count() as u32;
        self.roles.arm(count);
        count
    }

    /// Input range for the pass about to be recorded.
    pub fn begin_pass(&mut self) -> InputRange {
        self.roles.begin_pass()
    }

    /// Zero the target's captured count, ordered with the passes in `encoder`.
    pub fn clear_target_count(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.clear_buffer(&self.target().capture, INSTANCE_COUNT_OFFSET, Some(4));
    }

    pub fn swap(&mut self) {
        self.roles.swap();
    }

    pub fn current(&self) -> &BufferPair {
        &self.pairs[self.roles.current()]
    }

    pub fn target(&self) -> &BufferPair {
        &self.pairs[self.roles.target()]
    }

    pub fn pair(&self, index: usize) -> &BufferPair {
        &self.pairs[index]
    }

    pub fn roles(&self) -> BufferRoles {
        self.roles
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn launcher_count(&self) -> u32 {
        self.launcher_count
    }

    /// Rows shells may fill before the guard starts dropping them.
    pub fn shell_limit(&self) -> u32 {
        self.capacity.saturating_sub(self.launcher_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_matches_indirect_layout() {
        assert_eq!(std::mem::size_of::<CaptureCounter>(), 16);
        assert_eq!(std::mem::offset_of!(CaptureCounter, instance_count) as u64, INSTANCE_COUNT_OFFSET);
        let counter = CaptureCounter::new(1000);
        assert_eq!(bytemuck::cast::<_, [u32; 4]>(counter), [6, 1000, 0, 0]);
    }
}
