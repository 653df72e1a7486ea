/// VulkanBuffer - Vulkan implementation of the Buffer trait

use std::sync::{Arc, Mutex};

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme, Allocator};
use nova_3d_engine::nova3d::{Error, Result};
use nova_3d_engine::renderer::{Buffer, BufferDesc, BufferUsage};

/// Vulkan buffer with host-visible memory
///
/// Vertex and index data is small and written once, so buffers live in
/// CpuToGpu memory and the initial contents are written through the
/// persistent mapping at creation time.
pub struct VulkanBuffer {
    pub buffer: vk::Buffer,
    pub size: u64,
    pub usage: BufferUsage,
    pub allocation: Option<Allocation>,
    pub device: ash::Device,
    pub allocator: Arc<Mutex<Allocator>>,
}

impl VulkanBuffer {
    pub(crate) fn create(
        device: &ash::Device,
        allocator: &Arc<Mutex<Allocator>>,
        desc: &BufferDesc,
        data: &[u8],
    ) -> Result<Self> {
        let usage = match desc.usage {
            BufferUsage::Vertex => vk::BufferUsageFlags::VERTEX_BUFFER,
            BufferUsage::Index => vk::BufferUsageFlags::INDEX_BUFFER,
        };

        unsafe {
            let buffer_create_info = vk::BufferCreateInfo::default()
                .size(desc.size)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = device
                .create_buffer(&buffer_create_info, None)
                .map_err(|e| Error::BackendError(format!("Failed to create buffer: {:?}", e)))?;

            let requirements = device.get_buffer_memory_requirements(buffer);
            let mut allocation = allocator
                .lock()
                .unwrap()
                .allocate(&AllocationCreateDesc {
                    name: "buffer",
                    requirements,
                    location: gpu_allocator::MemoryLocation::CpuToGpu,
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|_e| Error::OutOfMemory)?;

            device
                .bind_buffer_memory(buffer, allocation.memory(), allocation.offset())
                .map_err(|e| {
                    Error::BackendError(format!("Failed to bind buffer memory: {:?}", e))
                })?;

            match allocation.mapped_slice_mut() {
                Some(mapped) => mapped[..data.len()].copy_from_slice(data),
                None => {
                    return Err(Error::BackendError(
                        "Buffer allocation is not host-visible".to_string(),
                    ));
                }
            }

            Ok(Self {
                buffer,
                size: desc.size,
                usage: desc.usage,
                allocation: Some(allocation),
                device: device.clone(),
                allocator: allocator.clone(),
            })
        }
    }
}

impl Buffer for VulkanBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn usage(&self) -> BufferUsage {
        self.usage
    }
}

impl Drop for VulkanBuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_buffer(self.buffer, None);
        }
        if let Some(allocation) = self.allocation.take() {
            self.allocator.lock().unwrap().free(allocation).ok();
        }
    }
}
