/// VulkanShader - Vulkan implementation of the Shader trait

use ash::vk;
use nova_3d_engine::nova3d::{Error, Result};
use nova_3d_engine::renderer::{Shader, ShaderDesc, ShaderStage};

/// SPIR-V magic number, first word of every valid module
const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Vulkan shader module loaded from a compiled SPIR-V file
pub struct VulkanShader {
    pub module: vk::ShaderModule,
    pub stage: ShaderStage,
    pub entry_point: String,
    pub device: ash::Device,
}

impl VulkanShader {
    /// Read the SPIR-V file named by the descriptor and create the module
    ///
    /// File and validation problems surface as `ShaderCompilation` with the
    /// diagnostic text, so the caller can report which shader of an effect
    /// failed to load.
    pub(crate) fn create(device: &ash::Device, desc: &ShaderDesc) -> Result<Self> {
        let code = std::fs::read(&desc.path).map_err(|e| Error::ShaderCompilation {
            path: desc.path.clone(),
            diagnostics: format!("failed to read shader file: {}", e),
        })?;

        if code.len() < 4 || code.len() % 4 != 0 {
            return Err(Error::ShaderCompilation {
                path: desc.path.clone(),
                diagnostics: format!("{} bytes is not a whole number of SPIR-V words", code.len()),
            });
        }

        let words: Vec<u32> = code
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        if words[0] != SPIRV_MAGIC {
            return Err(Error::ShaderCompilation {
                path: desc.path.clone(),
                diagnostics: format!("bad SPIR-V magic number 0x{:08x}", words[0]),
            });
        }

        let create_info = vk::ShaderModuleCreateInfo::default().code(&words);
        let module = unsafe { device.create_shader_module(&create_info, None) }.map_err(|e| {
            Error::ShaderCompilation {
                path: desc.path.clone(),
                diagnostics: format!("vkCreateShaderModule failed: {:?}", e),
            }
        })?;

        Ok(Self {
            module,
            stage: desc.stage,
            entry_point: desc.entry_point.clone(),
            device: device.clone(),
        })
    }
}

impl Shader for VulkanShader {
    fn stage(&self) -> ShaderStage {
        self.stage
    }

    fn entry_point(&self) -> &str {
        &self.entry_point
    }
}

impl Drop for VulkanShader {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_shader_module(self.module, None);
        }
    }
}
