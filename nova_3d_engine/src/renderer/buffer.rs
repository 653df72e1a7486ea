/// Buffer trait and buffer descriptor

/// Buffer usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Vertex data
    Vertex,
    /// Index data
    Index,
}

/// Descriptor for creating a GPU buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Usage (vertex or index)
    pub usage: BufferUsage,
    /// Size in bytes
    pub size: u64,
}

/// Buffer resource trait
///
/// Implemented by backend-specific buffer types (e.g., VulkanBuffer).
/// The buffer is automatically destroyed when dropped.
pub trait Buffer: Send + Sync {
    /// Size in bytes
    fn size(&self) -> u64;

    /// Usage this buffer was created with
    fn usage(&self) -> BufferUsage;
}
