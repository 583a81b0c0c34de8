use std::sync::Arc;

use crate::{Device, GraphDescriptor, KernelError, KernelParams, Tensor, TensorType};

pub trait Kernel: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn supports(&self, device: &Device) -> bool;

    /// Rejects declared types or parameters the kernel cannot honour.
    fn check_signature(
        &self,
        input: &TensorType,
        output: &TensorType,
        params: &KernelParams,
    ) -> Result<(), KernelError>;

    /// Runs the kernel. The output lives on the same device as `input`.
    fn launch(
        &self,
        input: &Tensor,
        output: &TensorType,
        params: &KernelParams,
    ) -> Result<Tensor, KernelError>;
}

/// A set of named kernels, the harness's only view of the kernel code.
pub trait KernelLibrary: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn resolve(&self, kernel: &str) -> Option<Arc<dyn Kernel>>;

    fn kernel_names(&self) -> Vec<String>;

    fn resolve_for(&self, graph: &GraphDescriptor) -> Option<Arc<dyn Kernel>> {
        self.resolve(&graph.kernel)
    }
}
