use std::sync::Arc;

use kernelcheck_core::{Device, GraphDescriptor, HarnessError, KernelError, KernelLibrary};
use tracing::debug;

use crate::ExecutableModel;

/// Owns the devices and the kernel library for one harness run.
/// Dropping the context releases everything loaded through it.
pub struct HarnessContext {
    devices: Vec<Device>,
    library: Arc<dyn KernelLibrary>,
}

impl HarnessContext {
    /// The first device is the primary one used by [`HarnessContext::load`].
    pub fn new(devices: Vec<Device>, library: Arc<dyn KernelLibrary>) -> Self {
        let devices = if devices.is_empty() {
            vec![Device::Cpu]
        } else {
            devices
        };
        debug!(devices = ?devices, library = library.name(), "harness context created");
        Self { devices, library }
    }

    pub fn device(&self) -> Device {
        self.devices[0]
    }

    pub fn load(&self, graph: &GraphDescriptor) -> Result<ExecutableModel, HarnessError> {
        self.load_model(graph, self.device())
    }

    /// Resolves the graph's kernel and binds it to `device`.
    pub fn load_model(
        &self,
        graph: &GraphDescriptor,
        device: Device,
    ) -> Result<ExecutableModel, HarnessError> {
        let load_error = |reason: String| HarnessError::GraphLoad {
            graph: graph.name.clone(),
            reason,
        };

        if !self.devices.contains(&device) {
            return Err(load_error(format!("device {device} is not owned by this context")));
        }

        let kernel = self.library.resolve_for(graph).ok_or_else(|| {
            load_error(format!(
                "kernel `{}` not found in library `{}` (available: {})",
                graph.kernel,
                self.library.name(),
                self.library.kernel_names().join(", ")
            ))
        })?;

        if !kernel.supports(&device) {
            return Err(load_error(
                KernelError::UnsupportedDevice {
                    kernel: kernel.name(),
                    device,
                }
                .to_string(),
            ));
        }

        kernel
            .check_signature(&graph.input, &graph.output, &graph.parameters)
            .map_err(|e| load_error(e.to_string()))?;

        debug!(graph = %graph.name, kernel = %graph.kernel, %device, "graph loaded");
        Ok(ExecutableModel::new(graph.clone(), device, kernel))
    }
}

impl Drop for HarnessContext {
    fn drop(&mut self) {
        debug!(devices = ?self.devices, "harness context released");
    }
}
