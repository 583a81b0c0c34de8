use std::sync::Arc;

use kernelcheck_core::{Device, GraphDescriptor, HarnessError, Kernel, Scalar, Tensor};
use tracing::debug;

/// A graph bound to one device and one resolved kernel.
pub struct ExecutableModel {
    graph: GraphDescriptor,
    device: Device,
    kernel: Arc<dyn Kernel>,
}

impl ExecutableModel {
    pub(crate) fn new(graph: GraphDescriptor, device: Device, kernel: Arc<dyn Kernel>) -> Self {
        Self {
            graph,
            device,
            kernel,
        }
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Runs the kernel on a device-resident input. Outputs stay on the device.
    pub fn execute(&self, input: &Tensor) -> Result<Vec<Tensor>, HarnessError> {
        let exec_error = |reason: String| HarnessError::Execution {
            graph: self.graph.name.clone(),
            reason,
        };

        let declared = &self.graph.input;
        if input.dtype() != declared.dtype {
            return Err(exec_error(format!(
                "input dtype {} does not match declared {}",
                input.dtype(),
                declared.dtype
            )));
        }
        if input.shape() != &declared.shape {
            return Err(exec_error(format!(
                "input shape {} does not match declared {}",
                input.shape(),
                declared.shape
            )));
        }
        if input.device() != self.device {
            return Err(exec_error(format!(
                "input resides on {}, model is bound to {}",
                input.device(),
                self.device
            )));
        }

        let output = self
            .kernel
            .launch(input, &self.graph.output, &self.graph.parameters)
            .map_err(|e| exec_error(e.to_string()))?;

        if output.dtype() != self.graph.output.dtype || output.shape() != &self.graph.output.shape
        {
            return Err(exec_error(format!(
                "kernel produced {} {}, declared {} {}",
                output.dtype(),
                output.shape(),
                self.graph.output.dtype,
                self.graph.output.shape
            )));
        }

        debug!(graph = %self.graph.name, device = %self.device, "executed");
        Ok(vec![output])
    }

    /// Executes, copies output 0 back to the host and extracts its only element.
    pub fn execute_scalar(&self, input: &Tensor) -> Result<Scalar, HarnessError> {
        let outputs = self.execute(input)?;
        let first = outputs.first().ok_or_else(|| HarnessError::Execution {
            graph: self.graph.name.clone(),
            reason: "model produced no outputs".to_string(),
        })?;
        first.to(Device::Cpu).first_scalar()
    }
}
