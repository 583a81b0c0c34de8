use std::collections::BTreeMap;

use crate::{DType, HarnessError, Shape};

/// String parameters handed to the kernel at load and launch time.
pub type KernelParams = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IOName(pub String);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorType {
    pub name: IOName,
    pub dtype: DType,
    pub shape: Shape,
}

impl TensorType {
    pub fn new(name: &str, dtype: DType, dims: &[usize]) -> Self {
        Self {
            name: IOName(name.to_string()),
            dtype,
            shape: Shape::from_slice(dims),
        }
    }
}

/// One-op graph: a single input fed into a named external kernel that
/// produces a single output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphDescriptor {
    pub name: String,
    pub kernel: String,
    pub input: TensorType,
    pub output: TensorType,
    pub parameters: KernelParams,
}

impl GraphDescriptor {
    pub fn with_parameter(mut self, key: &str, value: &str) -> Self {
        self.parameters.insert(key.to_string(), value.to_string());
        self
    }
}

/// Declares a `[input_length] -> [1]` graph whose body is one call to
/// `kernel_name`. Only well-formedness is checked here; whether the kernel
/// exists is decided at load time.
pub fn build_graph(
    name: &str,
    kernel_name: &str,
    input_length: usize,
    input_type: DType,
    output_type: DType,
) -> Result<GraphDescriptor, HarnessError> {
    let malformed = |reason: &str| HarnessError::InvalidGraph {
        graph: name.to_string(),
        reason: reason.to_string(),
    };

    if name.trim().is_empty() {
        return Err(malformed("graph name is empty"));
    }
    if kernel_name.trim().is_empty() {
        return Err(malformed("kernel name is empty"));
    }
    if input_length == 0 {
        return Err(malformed("input length must be at least 1"));
    }

    Ok(GraphDescriptor {
        name: name.to_string(),
        kernel: kernel_name.to_string(),
        input: TensorType::new("x", input_type, &[input_length]),
        output: TensorType::new("y", output_type, &[1]),
        parameters: KernelParams::new(),
    })
}
