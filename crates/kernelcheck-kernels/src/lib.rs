use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use kernelcheck_core::{
    DType, Device, DeviceBuf, Kernel, KernelError, KernelLibrary, KernelParams, Shape, Tensor,
    TensorDesc, TensorStorage, TensorType,
};
use tracing::trace;

pub const MAX_1D_VECTOR: &str = "max_1d_vector";
pub const MIN_1D_VECTOR: &str = "min_1d_vector";
pub const MEAN_1D_VECTOR: &str = "mean_1d_vector";

/// Host-side implementations of the 1-D vector reductions.
pub struct ReferenceKernels {
    kernels: BTreeMap<&'static str, Arc<dyn Kernel>>,
}

impl ReferenceKernels {
    pub fn new() -> Self {
        let mut lib = Self::empty();
        lib.register(VectorReduce::new(MAX_1D_VECTOR, ReduceOp::Max));
        lib.register(VectorReduce::new(MIN_1D_VECTOR, ReduceOp::Min));
        lib.register(VectorReduce::new(MEAN_1D_VECTOR, ReduceOp::Mean));
        lib
    }

    pub fn empty() -> Self {
        Self {
            kernels: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, kernel: impl Kernel) {
        self.kernels.insert(kernel.name(), Arc::new(kernel));
    }
}

impl Default for ReferenceKernels {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelLibrary for ReferenceKernels {
    fn name(&self) -> &str {
        "reference"
    }

    fn resolve(&self, kernel: &str) -> Option<Arc<dyn Kernel>> {
        self.kernels.get(kernel).cloned()
    }

    fn kernel_names(&self) -> Vec<String> {
        self.kernels.keys().map(|k| k.to_string()).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReduceOp {
    Max,
    Min,
    Mean,
}

pub struct VectorReduce {
    name: &'static str,
    op: ReduceOp,
}

impl VectorReduce {
    pub fn new(name: &'static str, op: ReduceOp) -> Self {
        Self { name, op }
    }

    fn expected_output(&self, input: DType) -> DType {
        match self.op {
            ReduceOp::Max | ReduceOp::Min => input,
            ReduceOp::Mean => DType::F32,
        }
    }

    fn reduce_i32(&self, values: &[i32]) -> Option<Reduced> {
        match self.op {
            ReduceOp::Max => values.iter().copied().max().map(Reduced::I32),
            ReduceOp::Min => values.iter().copied().min().map(Reduced::I32),
            ReduceOp::Mean => mean(values.iter().map(|v| f64::from(*v)), values.len()),
        }
    }

    fn reduce_f32(&self, values: &[f32]) -> Option<Reduced> {
        let (first, rest) = values.split_first()?;
        match self.op {
            ReduceOp::Max => Some(Reduced::F32(rest.iter().fold(*first, |acc, v| acc.max(*v)))),
            ReduceOp::Min => Some(Reduced::F32(rest.iter().fold(*first, |acc, v| acc.min(*v)))),
            ReduceOp::Mean => mean(values.iter().map(|v| f64::from(*v)), values.len()),
        }
    }
}

enum Reduced {
    I32(i32),
    F32(f32),
}

fn mean(values: impl Iterator<Item = f64>, len: usize) -> Option<Reduced> {
    if len == 0 {
        return None;
    }
    let sum: f64 = values.sum();
    Some(Reduced::F32((sum / len as f64) as f32))
}

impl Kernel for VectorReduce {
    fn name(&self) -> &'static str {
        self.name
    }

    fn supports(&self, _device: &Device) -> bool {
        true
    }

    fn check_signature(
        &self,
        input: &TensorType,
        output: &TensorType,
        params: &KernelParams,
    ) -> Result<(), KernelError> {
        let mismatch = |reason: String| KernelError::Signature {
            kernel: self.name,
            reason,
        };

        if let Some(key) = params.keys().next() {
            return Err(mismatch(format!("takes no parameters, got `{key}`")));
        }

        if input.shape.rank() != 1 {
            return Err(mismatch(format!(
                "expected a rank-1 input, got shape {}",
                input.shape
            )));
        }
        if output.shape.dims() != [1] {
            return Err(mismatch(format!(
                "expected output shape (1,), got {}",
                output.shape
            )));
        }
        let want = self.expected_output(input.dtype);
        if output.dtype != want {
            return Err(mismatch(format!(
                "output dtype must be {want} for {} input, got {}",
                input.dtype, output.dtype
            )));
        }
        Ok(())
    }

    fn launch(
        &self,
        input: &Tensor,
        output: &TensorType,
        _params: &KernelParams,
    ) -> Result<Tensor, KernelError> {
        if input.shape().rank() != 1 {
            return Err(KernelError::Signature {
                kernel: self.name,
                reason: format!("expected a rank-1 input, got shape {}", input.shape()),
            });
        }
        if input.shape().dims() == [0] {
            return Err(KernelError::EmptyInput(self.name));
        }

        let bytes = input.storage.staged_bytes();
        let reduced = match input.dtype() {
            DType::I32 => self.reduce_i32(&decode::<i32>(self.name, bytes, i32::from_le_bytes)?),
            DType::F32 => self.reduce_f32(&decode::<f32>(self.name, bytes, f32::from_le_bytes)?),
        }
        .ok_or(KernelError::EmptyInput(self.name))?;

        let mut out = BytesMut::with_capacity(4);
        let out_dtype = match (reduced, output.dtype) {
            (Reduced::I32(v), DType::I32) => {
                out.put_i32_le(v);
                DType::I32
            }
            (Reduced::F32(v), DType::F32) => {
                out.put_f32_le(v);
                DType::F32
            }
            (_, dtype) => {
                return Err(KernelError::UnsupportedDType {
                    kernel: self.name,
                    dtype,
                })
            }
        };
        trace!(kernel = self.name, device = %input.device(), "kernel launched");

        Ok(place(out.freeze(), out_dtype, input.device()))
    }
}

fn decode<T>(
    kernel: &'static str,
    bytes: &Bytes,
    from_le: fn([u8; 4]) -> T,
) -> Result<Vec<T>, KernelError> {
    if !bytes.len().is_multiple_of(4) {
        return Err(KernelError::Storage {
            kernel,
            reason: format!("{} bytes is not a whole number of elements", bytes.len()),
        });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| from_le([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn place(bytes: Bytes, dtype: DType, device: Device) -> Tensor {
    let storage = match device {
        Device::Cpu => TensorStorage::Host(bytes),
        Device::Accelerator { device_id } => TensorStorage::Device(DeviceBuf { device_id, bytes }),
    };
    Tensor {
        desc: TensorDesc {
            dtype,
            shape: Shape::vector(1),
            device,
        },
        storage,
    }
}
