use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use smallvec::SmallVec;

use crate::HarnessError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Device {
    Cpu,
    Accelerator { device_id: u32 },
}

impl Device {
    pub fn kind(&self) -> &'static str {
        match self {
            Device::Cpu => "CPU",
            Device::Accelerator { .. } => "Accelerator",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => f.write_str("cpu"),
            Device::Accelerator { device_id } => write!(f, "accelerator:{device_id}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    F32,
    I32,
}

impl DType {
    pub fn byte_size(&self) -> usize {
        match self {
            DType::F32 | DType::I32 => 4,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::F32 => f.write_str("float32"),
            DType::I32 => f.write_str("int32"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape(pub SmallVec<[usize; 4]>);

impl Shape {
    pub fn from_slice(d: &[usize]) -> Self {
        Self(d.iter().copied().collect())
    }
    pub fn vector(len: usize) -> Self {
        Self::from_slice(&[len])
    }
    pub fn rank(&self) -> usize {
        self.0.len()
    }
    pub fn numel(&self) -> usize {
        self.0.iter().product::<usize>()
    }
    pub fn dims(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for Shape {
    /// Tuple notation, `(10,)` for a vector.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "({single},)"),
            dims => {
                let parts: Vec<String> = dims.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

/// Element types that can live in a tensor.
pub trait Element: Copy + fmt::Debug + 'static {
    const DTYPE: DType;

    fn put_le(self, buf: &mut BytesMut);
    fn from_le(chunk: &[u8]) -> Self;
    fn to_f64(self) -> f64;
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    fn put_le(self, buf: &mut BytesMut) {
        buf.put_f32_le(self);
    }
    fn from_le(chunk: &[u8]) -> Self {
        f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
    }
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Element for i32 {
    const DTYPE: DType = DType::I32;

    fn put_le(self, buf: &mut BytesMut) {
        buf.put_i32_le(self);
    }
    fn from_le(chunk: &[u8]) -> Self {
        i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
    }
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorDesc {
    pub dtype: DType,
    pub shape: Shape,
    pub device: Device,
}

#[derive(Clone, Debug)]
pub struct DeviceBuf {
    pub device_id: u32,
    pub bytes: Bytes, // staged copy; a real accelerator allocation replaces this
}

/// Owns the storage for a tensor.
#[derive(Clone, Debug)]
pub enum TensorStorage {
    Host(Bytes),
    Device(DeviceBuf),
}

impl TensorStorage {
    /// Raw little-endian bytes regardless of placement.
    pub fn staged_bytes(&self) -> &Bytes {
        match self {
            TensorStorage::Host(bytes) => bytes,
            TensorStorage::Device(buf) => &buf.bytes,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Tensor {
    pub desc: TensorDesc,
    pub storage: TensorStorage,
}

impl Tensor {
    pub fn from_host_bytes(dtype: DType, shape: Shape, bytes: Bytes) -> Result<Self, HarnessError> {
        let expected = shape.numel() * dtype.byte_size();
        if bytes.len() != expected {
            return Err(HarnessError::Tensor(format!(
                "byte size mismatch: got {}, expected {expected}",
                bytes.len()
            )));
        }
        Ok(Self {
            desc: TensorDesc {
                dtype,
                shape,
                device: Device::Cpu,
            },
            storage: TensorStorage::Host(bytes),
        })
    }

    /// Builds a host-resident rank-1 tensor.
    pub fn from_slice<T: Element>(data: &[T]) -> Self {
        let mut buf = BytesMut::with_capacity(std::mem::size_of_val(data));
        for value in data {
            value.put_le(&mut buf);
        }
        Self {
            desc: TensorDesc {
                dtype: T::DTYPE,
                shape: Shape::vector(data.len()),
                device: Device::Cpu,
            },
            storage: TensorStorage::Host(buf.freeze()),
        }
    }

    pub fn dtype(&self) -> DType {
        self.desc.dtype
    }

    pub fn shape(&self) -> &Shape {
        &self.desc.shape
    }

    pub fn device(&self) -> Device {
        self.desc.device
    }

    pub fn byte_len(&self) -> usize {
        self.storage.staged_bytes().len()
    }

    /// Copies the tensor onto `device`. The source is left untouched.
    pub fn to(&self, device: Device) -> Tensor {
        let bytes = self.storage.staged_bytes().clone();
        let storage = match device {
            Device::Cpu => TensorStorage::Host(bytes),
            Device::Accelerator { device_id } => TensorStorage::Device(DeviceBuf { device_id, bytes }),
        };
        Tensor {
            desc: TensorDesc {
                device,
                ..self.desc.clone()
            },
            storage,
        }
    }

    pub fn host_bytes(&self) -> Result<&Bytes, HarnessError> {
        match &self.storage {
            TensorStorage::Host(bytes) => Ok(bytes),
            TensorStorage::Device(buf) => Err(HarnessError::Tensor(format!(
                "tensor resides on accelerator:{}; move it to the CPU first",
                buf.device_id
            ))),
        }
    }

    /// Host conversion. Fails for device-resident tensors and on dtype mismatch.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>, HarnessError> {
        if self.desc.dtype != T::DTYPE {
            return Err(HarnessError::Tensor(format!(
                "requested {} elements from a {} tensor",
                T::DTYPE,
                self.desc.dtype
            )));
        }
        let bytes = self.host_bytes()?;
        Ok(bytes.chunks_exact(T::DTYPE.byte_size()).map(T::from_le).collect())
    }

    /// Reads element 0 of a host tensor.
    pub fn first_scalar(&self) -> Result<Scalar, HarnessError> {
        let scalar = match self.desc.dtype {
            DType::F32 => self.to_vec::<f32>()?.first().copied().map(Scalar::F32),
            DType::I32 => self.to_vec::<i32>()?.first().copied().map(Scalar::I32),
        };
        scalar.ok_or_else(|| HarnessError::Tensor("tensor holds no elements".to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    F32(f32),
    I32(i32),
}

impl Scalar {
    pub fn as_f64(&self) -> f64 {
        match self {
            Scalar::F32(v) => f64::from(*v),
            Scalar::I32(v) => f64::from(*v),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::F32(v) => write!(f, "{v:?}"),
            Scalar::I32(v) => write!(f, "{v}"),
        }
    }
}
