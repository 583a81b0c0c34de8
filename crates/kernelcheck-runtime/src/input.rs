use kernelcheck_core::{DType, Element, HarnessError, Tensor};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Immutable host-side test vector.
#[derive(Clone, Debug, PartialEq)]
pub enum InputVector {
    I32(Vec<i32>),
    F32(Vec<f32>),
}

/// `I32` yields `0..length` in order; `F32` yields `0.0..length` shuffled with
/// a `StdRng` seeded from `seed`, so the same seed always gives the same vector.
///
/// `length` is capped at `i32::MAX` so every value fits the int32 element type.
pub fn generate_input(length: usize, dtype: DType, seed: u64) -> Result<InputVector, HarnessError> {
    let end = i32::try_from(length).map_err(|_| {
        HarnessError::Tensor(format!(
            "input length {length} exceeds the int32 range (max {})",
            i32::MAX
        ))
    })?;

    Ok(match dtype {
        DType::I32 => InputVector::I32((0..end).collect()),
        DType::F32 => {
            let mut values: Vec<f32> = (0..end).map(|i| i as f32).collect();
            values.shuffle(&mut StdRng::seed_from_u64(seed));
            InputVector::F32(values)
        }
    })
}

impl InputVector {
    pub fn dtype(&self) -> DType {
        match self {
            InputVector::I32(_) => DType::I32,
            InputVector::F32(_) => DType::F32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            InputVector::I32(v) => v.len(),
            InputVector::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Host tensor with shape `[len]`.
    pub fn to_tensor(&self) -> Tensor {
        match self {
            InputVector::I32(v) => Tensor::from_slice(v),
            InputVector::F32(v) => Tensor::from_slice(v),
        }
    }

    pub fn values_f64(&self) -> Vec<f64> {
        match self {
            InputVector::I32(v) => widen(v),
            InputVector::F32(v) => widen(v),
        }
    }

    /// The first `n` values, formatted like `[0, 1, 2]`.
    pub fn sample(&self, n: usize) -> String {
        match self {
            InputVector::I32(v) => format!("{:?}", &v[..n.min(v.len())]),
            InputVector::F32(v) => format!("{:?}", &v[..n.min(v.len())]),
        }
    }
}

fn widen<T: Element>(values: &[T]) -> Vec<f64> {
    values.iter().map(|v| v.to_f64()).collect()
}
