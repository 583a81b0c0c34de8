pub mod device;
pub mod error;
pub mod graph;
pub mod kernel;
pub mod tensor;

pub use device::*;
pub use error::*;
pub use graph::*;
pub use kernel::*;
pub use tensor::*;
