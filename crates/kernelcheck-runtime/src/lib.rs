pub mod check;
pub mod input;
pub mod model;
pub mod session;
pub mod verify;

pub use check::*;
pub use input::*;
pub use model::*;
pub use session::*;
pub use verify::*;
