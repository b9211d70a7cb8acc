pub mod conversion;
pub mod model;
pub mod validation;

pub use conversion::*;
pub use model::*;
