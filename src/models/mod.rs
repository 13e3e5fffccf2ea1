mod license;
mod validation;

pub use license::*;
pub use validation::*;
