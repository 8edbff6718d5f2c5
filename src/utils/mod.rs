pub mod format;
pub mod logging;
pub mod math;

pub use format::*;
pub use logging::*;
pub use math::*;
