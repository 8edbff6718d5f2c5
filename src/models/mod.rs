pub mod color;
pub mod market;
pub mod onboarding;
pub mod portfolio;
pub mod position;

pub use color::*;
pub use market::*;
pub use onboarding::*;
pub use portfolio::*;
pub use position::*;
