pub mod load;
pub mod weather;

pub use load::*;
pub use weather::*;
