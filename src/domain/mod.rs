pub mod preference;
pub mod rates;
pub mod reading;
pub mod recommendation;
pub mod series;

pub use preference::*;
pub use rates::*;
pub use reading::*;
pub use recommendation::*;
pub use series::*;
