mod country;
mod endpoint;
mod probe;
mod region;

pub use country::*;
pub use endpoint::*;
pub use probe::*;
pub use region::*;
