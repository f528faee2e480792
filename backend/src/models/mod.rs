pub mod coordinate;
pub mod ephemeris;
pub mod phase;
pub mod time;

pub use coordinate::*;
pub use ephemeris::*;
pub use phase::*;
pub use time::*;
