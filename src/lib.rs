pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
pub mod prettyprint;

pub use application::*;
pub use ports::*;
