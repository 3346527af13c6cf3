#![forbid(unsafe_code)]

pub mod curriculum;
pub mod model;
pub mod seed;
pub mod time;
pub mod validate;

pub use time::Clock;
