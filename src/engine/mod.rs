pub mod advancer;
pub mod progress;
pub mod tracking;
