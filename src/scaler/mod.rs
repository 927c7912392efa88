//! Feature standardization: parameters fit once on the training population,
//! replayed unchanged at inference.

mod standard;

pub use standard::{ScalerParams, StandardScaler};
