//! Numeric constants for the processing pipeline
//!
//! Values that are physics or numerical-stability facts rather than tuning
//! knobs. Anything an operator might want to adjust lives in `config`.

/// Free-space propagation speed used for range scaling, in m/s.
pub const SPEED_OF_LIGHT: f32 = 3.0e8;

/// Floor added to normalized magnitudes before log conversion.
/// Keeps `20*log10` finite on true-zero bins; an all-zero map comes out
/// as a uniform `20*log10(DB_EPSILON)` = -120 dB.
pub const DB_EPSILON: f32 = 1e-6;

/// Threshold below which a normalization denominator is treated as zero.
/// A map whose maximum (or percentile) magnitude is under this value is
/// left unscaled so the dB floor stays exact.
pub const NORMALIZATION_EPSILON: f32 = 1e-12;

/// m/s to km/h conversion for operator-facing velocity figures.
pub const KMH_PER_MPS: f32 = 3.6;
