//! Scope computation: per-channel histograms for the curves panel.

pub mod histogram;

pub use histogram::{Channel, HistogramData};
