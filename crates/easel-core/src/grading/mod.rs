//! Tone curves and their lookup tables.

pub mod curves;
