//! Core types and utilities for optical Braille recognition.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any image codec: pixel data is exchanged as plain row-major
//! grayscale buffers, and everything downstream of dot detection works on
//! [`DotObservation`]s and [`Cell`]s.

mod cell;
mod dot;
mod geometry;
mod image;
mod integral;
mod logger;
mod mode;

pub use cell::{Cell, CellKind, DotMask, SLOT_COUNT};
pub use dot::DotObservation;
pub use geometry::CellRegion;
pub use image::{GrayImage, GrayImageView};
pub use integral::IntegralImage;
pub use mode::{circular_mean, estimate_mode, median, ModeEstimate};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
