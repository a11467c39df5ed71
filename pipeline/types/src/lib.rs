/*!
    Shared types for the framepipe crate ecosystem.

    This crate defines the vocabulary of the ecosystem: the types that cross crate
    boundaries. It has no dependency on FFmpeg, making it lightweight and enabling
    consumers to depend on it without pulling in FFmpeg bindings.

    # Core Types

    - [`Rational`] - Rational numbers for time bases
    - [`Pts`] - Timestamps in time_base units
    - [`VideoFrame`] - Decoded frame data, tightly packed and uniquely owned

    # Format and Geometry

    - [`PixelFormat`] - Video pixel formats with plane layout information
    - [`TargetGeometry`] - Requested output geometry, resolved against a source
    - [`ResolvedGeometry`] and [`Letterbox`] - Fully-resolved output geometry

    # Error Handling

    - [`Error`] and [`Result`] - Common error types
*/

mod error;
mod format;
mod frame;
mod geometry;
mod rational;
mod timestamp;

pub use error::{Error, Result};
pub use format::PixelFormat;
pub use frame::VideoFrame;
pub use geometry::{Letterbox, ResolvedGeometry, TargetGeometry};
pub use rational::Rational;
pub use timestamp::Pts;
