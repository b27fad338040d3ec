//! Multithreaded tile-free renderer.
//!
//! Workers claim scanlines from an atomic row cursor, trace every pixel of
//! the row and commit the finished row into a shared [`Frame`]. Rendering is
//! a pure function of scene and camera, so repeated renders of the same
//! scene produce byte-identical frames regardless of scheduling.

mod framebuffer;
mod renderer;

pub use framebuffer::{pack_color, unpack_color, Frame};
pub use renderer::{render, RenderJob};
