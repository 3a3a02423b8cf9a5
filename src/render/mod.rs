//! Compositor/Renderer: compile the rendered layer stack to draw ops, then draw them on the CPU.

pub mod compile;
pub mod cpu;
pub mod pipeline;
pub mod surface;

pub use compile::{DrawOp, DrawPaint, Motion, ShadowSpec, compile_layer, compile_layers};
pub use cpu::CpuCompositor;
pub use pipeline::Renderer;
pub use surface::Surface;
