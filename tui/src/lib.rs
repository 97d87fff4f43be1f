//! murmur terminal surface
//!
//! A thin renderer over [`murmur_core::Conductor`]: it forwards key presses
//! as surface events, ticks the conductor once per frame and draws whatever
//! phrases the conductor reports. Speech arrives as text lines on a FIFO.

pub mod app;
pub mod canvas;
pub mod display;
pub mod speech;
pub mod theme;

pub use app::App;
