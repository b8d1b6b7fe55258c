//! # shellrun
//!
//! A side-scrolling chase demo for a classic handheld's tile/sprite video
//! chip, written against a model of the hardware rather than the hardware
//! itself. The chip's registers, palette RAM, VRAM and object attribute
//! memory live in one owned [`mmio::Mmio`] value; the display layer drives
//! it through typed register operations, a software compositor scans it
//! out, and the game logic on top never sees a raw bit.
//!
//! The only timing primitive is the frame clock: one logic tick per
//! vertical blank, exactly as the busy-wait did on the console.

/// The walking, falling game entities.
pub mod actor;
/// Asset containers, validation and the built in demo graphics.
pub mod assets;
/// Display hardware abstraction: mode control, sprites, backgrounds.
pub mod display;
/// Round setup and the per frame game loop.
pub mod game;
/// Button register access.
pub mod input;
/// The owned model of the memory mapped hardware.
pub mod mmio;
/// Software scan-out of the modelled display.
pub mod render;

pub use agb_fixnum as fixnum;
