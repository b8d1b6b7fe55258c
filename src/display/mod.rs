//! The display primitives: mode setup, the sprite pool and the tiled
//! background layers.

use bilge::prelude::*;
use bitflags::bitflags;

use crate::mmio::Mmio;

/// Implements the fixed pool of hardware sprites.
pub mod object;
/// Register bit layouts.
pub(crate) mod registers;
/// Tiled background layers and the tile lookup.
pub mod tiled;

use registers::DisplayControl;

/// Width of the screen in pixels.
pub const WIDTH: i32 = 240;
/// Height of the screen in pixels.
pub const HEIGHT: i32 = 160;

bitflags! {
    /// Layer and object enable bits of the display control register.
    #[derive(Clone, Copy)]
    pub struct GraphicsSettings: u16 {
        const SPRITE_1D = 1 << 6;
        const LAYER_BG0 = 1 << 8;
        const LAYER_BG1 = 1 << 9;
        const LAYER_OBJ = 1 << 12;
    }
}

/// Background and sprite draw priority. P0 is drawn on top.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Priority {
    P0 = 0,
    P1 = 1,
    P2 = 2,
    P3 = 3,
}

/// Puts the display in tiled mode 0 with the requested layers enabled.
///
/// Writes the whole control word, so this also clears forced blank.
pub fn set_graphics_mode(mmio: &mut Mmio, settings: GraphicsSettings) {
    let bits = settings.bits();

    let ctl = DisplayControl::new(
        u3::new(0),
        u1::new(0),
        false,
        bits & GraphicsSettings::SPRITE_1D.bits() != 0,
        false,
        u4::new(((bits >> 8) & 0b1111) as u8),
        bits & GraphicsSettings::LAYER_OBJ.bits() != 0,
        false,
        false,
        false,
    );

    mmio.set_dispcnt(ctl.into());
}
