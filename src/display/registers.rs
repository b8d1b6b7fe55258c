//! Bit layouts of the display and background control words.
//!
//! These are the only place raw bit packing happens; everything else in the
//! crate works with the named fields.

use bilge::prelude::*;

use crate::display::Priority;

#[bitsize(16)]
#[derive(Clone, Copy, FromBits)]
pub(crate) struct DisplayControl {
    pub video_mode: u3,
    _reserved: u1,
    _display_frame_select: u1,
    pub hblank_interval_free: bool,
    /// 1D object tile mapping when set, 2D when clear.
    pub obj_character_mapping: bool,
    pub forced_blank: bool,
    pub enabled_backgrounds: u4,
    pub obj_display: bool,
    pub window0_display: bool,
    pub window1_display: bool,
    pub obj_window_display: bool,
}

#[bitsize(1)]
#[derive(Clone, Copy, FromBits, PartialEq, Eq, Debug)]
pub(crate) enum BackgroundColourDepth {
    FourBpp = 0,
    EightBpp = 1,
}

#[bitsize(1)]
#[derive(Clone, Copy, FromBits, PartialEq, Eq, Debug)]
pub(crate) enum BackgroundOverflowBehaviour {
    Transparent = 0,
    Wraparound = 1,
}

#[bitsize(2)]
#[derive(Clone, Copy, FromBits, PartialEq, Eq)]
pub(crate) enum BackgroundControlPriority {
    P0,
    P1,
    P2,
    P3,
}

impl From<Priority> for BackgroundControlPriority {
    fn from(value: Priority) -> Self {
        match value {
            Priority::P0 => Self::P0,
            Priority::P1 => Self::P1,
            Priority::P2 => Self::P2,
            Priority::P3 => Self::P3,
        }
    }
}

impl From<BackgroundControlPriority> for Priority {
    fn from(value: BackgroundControlPriority) -> Self {
        match value {
            BackgroundControlPriority::P0 => Self::P0,
            BackgroundControlPriority::P1 => Self::P1,
            BackgroundControlPriority::P2 => Self::P2,
            BackgroundControlPriority::P3 => Self::P3,
        }
    }
}

#[bitsize(16)]
#[derive(Clone, Copy, FromBits)]
pub(crate) struct BackgroundControl {
    pub priority: BackgroundControlPriority,
    pub char_base_block: u2,
    _zero: u2,
    pub mosaic: bool,
    pub colour_depth: BackgroundColourDepth,
    pub screen_base_block: u5,
    pub overflow_behaviour: BackgroundOverflowBehaviour,
    /// 0 is 256x256 pixels; the only size this crate configures.
    pub screen_size: u2,
}
