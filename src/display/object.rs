//! The fixed pool of 128 hardware sprites.
//!
//! Each sprite is four packed attribute words in object attribute memory.
//! The pool hands out [`SpriteId`]s from an append-only counter, mutates the
//! shadow copy through the frame, and pushes the whole table to OAM in one
//! bulk copy per frame. Slots are never freed individually; a
//! [`SpritePool::reset`] wipes the lot at the start of a round.

use bilge::prelude::*;
use thiserror::Error;

use crate::assets::{AssetError, SpriteSheet, image_words};
use crate::display::{HEIGHT, Priority, WIDTH};
use crate::mmio::{Dma16Dest, Mmio, OBJ_PALETTE_BASE, OBJ_TILE_BASE};

/// Number of sprites the hardware provides.
pub const SPRITE_COUNT: usize = 128;

#[bitsize(16)]
#[derive(Clone, Copy, FromBits)]
pub(crate) struct ObjectAttribute0 {
    pub y: u8,
    pub object_mode: u2,
    pub graphics_mode: u2,
    pub mosaic: bool,
    /// Set for 256 colour sprites.
    pub colour_mode: u1,
    pub shape: u2,
}

#[bitsize(16)]
#[derive(Clone, Copy, FromBits)]
pub(crate) struct ObjectAttribute1 {
    pub x: u9,
    _unused: u3,
    pub horizontal_flip: bool,
    pub vertical_flip: bool,
    pub size: u2,
}

#[bitsize(16)]
#[derive(Clone, Copy, FromBits)]
pub(crate) struct ObjectAttribute2 {
    pub tile_index: u10,
    pub priority: u2,
    pub palette_bank: u4,
}

#[derive(Clone, Copy)]
struct Attributes {
    a0: ObjectAttribute0,
    a1: ObjectAttribute1,
    a2: ObjectAttribute2,
}

impl Attributes {
    /// A slot parked just past the visible area so it cannot flash on
    /// screen before it is reassigned.
    fn parked() -> Self {
        Attributes {
            a0: ObjectAttribute0::from(HEIGHT as u16),
            a1: ObjectAttribute1::from(WIDTH as u16),
            a2: ObjectAttribute2::from(0),
        }
    }
}

/// The sizes of sprite supported by the hardware.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(missing_docs)]
pub enum Size {
    // stored as shape then size bits
    S8x8 = 0b00_00,
    S16x16 = 0b00_01,
    S32x32 = 0b00_10,
    S64x64 = 0b00_11,

    S16x8 = 0b01_00,
    S32x8 = 0b01_01,
    S32x16 = 0b01_10,
    S64x32 = 0b01_11,

    S8x16 = 0b10_00,
    S8x32 = 0b10_01,
    S16x32 = 0b10_10,
    S32x64 = 0b10_11,
}

impl Size {
    const fn shape_size(self) -> (u8, u8) {
        (self as u8 >> 2, self as u8 & 0b11)
    }

    /// Decodes the attribute bits back into a size. The fourth shape value
    /// is prohibited by the hardware; it decodes as the square shapes.
    pub(crate) const fn from_shape_size(shape: u8, size: u8) -> Size {
        match (shape & 0b11, size & 0b11) {
            (0b01, 0b00) => Size::S16x8,
            (0b01, 0b01) => Size::S32x8,
            (0b01, 0b10) => Size::S32x16,
            (0b01, 0b11) => Size::S64x32,
            (0b10, 0b00) => Size::S8x16,
            (0b10, 0b01) => Size::S8x32,
            (0b10, 0b10) => Size::S16x32,
            (0b10, 0b11) => Size::S32x64,
            (_, 0b00) => Size::S8x8,
            (_, 0b01) => Size::S16x16,
            (_, 0b10) => Size::S32x32,
            (_, _) => Size::S64x64,
        }
    }

    #[must_use]
    pub const fn to_width_height(self) -> (i32, i32) {
        match self {
            Size::S8x8 => (8, 8),
            Size::S16x16 => (16, 16),
            Size::S32x32 => (32, 32),
            Size::S64x64 => (64, 64),
            Size::S16x8 => (16, 8),
            Size::S32x8 => (32, 8),
            Size::S32x16 => (32, 16),
            Size::S64x32 => (64, 32),
            Size::S8x16 => (8, 16),
            Size::S8x32 => (8, 32),
            Size::S16x32 => (16, 32),
            Size::S32x64 => (32, 64),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpriteError {
    /// More sprites were requested than the hardware table holds.
    #[error("all {} hardware sprite slots are in use", SPRITE_COUNT)]
    PoolExhausted,
}

/// Handle to one slot in the pool, valid until the next
/// [`SpritePool::reset`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SpriteId(usize);

/// Shadow copy of object attribute memory plus the next-free counter.
pub struct SpritePool {
    entries: [Attributes; SPRITE_COUNT],
    next_free: usize,
}

impl Default for SpritePool {
    fn default() -> Self {
        Self::new()
    }
}

impl SpritePool {
    #[must_use]
    pub fn new() -> Self {
        SpritePool {
            entries: [Attributes::parked(); SPRITE_COUNT],
            next_free: 0,
        }
    }

    /// Parks every slot off screen and starts allocation over. Previously
    /// handed out [`SpriteId`]s are dead after this.
    pub fn reset(&mut self) {
        self.next_free = 0;
        self.entries = [Attributes::parked(); SPRITE_COUNT];
    }

    /// Number of slots claimed since the last reset.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.next_free
    }

    /// Claims the next free slot and encodes the sprite into it.
    ///
    /// The hardware would silently run off the end of the table; here the
    /// 129th allocation since a reset is an error.
    pub fn allocate(
        &mut self,
        x: i32,
        y: i32,
        size: Size,
        horizontal_flip: bool,
        vertical_flip: bool,
        tile_index: u16,
        priority: Priority,
    ) -> Result<SpriteId, SpriteError> {
        if self.next_free >= SPRITE_COUNT {
            return Err(SpriteError::PoolExhausted);
        }
        let id = SpriteId(self.next_free);
        self.next_free += 1;

        let (shape, size_bits) = size.shape_size();

        self.entries[id.0] = Attributes {
            a0: ObjectAttribute0::new(
                (y & 0xff) as u8,
                u2::new(0), // normal rendering
                u2::new(0),
                false,
                u1::new(1), // 256 colours
                u2::new(shape),
            ),
            a1: ObjectAttribute1::new(
                u9::new((x & 0x1ff) as u16),
                u3::new(0),
                horizontal_flip,
                vertical_flip,
                u2::new(size_bits),
            ),
            a2: ObjectAttribute2::new(
                u10::new(tile_index & 0x3ff),
                u2::new(priority as u8),
                u4::new(0),
            ),
        };

        Ok(id)
    }

    /// Stores a position. Coordinates wrap into the hardware's 9 bit x and
    /// 8 bit y ranges.
    pub fn set_position(&mut self, sprite: SpriteId, x: i32, y: i32) {
        let entry = &mut self.entries[sprite.0];
        entry.a0.set_y((y & 0xff) as u8);
        entry.a1.set_x(u9::new((x & 0x1ff) as u16));
    }

    /// Offsets the currently stored (already wrapped) position.
    pub fn move_by(&mut self, sprite: SpriteId, dx: i32, dy: i32) {
        let (x, y) = self.position(sprite);
        self.set_position(sprite, x + dx, y + dy);
    }

    /// The stored, wrapped position.
    #[must_use]
    pub fn position(&self, sprite: SpriteId) -> (i32, i32) {
        let entry = &self.entries[sprite.0];
        (
            i32::from(entry.a1.x().value()),
            i32::from(entry.a0.y()),
        )
    }

    pub fn set_hflip(&mut self, sprite: SpriteId, flip: bool) {
        self.entries[sprite.0].a1.set_horizontal_flip(flip);
    }

    pub fn set_vflip(&mut self, sprite: SpriteId, flip: bool) {
        self.entries[sprite.0].a1.set_vertical_flip(flip);
    }

    /// Replaces the low 10 bits of the tile index, the animation hook.
    pub fn set_tile_offset(&mut self, sprite: SpriteId, offset: u16) {
        self.entries[sprite.0].a2.set_tile_index(u10::new(offset & 0x3ff));
    }

    /// Pushes the whole table (all 128 slots, active or not) to OAM.
    /// Called once per frame after all mutations.
    pub fn commit(&self, mmio: &mut Mmio) {
        let mut words = [0u16; SPRITE_COUNT * 4];
        for (slot, entry) in self.entries.iter().enumerate() {
            words[slot * 4] = entry.a0.into();
            words[slot * 4 + 1] = entry.a1.into();
            words[slot * 4 + 2] = entry.a2.into();
        }
        mmio.dma_copy16(Dma16Dest::Oam(0), &words);
    }
}

/// Loads the sprite palette and tile image into object memory.
pub fn load_sprite_image(mmio: &mut Mmio, sheet: &SpriteSheet) -> Result<(), AssetError> {
    sheet.validate()?;

    mmio.dma_copy16(Dma16Dest::Palette(OBJ_PALETTE_BASE), &sheet.palette);
    mmio.dma_copy16(Dma16Dest::Vram(OBJ_TILE_BASE), &image_words(&sheet.image));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_with_one() -> (SpritePool, SpriteId) {
        let mut pool = SpritePool::new();
        let id = pool
            .allocate(10, 20, Size::S16x32, false, false, 0, Priority::P0)
            .unwrap();
        (pool, id)
    }

    #[test]
    fn positions_wrap_into_hardware_ranges() {
        let (mut pool, id) = pool_with_one();

        pool.set_position(id, 700, 300);
        assert_eq!(pool.position(id), (700 % 512, 300 % 256));

        pool.set_position(id, -1, -2);
        assert_eq!(pool.position(id), (511, 254));
    }

    #[test]
    fn move_by_offsets_the_stored_position() {
        let (mut pool, id) = pool_with_one();
        pool.move_by(id, 5, -3);
        assert_eq!(pool.position(id), (15, 17));
    }

    #[test]
    fn pool_holds_exactly_128_sprites() {
        let mut pool = SpritePool::new();
        for _ in 0..SPRITE_COUNT {
            pool.allocate(0, 0, Size::S8x8, false, false, 0, Priority::P0)
                .unwrap();
        }
        assert_eq!(
            pool.allocate(0, 0, Size::S8x8, false, false, 0, Priority::P0),
            Err(SpriteError::PoolExhausted)
        );

        pool.reset();
        assert!(
            pool.allocate(0, 0, Size::S8x8, false, false, 0, Priority::P0)
                .is_ok()
        );
        assert_eq!(pool.allocated(), 1);
    }

    #[test]
    fn reset_parks_slots_off_screen() {
        let (mut pool, id) = pool_with_one();
        pool.reset();
        assert_eq!(pool.position(id), (WIDTH, HEIGHT));
    }

    #[test]
    fn tile_offset_is_masked_to_ten_bits() {
        let (mut pool, id) = pool_with_one();
        pool.set_tile_offset(id, 0x1234);
        let mut mmio = Mmio::new();
        pool.commit(&mut mmio);
        assert_eq!(mmio.oam_word(2) & 0x3ff, 0x234);
    }

    #[test]
    fn commit_writes_packed_attributes_to_oam() {
        let mut pool = SpritePool::new();
        let id = pool
            .allocate(100, 113, Size::S16x32, false, false, 16, Priority::P0)
            .unwrap();
        pool.set_hflip(id, true);

        let mut mmio = Mmio::new();
        pool.commit(&mut mmio);

        // y, 256 colour mode, tall shape
        assert_eq!(mmio.oam_word(0), 113 | (1 << 13) | (0b10 << 14));
        // x, h-flip, 16x32 size bits
        assert_eq!(mmio.oam_word(1), 100 | (1 << 12) | (0b10 << 14));
        // tile index
        assert_eq!(mmio.oam_word(2), 16);

        // slot 1 is parked off screen
        assert_eq!(mmio.oam_word(4) & 0xff, HEIGHT as u16);
        assert_eq!(mmio.oam_word(5) & 0x1ff, WIDTH as u16);
    }

    #[test]
    fn size_encoding_matches_attribute_bits() {
        assert_eq!(Size::S16x32.shape_size(), (0b10, 0b10));
        assert_eq!(Size::S64x64.shape_size(), (0b00, 0b11));
        assert_eq!(Size::S16x32.to_width_height(), (16, 32));
    }
}
