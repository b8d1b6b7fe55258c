//! The two scrolling tiled background layers and the tile lookup the
//! collision logic is built on.

use bilge::prelude::*;

use crate::assets::{AssetError, Background, image_words};
use crate::display::Priority;
use crate::display::registers::{
    BackgroundColourDepth, BackgroundControl, BackgroundOverflowBehaviour,
};
use crate::mmio::{Dma16Dest, Mmio, char_block, screen_block};

/// Screen block holding the rear layer's tile indices.
const LAYER0_SCREEN_BLOCK: usize = 16;
/// Screen block holding the front layer's tile indices.
const LAYER1_SCREEN_BLOCK: usize = 15;

/// Side of one tile in pixels.
pub const TILE_SIZE: i32 = 8;

/// An immutable grid of tile indices.
#[derive(Debug)]
pub struct TileMap {
    width: i32,
    height: i32,
    tiles: Vec<u16>,
}

impl TileMap {
    /// Builds a map, rejecting data whose length does not match the claimed
    /// dimensions.
    pub fn new(width: i32, height: i32, tiles: Vec<u16>) -> Result<Self, AssetError> {
        if width <= 0 || height <= 0 || tiles.len() != (width * height) as usize {
            return Err(AssetError::MapDimensions {
                width,
                height,
                len: tiles.len(),
            });
        }
        Ok(TileMap {
            width,
            height,
            tiles,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub(crate) fn data(&self) -> &[u16] {
        &self.tiles
    }
}

/// Maps a screen pixel coordinate plus scroll to the tile index under it.
///
/// Both axes wrap, so any `i32` input is valid; the scroll is added with
/// wrapping arithmetic so arbitrarily large offsets cannot overflow.
#[must_use]
pub fn tile_lookup(x: i32, y: i32, xscroll: i32, yscroll: i32, map: &TileMap) -> u16 {
    let tx = (x.wrapping_add(xscroll) >> 3).rem_euclid(map.width);
    let ty = (y.wrapping_add(yscroll) >> 3).rem_euclid(map.height);

    map.tiles[(ty * map.width + tx) as usize]
}

/// Loads the shared background image and palette and points both layers at
/// their tile index tables.
///
/// The image goes into character blocks 0 and 1 so each layer's screen
/// block can index the same tile data independently. The index tables are
/// written last; on this hardware map the tail of a large image and the
/// screen blocks overlap, and the tables must win.
pub fn load_background(
    mmio: &mut Mmio,
    background: &Background,
    layer0: &TileMap,
    layer1: &TileMap,
) -> Result<(), AssetError> {
    background.validate()?;

    mmio.dma_copy16(Dma16Dest::Palette(0), &background.palette);

    let image = image_words(&background.image);
    mmio.dma_copy16(Dma16Dest::Vram(char_block(0)), &image);
    mmio.dma_copy16(Dma16Dest::Vram(char_block(1)), &image);

    let layer0_control = BackgroundControl::new(
        Priority::P1.into(),
        u2::new(0),
        u2::new(0),
        false,
        BackgroundColourDepth::EightBpp,
        u5::new(LAYER0_SCREEN_BLOCK as u8),
        BackgroundOverflowBehaviour::Wraparound,
        u2::new(0),
    );
    mmio.set_bg_control(0, layer0_control.into());

    let layer1_control = BackgroundControl::new(
        Priority::P0.into(),
        u2::new(0),
        u2::new(0),
        false,
        BackgroundColourDepth::EightBpp,
        u5::new(LAYER1_SCREEN_BLOCK as u8),
        BackgroundOverflowBehaviour::Wraparound,
        u2::new(0),
    );
    mmio.set_bg_control(1, layer1_control.into());

    mmio.dma_copy16(
        Dma16Dest::Vram(screen_block(LAYER0_SCREEN_BLOCK)),
        layer0.data(),
    );
    mmio.dma_copy16(
        Dma16Dest::Vram(screen_block(LAYER1_SCREEN_BLOCK)),
        layer1.data(),
    );

    Ok(())
}

/// The two horizontal scroll offsets.
///
/// Both start at zero each round and only ever advance; the rear layer
/// moves at twice the rate of the front one for the parallax effect.
pub struct ScrollState {
    layer0: i32,
    layer1: i32,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollState {
    #[must_use]
    pub fn new() -> Self {
        ScrollState {
            layer0: 0,
            layer1: 0,
        }
    }

    /// Advances both offsets. `dx` must not be negative: a round's scroll
    /// never reverses.
    pub fn advance(&mut self, dx: i32) {
        debug_assert!(dx >= 0);
        self.layer1 += dx;
        self.layer0 += dx * 2;
    }

    /// The front layer offset, the one game logic measures the world by.
    #[must_use]
    pub fn x_offset(&self) -> i32 {
        self.layer1
    }

    /// Writes both scroll registers, done once per frame during the blank.
    pub fn commit(&self, mmio: &mut Mmio) {
        mmio.set_bg_scroll(0, self.layer0 as u16, 0);
        mmio.set_bg_scroll(1, self.layer1 as u16, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker_map() -> TileMap {
        // 4x3 map numbered row major
        TileMap::new(4, 3, (0..12).collect()).unwrap()
    }

    #[test]
    fn lookup_depends_only_on_wrapped_tile_coordinate() {
        let map = checker_map();

        for x in [-800, -33, -1, 0, 17, 31, 1000] {
            let base = tile_lookup(x, 0, 0, 0, &map);
            assert_eq!(tile_lookup(x + 4 * 8, 0, 0, 0, &map), base);
            assert_eq!(tile_lookup(x - 4 * 8 * 10, 0, 0, 0, &map), base);
        }

        for y in [-25, 0, 7, 8, 95] {
            let base = tile_lookup(0, y, 0, 0, &map);
            assert_eq!(tile_lookup(0, y + 3 * 8 * 7, 0, 0, &map), base);
        }
    }

    #[test]
    fn lookup_survives_extreme_scroll_offsets() {
        let map = checker_map();
        // the original's repeated subtraction would spin on these
        let _ = tile_lookup(10, 10, i32::MAX, i32::MIN, &map);
        assert_eq!(
            tile_lookup(0, 0, i32::MAX, 0, &map),
            tile_lookup(i32::MAX, 0, 0, 0, &map)
        );
    }

    #[test]
    fn lookup_indexes_row_major() {
        let map = checker_map();
        assert_eq!(tile_lookup(0, 0, 0, 0, &map), 0);
        assert_eq!(tile_lookup(8, 0, 0, 0, &map), 1);
        assert_eq!(tile_lookup(9, 9, 0, 0, &map), 5);
        assert_eq!(tile_lookup(0, 0, 8, 8, &map), 5);
    }

    #[test]
    fn map_dimensions_are_validated() {
        assert_eq!(
            TileMap::new(4, 3, vec![0; 11]).unwrap_err(),
            AssetError::MapDimensions {
                width: 4,
                height: 3,
                len: 11
            }
        );
        assert!(TileMap::new(0, 3, vec![]).is_err());
    }

    #[test]
    fn scroll_layers_advance_with_parallax() {
        let mut scroll = ScrollState::new();
        scroll.advance(3);
        scroll.advance(2);
        assert_eq!(scroll.x_offset(), 5);

        let mut mmio = Mmio::new();
        scroll.commit(&mut mmio);
        assert_eq!(mmio.bg_scroll(0), (10, 0));
        assert_eq!(mmio.bg_scroll(1), (5, 0));
    }

    #[test]
    fn scroll_registers_wrap_at_nine_bits() {
        let mut scroll = ScrollState::new();
        scroll.advance(300);
        let mut mmio = Mmio::new();
        scroll.commit(&mut mmio);
        assert_eq!(mmio.bg_scroll(0), (600 % 512, 0));
        assert_eq!(mmio.bg_scroll(1), (300, 0));
    }
}
