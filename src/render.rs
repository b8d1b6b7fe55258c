//! Software compositor for the modelled video chip.
//!
//! Rasterises whatever is in the registers, palette RAM, VRAM and OAM to an
//! RGB framebuffer, the way the chip itself would scan it out for this
//! demo's configuration: tiled mode 0, 256 colour backgrounds and objects.
//! Intentionally not a complete video core; unsupported configurations
//! (bitmap modes, 16 colour layers, affine objects) simply do not draw.

use crate::display::object::{
    ObjectAttribute0, ObjectAttribute1, ObjectAttribute2, SPRITE_COUNT, Size,
};
use crate::display::registers::{BackgroundColourDepth, BackgroundControl, DisplayControl};
use crate::display::{HEIGHT, WIDTH};
use crate::mmio::Mmio;

/// Pixels in one output frame.
pub const FRAME_PIXELS: usize = (WIDTH * HEIGHT) as usize;

const OBJ_TILE_BASE_BYTES: usize = 0x10000;

/// Expands a 15 bit BGR colour to 0RGB8888.
fn colour(bgr555: u16) -> u32 {
    let expand = |v: u32| (v << 3) | (v >> 2);
    let r = expand(u32::from(bgr555) & 0x1f);
    let g = expand((u32::from(bgr555) >> 5) & 0x1f);
    let b = expand((u32::from(bgr555) >> 10) & 0x1f);
    (r << 16) | (g << 8) | b
}

/// Renders the current hardware state into `frame`, which must hold
/// [`FRAME_PIXELS`] packed 0RGB pixels.
pub fn render(mmio: &Mmio, frame: &mut [u32]) {
    assert_eq!(frame.len(), FRAME_PIXELS);

    let control = DisplayControl::from(mmio.dispcnt());

    if control.forced_blank() {
        frame.fill(colour(0x7fff));
        return;
    }

    frame.fill(colour(mmio.palette_word(0)));

    if control.video_mode().value() != 0 {
        return;
    }

    // back to front: priority 3 first, objects above backgrounds of the
    // same priority, background 0 above background 1
    for priority in (0..4u8).rev() {
        for layer in (0..2usize).rev() {
            if control.enabled_backgrounds().value() & (1 << layer) != 0 {
                let bgcnt = BackgroundControl::from(mmio.bg_control(layer));
                if bgcnt.priority() as u8 == priority {
                    draw_background(mmio, bgcnt, mmio.bg_scroll(layer), frame);
                }
            }
        }
        if control.obj_display() {
            draw_objects(mmio, priority, control.obj_character_mapping(), frame);
        }
    }
}

fn draw_background(
    mmio: &Mmio,
    bgcnt: BackgroundControl,
    (hofs, vofs): (u16, u16),
    frame: &mut [u32],
) {
    if bgcnt.colour_depth() != BackgroundColourDepth::EightBpp {
        return;
    }

    let char_base_bytes = bgcnt.char_base_block().value() as usize * 0x4000;
    let screen_base_words = bgcnt.screen_base_block().value() as usize * 0x400;

    for sy in 0..HEIGHT as usize {
        for sx in 0..WIDTH as usize {
            // size field 0: 256x256 with wraparound
            let x = (sx + hofs as usize) % 256;
            let y = (sy + vofs as usize) % 256;

            let entry = mmio.vram_word(screen_base_words + (y / 8) * 32 + x / 8);
            let tile = (entry & 0x3ff) as usize;

            let index = mmio.vram_byte(char_base_bytes + tile * 64 + (y % 8) * 8 + x % 8);
            if index != 0 {
                frame[sy * WIDTH as usize + sx] = colour(mmio.palette_word(index as usize));
            }
        }
    }
}

fn draw_objects(mmio: &Mmio, priority: u8, one_dimensional: bool, frame: &mut [u32]) {
    // reverse order so the lowest numbered sprite ends up on top
    for slot in (0..SPRITE_COUNT).rev() {
        let a0 = ObjectAttribute0::from(mmio.oam_word(slot * 4));
        let a1 = ObjectAttribute1::from(mmio.oam_word(slot * 4 + 1));
        let a2 = ObjectAttribute2::from(mmio.oam_word(slot * 4 + 2));

        // normal render mode, 256 colours, requested priority only
        if a0.object_mode().value() != 0
            || a0.colour_mode().value() != 1
            || a2.priority().value() != priority
        {
            continue;
        }

        let size = Size::from_shape_size(a0.shape().value(), a1.size().value());
        let (width, height) = size.to_width_height();

        // coordinates close to the top of their range reach in from
        // off screen
        let mut x = i32::from(a1.x().value());
        if x >= 512 - 64 {
            x -= 512;
        }
        let mut y = i32::from(a0.y());
        if y >= 256 - 64 {
            y -= 256;
        }

        let tile_base = u32::from(a2.tile_index().value()) as usize;
        let row_stride = if one_dimensional {
            (width / 8) as usize * 2
        } else {
            32
        };

        for py in 0..height {
            let sy = y + py;
            if !(0..HEIGHT).contains(&sy) {
                continue;
            }
            for px in 0..width {
                let sx = x + px;
                if !(0..WIDTH).contains(&sx) {
                    continue;
                }

                let tx = (if a1.horizontal_flip() { width - 1 - px } else { px }) as usize;
                let ty = (if a1.vertical_flip() { height - 1 - py } else { py }) as usize;

                let tile = (tile_base + (ty / 8) * row_stride + (tx / 8) * 2) & 0x3ff;
                let byte = OBJ_TILE_BASE_BYTES + tile * 32 + (ty % 8) * 8 + tx % 8;

                let index = mmio.vram_byte(byte);
                if index != 0 {
                    frame[(sy * WIDTH + sx) as usize] =
                        colour(mmio.palette_word(256 + index as usize));
                }
            }
        }
    }
}
