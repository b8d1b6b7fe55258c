//! Asset containers and their load-time validation, plus the built in demo
//! assets.
//!
//! The original ships its graphics as opaque arrays dumped from an image
//! pipeline. The demo assets here are synthesised instead, but they flow
//! through exactly the same validation and loaders as externally supplied
//! data would.

use thiserror::Error;

use crate::display::tiled::TileMap;

/// Number of colours in every palette.
pub const PALETTE_SIZE: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("palette must have exactly {PALETTE_SIZE} entries, got {0}")]
    PaletteSize(usize),
    #[error("tile image length must be even, got {0} bytes")]
    OddImageLength(usize),
    #[error("image is {width}x{height} but carries {len} bytes")]
    ImageDimensions { width: i32, height: i32, len: usize },
    #[error("tile map claims {width}x{height} but carries {len} entries")]
    MapDimensions { width: i32, height: i32, len: usize },
}

/// A 256 colour background image: palette plus 8bpp tile data.
pub struct Background {
    pub palette: Vec<u16>,
    pub image: Vec<u8>,
    pub width: i32,
    pub height: i32,
}

impl Background {
    pub fn validate(&self) -> Result<(), AssetError> {
        validate_image(&self.palette, &self.image, self.width, self.height)
    }
}

/// A 256 colour sprite sheet in 1D tile order.
pub struct SpriteSheet {
    pub palette: Vec<u16>,
    pub image: Vec<u8>,
    pub width: i32,
    pub height: i32,
}

impl SpriteSheet {
    pub fn validate(&self) -> Result<(), AssetError> {
        validate_image(&self.palette, &self.image, self.width, self.height)
    }
}

fn validate_image(
    palette: &[u16],
    image: &[u8],
    width: i32,
    height: i32,
) -> Result<(), AssetError> {
    if palette.len() != PALETTE_SIZE {
        return Err(AssetError::PaletteSize(palette.len()));
    }
    if image.len() % 2 != 0 {
        return Err(AssetError::OddImageLength(image.len()));
    }
    if (width * height) as usize != image.len() {
        return Err(AssetError::ImageDimensions {
            width,
            height,
            len: image.len(),
        });
    }
    Ok(())
}

/// Pairs image bytes into the 16 bit words the copy engine moves.
pub(crate) fn image_words(image: &[u8]) -> Vec<u16> {
    image
        .chunks_exact(2)
        .map(|pair| u16::from(pair[0]) | (u16::from(pair[1]) << 8))
        .collect()
}

/// Everything one round needs.
pub struct GameAssets {
    pub background: Background,
    pub sprites: SpriteSheet,
    /// Rear layer indices; also the map the actors collide against.
    pub ground: TileMap,
    /// Front layer indices, mostly transparent decoration.
    pub overlay: TileMap,
}

// Demo tile indices. The block tile deliberately sits in the high index
// range the ground predicate treats as solid.
pub const TILE_SKY: u16 = 0;
pub const TILE_CLEAR: u16 = 1;
pub const TILE_HILL_TOP: u16 = 2;
pub const TILE_HILL: u16 = 3;
pub const TILE_CLOUD: u16 = 4;
pub const TILE_BLOCK: u16 = 600;

/// First map row of solid ground in the demo map.
pub const GROUND_ROW: i32 = 18;

const DEMO_TILE_COUNT: usize = TILE_BLOCK as usize + 8;
const MAP_SIDE: i32 = 32;

const fn rgb15(r: u16, g: u16, b: u16) -> u16 {
    r | (g << 5) | (b << 10)
}

fn background_palette() -> Vec<u16> {
    let mut palette = vec![0u16; PALETTE_SIZE];
    palette[0] = rgb15(4, 6, 12); // backdrop
    palette[1] = rgb15(14, 22, 30); // sky
    palette[2] = rgb15(18, 25, 31); // sky highlight
    palette[3] = rgb15(4, 14, 5); // hill
    palette[4] = rgb15(8, 20, 8); // hill highlight
    palette[5] = rgb15(14, 7, 2); // brick dark
    palette[6] = rgb15(20, 11, 4); // brick
    palette[7] = rgb15(26, 22, 16); // mortar
    palette[8] = rgb15(31, 31, 31); // cloud
    palette[9] = rgb15(22, 24, 27); // cloud shadow
    palette
}

fn paint_tile(image: &mut [u8], index: u16, paint: impl Fn(usize, usize) -> u8) {
    let base = index as usize * 64;
    for y in 0..8 {
        for x in 0..8 {
            image[base + y * 8 + x] = paint(x, y);
        }
    }
}

fn demo_background() -> Background {
    let mut image = vec![0u8; DEMO_TILE_COUNT * 64];

    paint_tile(&mut image, TILE_SKY, |x, y| {
        if (x + 3 * y) % 13 == 0 { 2 } else { 1 }
    });
    // TILE_CLEAR stays all zero: colour 0 is transparent
    paint_tile(&mut image, TILE_HILL_TOP, |x, y| {
        let crest = 2 + (x % 4) / 2;
        if y < crest {
            1
        } else if y == crest {
            4
        } else {
            3
        }
    });
    paint_tile(&mut image, TILE_HILL, |x, y| {
        if (x + 5 * y) % 11 == 0 { 4 } else { 3 }
    });
    paint_tile(&mut image, TILE_CLOUD, |x, y| {
        let dx = x as i32 * 2 - 7;
        let dy = y as i32 * 2 - 7;
        if dx * dx + dy * dy > 52 {
            0
        } else if y >= 6 {
            9
        } else {
            8
        }
    });
    paint_tile(&mut image, TILE_BLOCK, |x, y| {
        let course = y % 4;
        let stagger = if y < 4 { 0 } else { 4 };
        if course == 0 || (x + stagger) % 8 == 7 {
            7
        } else if (x + 3 * y) % 7 == 0 {
            5
        } else {
            6
        }
    });

    // 64 bytes per tile, laid out 16 tiles to a row for the dimension check
    let width = 128;
    let height = (image.len() / width as usize) as i32;

    Background {
        palette: background_palette(),
        image,
        width,
        height,
    }
}

fn demo_maps() -> Result<(TileMap, TileMap), AssetError> {
    let mut ground = Vec::with_capacity((MAP_SIDE * MAP_SIDE) as usize);
    for row in 0..MAP_SIDE {
        for _col in 0..MAP_SIDE {
            let tile = if row < GROUND_ROW - 3 {
                TILE_SKY
            } else if row == GROUND_ROW - 3 {
                TILE_HILL_TOP
            } else if row < GROUND_ROW {
                TILE_HILL
            } else {
                TILE_BLOCK
            };
            ground.push(tile);
        }
    }

    let mut overlay = vec![TILE_CLEAR; (MAP_SIDE * MAP_SIDE) as usize];
    for &(col, row, len) in &[(2, 3, 3), (10, 5, 4), (19, 2, 2), (26, 4, 3)] {
        for i in 0..len {
            overlay[(row * MAP_SIDE + col + i) as usize] = TILE_CLOUD;
        }
    }

    Ok((
        TileMap::new(MAP_SIDE, MAP_SIDE, ground)?,
        TileMap::new(MAP_SIDE, MAP_SIDE, overlay)?,
    ))
}

fn sprite_palette() -> Vec<u16> {
    let mut palette = vec![0u16; PALETTE_SIZE];
    palette[1] = rgb15(2, 4, 2); // outline
    palette[2] = rgb15(4, 16, 6); // shell
    palette[3] = rgb15(10, 24, 10); // shell highlight
    palette[4] = rgb15(28, 24, 8); // skin
    palette[5] = rgb15(31, 29, 16); // skin highlight
    palette[6] = rgb15(31, 31, 31); // eye
    palette[7] = rgb15(24, 6, 4); // feet
    palette
}

// Two 16x32 walk frames, drawn facing right. '.' is transparent.
#[rustfmt::skip]
const WALKER_FRAMES: [&[&str; 32]; 2] = [
    &[
        "................",
        "......kkkk......",
        ".....kyyyyk.....",
        "....kyyYwwyk....",
        "....kyyYwkyk....",
        "....kyyyyyyk....",
        ".....kyyyyk.....",
        "......kyyk......",
        ".....kkggkk.....",
        "....kgggggggk...",
        "...kgGGgggGggk..",
        "..kgGggggggggk..",
        "..kgGgggkkgggk..",
        "..kggggkkkkggk..",
        "..kgggkkkkkggk..",
        "..kggggkkgggk...",
        "..kgGggggggggk..",
        "..kgGGgggGgggk..",
        "...kgggggggk....",
        "....kgggggk.....",
        ".....kgggk......",
        ".....kyyyk......",
        ".....kyyyk......",
        "....kyykyyk.....",
        "....kyykyyk.....",
        "....kyykyyk.....",
        "...kyyk.kyyk....",
        "...kyyk.kyyk....",
        "...kyyk.kyyk....",
        "..krrrk.krrrk...",
        "..krrrk.krrrk...",
        "..kkkkk.kkkkk...",
    ],
    &[
        "................",
        "......kkkk......",
        ".....kyyyyk.....",
        "....kyyYwwyk....",
        "....kyyYwkyk....",
        "....kyyyyyyk....",
        ".....kyyyyk.....",
        "......kyyk......",
        ".....kkggkk.....",
        "....kgggggggk...",
        "...kgGGgggGggk..",
        "..kgGggggggggk..",
        "..kgGgggkkgggk..",
        "..kggggkkkkggk..",
        "..kgggkkkkkggk..",
        "..kggggkkgggk...",
        "..kgGggggggggk..",
        "..kgGGgggGgggk..",
        "...kgggggggk....",
        "....kgggggk.....",
        ".....kgggk......",
        ".....kyyyk......",
        "....kyyyyyk.....",
        "....kyykyyyk....",
        "...kyyk..kyyk...",
        "...kyyk..kyyk...",
        "..kyyk....kyyk..",
        "..kyyk....kyyk..",
        ".kyyk......kyyk.",
        ".krrrk....krrrk.",
        ".krrrk....krrrk.",
        ".kkkkk....kkkkk.",
    ],
];

fn sprite_pixel(c: u8) -> u8 {
    match c {
        b'k' => 1,
        b'g' => 2,
        b'G' => 3,
        b'y' => 4,
        b'Y' => 5,
        b'w' => 6,
        b'r' => 7,
        _ => 0,
    }
}

fn demo_sprites() -> SpriteSheet {
    // 1D mapping: each frame is 2x4 tiles of 64 bytes, row major
    let mut image = Vec::with_capacity(WALKER_FRAMES.len() * 1024);
    for frame in WALKER_FRAMES {
        for tile_row in 0..4 {
            for tile_col in 0..2 {
                for y in 0..8 {
                    let row = frame[tile_row * 8 + y].as_bytes();
                    for x in 0..8 {
                        image.push(sprite_pixel(row[tile_col * 8 + x]));
                    }
                }
            }
        }
    }

    SpriteSheet {
        palette: sprite_palette(),
        image,
        width: 16,
        height: 64,
    }
}

impl GameAssets {
    /// The built in chase demo assets.
    pub fn demo() -> Result<GameAssets, AssetError> {
        let background = demo_background();
        let sprites = demo_sprites();
        background.validate()?;
        sprites.validate()?;
        let (ground, overlay) = demo_maps()?;

        Ok(GameAssets {
            background,
            sprites,
            ground,
            overlay,
        })
    }
}
