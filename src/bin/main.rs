//! Windowed frontend: presents the composited frame, maps the keyboard
//! onto the button register and paces the game to the display refresh.

use std::path::{Path, PathBuf};

use clap::Parser;
use minifb::{Key, Scale, Window, WindowOptions};

use shellrun::assets::GameAssets;
use shellrun::display::{HEIGHT, WIDTH};
use shellrun::input::{self, Button};
use shellrun::mmio::{FrameBudget, FrameClock, Mmio, VBLANK_SCANLINE};
use shellrun::game;
use shellrun::render::{FRAME_PIXELS, render};

#[derive(Parser)]
#[command(version, about = "Side-scrolling chase demo on a modelled tile/sprite video chip")]
struct Args {
    /// Window scale factor (1, 2, 4, 8 or 16)
    #[arg(long, default_value_t = 4)]
    scale: u32,

    /// Run without a window for this many frames, then exit
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u32>,

    /// Write the last composited frame as a PNG on exit
    #[arg(long, value_name = "PATH")]
    screenshot: Option<PathBuf>,
}

const KEYMAP: &[(Key, Button)] = &[
    (Key::Left, Button::LEFT),
    (Key::Right, Button::RIGHT),
    (Key::Up, Button::UP),
    (Key::Down, Button::DOWN),
    (Key::Z, Button::A),
    (Key::X, Button::B),
    (Key::Enter, Button::START),
    (Key::RightShift, Button::SELECT),
    (Key::A, Button::L),
    (Key::S, Button::R),
];

struct WindowClock {
    window: Window,
    frame: Vec<u32>,
}

impl WindowClock {
    fn new(scale: Scale) -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            "shellrun",
            WIDTH as usize,
            HEIGHT as usize,
            WindowOptions {
                scale,
                ..WindowOptions::default()
            },
        )?;
        window.set_target_fps(60);

        Ok(WindowClock {
            window,
            frame: vec![0; FRAME_PIXELS],
        })
    }

    fn pressed_buttons(&self) -> Button {
        KEYMAP
            .iter()
            .filter(|(key, _)| self.window.is_key_down(*key))
            .fold(Button::empty(), |pressed, &(_, button)| pressed | button)
    }
}

impl FrameClock for WindowClock {
    fn wait_for_vblank(&mut self, mmio: &mut Mmio) -> bool {
        render(mmio, &mut self.frame);
        if self
            .window
            .update_with_buffer(&self.frame, WIDTH as usize, HEIGHT as usize)
            .is_err()
        {
            return false;
        }
        if !self.window.is_open() || self.window.is_key_down(Key::Escape) {
            return false;
        }

        input::set_pressed(mmio, self.pressed_buttons());
        mmio.set_vcount(VBLANK_SCANLINE);
        true
    }
}

fn window_scale(factor: u32) -> Result<Scale, String> {
    match factor {
        1 => Ok(Scale::X1),
        2 => Ok(Scale::X2),
        4 => Ok(Scale::X4),
        8 => Ok(Scale::X8),
        16 => Ok(Scale::X16),
        other => Err(format!("unsupported scale factor {other}")),
    }
}

fn save_screenshot(mmio: &Mmio, path: &Path) -> Result<(), image::ImageError> {
    let mut pixels = vec![0u32; FRAME_PIXELS];
    render(mmio, &mut pixels);

    let mut png = image::RgbImage::new(WIDTH as u32, HEIGHT as u32);
    for (i, pixel) in pixels.iter().enumerate() {
        let rgb = [(pixel >> 16) as u8, (pixel >> 8) as u8, *pixel as u8];
        png.put_pixel(i as u32 % WIDTH as u32, i as u32 / WIDTH as u32, image::Rgb(rgb));
    }
    png.save(path)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let assets = GameAssets::demo()?;
    let mut mmio = Mmio::new();

    if let Some(frames) = args.headless {
        let mut clock = FrameBudget::new(frames);
        game::run(&mut mmio, &mut clock, &assets)?;
    } else {
        let mut clock = WindowClock::new(window_scale(args.scale)?)?;
        game::run(&mut mmio, &mut clock, &assets)?;
    }

    if let Some(path) = args.screenshot {
        save_screenshot(&mmio, &path)?;
        log::info!("wrote {}", path.display());
    }

    Ok(())
}
