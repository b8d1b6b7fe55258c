//! Round setup and the per frame game loop of the chase demo.
//!
//! One round: the player koopa walks and jumps over the scrolling ground
//! while the rival marches in from the right edge over and over. The round
//! ends when the rival lands exactly on the player, and the caller starts
//! the next one.

use agb_fixnum::vec2;
use thiserror::Error;

use crate::actor::{Actor, ActorConfig, Number};
use crate::assets::{AssetError, GameAssets};
use crate::display::object::{Size, SpriteError, SpritePool, load_sprite_image};
use crate::display::tiled::{ScrollState, load_background};
use crate::display::{GraphicsSettings, Priority, set_graphics_mode};
use crate::input::{Button, ButtonController, Tri};
use crate::mmio::{FrameClock, Mmio};

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Sprite(#[from] SpriteError),
}

/// Outcome of a single frame of play.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FrameResult {
    Playing,
    /// The rival landed exactly on the player; the round is over.
    Caught,
}

/// Block tiles sit above this index in the demo tile set.
fn solid_block(tile: u16) -> bool {
    tile > 510
}

fn player_config() -> ActorConfig {
    ActorConfig {
        start: vec2(Number::new(100), Number::new(113)),
        gravity: Number::from_raw(90),
        jump_velocity: Number::from_raw(-1500),
        border: 70,
        animation_delay: 6,
        frame_step: 16,
        second_frame: 16,
        size: Size::S16x32,
        priority: Priority::P0,
        solid: solid_block,
        respawn_x: None,
        starts_airborne: true,
    }
}

fn rival_config() -> ActorConfig {
    ActorConfig {
        start: vec2(Number::new(100), Number::new(113)),
        gravity: Number::from_raw(50),
        jump_velocity: Number::from_raw(-1500),
        // just off screen, so the respawn teleport happens out of sight
        border: -10,
        animation_delay: 6,
        frame_step: 16,
        second_frame: 16,
        size: Size::S16x32,
        priority: Priority::P0,
        solid: solid_block,
        respawn_x: Some(200),
        starts_airborne: false,
    }
}

/// One round of play: display configured, assets loaded, both actors live.
pub struct Round<'a> {
    assets: &'a GameAssets,
    pool: SpritePool,
    buttons: ButtonController,
    player: Actor,
    rival: Actor,
    scroll: ScrollState,
    speed: i32,
}

impl<'a> Round<'a> {
    /// Configures the display and builds the round from a clean slate.
    pub fn new(mmio: &mut Mmio, assets: &'a GameAssets) -> Result<Round<'a>, GameError> {
        set_graphics_mode(
            mmio,
            GraphicsSettings::LAYER_BG0
                | GraphicsSettings::LAYER_BG1
                | GraphicsSettings::LAYER_OBJ
                | GraphicsSettings::SPRITE_1D,
        );

        load_background(mmio, &assets.background, &assets.ground, &assets.overlay)?;
        load_sprite_image(mmio, &assets.sprites)?;

        let mut pool = SpritePool::new();
        let mut player = Actor::new(player_config(), &mut pool)?;
        let rival = Actor::new(rival_config(), &mut pool)?;

        // the player sets off facing right
        player.walk_right(&mut pool);

        let scroll = ScrollState::new();
        scroll.commit(mmio);

        Ok(Round {
            assets,
            pool,
            buttons: ButtonController::new(mmio),
            player,
            rival,
            scroll,
            speed: 1,
        })
    }

    /// Advances the game by one frame. Call once per vertical blank; the
    /// scroll registers and the sprite table are committed on the way out.
    pub fn frame(&mut self, mmio: &mut Mmio) -> FrameResult {
        self.buttons.update(mmio);

        match self.buttons.x_tri() {
            Tri::Negative => {
                self.player.walk_left(&mut self.pool);
            }
            Tri::Positive => {
                if self.player.walk_right(&mut self.pool) {
                    // pushing the right border carries the world along
                    // instead of the actor
                    self.scroll.advance(1);
                }
            }
            Tri::Zero => self.player.stop(&mut self.pool),
        }

        let xscroll = self.scroll.x_offset();
        self.player.update(&mut self.pool, &self.assets.ground, xscroll);
        self.rival.update(&mut self.pool, &self.assets.ground, xscroll);

        if self.buttons.is_pressed(Button::UP) {
            self.speed += 1;
            self.player.jump();
        }

        self.rival.walk_left(&mut self.pool);
        self.scroll.advance(self.speed);

        self.scroll.commit(mmio);
        self.pool.commit(mmio);

        if self.player.collides_with(&self.rival) {
            FrameResult::Caught
        } else {
            FrameResult::Playing
        }
    }

    #[must_use]
    pub fn player(&self) -> &Actor {
        &self.player
    }

    #[must_use]
    pub fn rival(&self) -> &Actor {
        &self.rival
    }

    #[must_use]
    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }
}

/// The process entry point's outer loop: play rounds back to back until
/// the frame clock reports shutdown.
pub fn run(
    mmio: &mut Mmio,
    clock: &mut dyn FrameClock,
    assets: &GameAssets,
) -> Result<(), GameError> {
    loop {
        let mut round = Round::new(mmio, assets)?;
        log::info!("round started");

        loop {
            if !clock.wait_for_vblank(mmio) {
                return Ok(());
            }
            if round.frame(mmio) == FrameResult::Caught {
                log::info!("player caught after scroll {}", round.scroll.x_offset());
                break;
            }
        }
    }
}
