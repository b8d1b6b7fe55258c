//! The animated, gravity affected game entities.
//!
//! The original carries two structurally identical entity types with
//! separately copy-pasted update/init/move functions, which had already let
//! their ground checks drift apart. Here there is one [`Actor`]
//! parameterised by an [`ActorConfig`].
//!
//! Positions and velocities are in 1/256 pixel units: [`Num<i32, 8>`].

use agb_fixnum::{Num, Vector2D};

use crate::display::object::{Size, SpriteError, SpriteId, SpritePool};
use crate::display::tiled::{TileMap, tile_lookup};
use crate::display::{Priority, WIDTH};

/// Fixed point number with 256 subunits per pixel.
pub type Number = Num<i32, 8>;

/// Pixel rows are snapped to this raw boundary when landing (one 8 pixel
/// tile), plus one subunit to cover the gap row in the sprite art.
const LANDING_SNAP_MASK: i32 = !0x7ff;

/// Vertical motion state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VerticalState {
    Grounded,
    Falling,
}

/// Horizontal movement intent.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WalkIntent {
    Idle,
    Left,
    Right,
}

/// Per-actor tuning. The two demo actors differ only in these values.
#[derive(Clone, Copy)]
pub struct ActorConfig {
    pub start: Vector2D<Number>,
    /// Downward acceleration per frame, in subunits.
    pub gravity: Number,
    /// Initial (upward, so negative) velocity of a jump.
    pub jump_velocity: Number,
    /// Pixels from the screen edge the actor will not walk past.
    pub border: i32,
    /// Moving frames between walk animation flips.
    pub animation_delay: i32,
    /// Tile offset step between animation frames.
    pub frame_step: u16,
    /// Last frame of the two frame walk cycle.
    pub second_frame: u16,
    pub size: Size,
    pub priority: Priority,
    /// Decides whether a tile index counts as ground to stand on.
    pub solid: fn(u16) -> bool,
    /// Walking off the left border teleports here instead of stopping.
    pub respawn_x: Option<i32>,
    pub starts_airborne: bool,
}

/// A walking, falling, animated entity owning one sprite slot.
pub struct Actor {
    config: ActorConfig,
    sprite: SpriteId,
    position: Vector2D<Number>,
    yvel: Number,
    vertical: VerticalState,
    intent: WalkIntent,
    frame: u16,
    counter: i32,
}

impl Actor {
    pub fn new(config: ActorConfig, pool: &mut SpritePool) -> Result<Actor, SpriteError> {
        let sprite = pool.allocate(
            config.start.x.floor(),
            config.start.y.floor(),
            config.size,
            false,
            false,
            0,
            config.priority,
        )?;

        Ok(Actor {
            config,
            sprite,
            position: config.start,
            yvel: 0.into(),
            vertical: if config.starts_airborne {
                VerticalState::Falling
            } else {
                VerticalState::Grounded
            },
            intent: WalkIntent::Idle,
            frame: 0,
            counter: 0,
        })
    }

    /// Walks one pixel to the left, facing that way.
    ///
    /// At the configured border the actor either teleports to its respawn
    /// column or, without one, stays put and reports the edge hit so the
    /// caller can scroll the world instead.
    pub fn walk_left(&mut self, pool: &mut SpritePool) -> bool {
        pool.set_hflip(self.sprite, true);
        self.intent = WalkIntent::Left;

        let x = self.position.x.floor();
        if let Some(respawn) = self.config.respawn_x {
            if x == self.config.border {
                self.position.x = respawn.into();
            } else {
                self.position.x -= Number::new(1);
            }
            false
        } else if x < self.config.border {
            true
        } else {
            self.position.x -= Number::new(1);
            false
        }
    }

    /// Walks one pixel to the right; reports the edge hit at the border.
    pub fn walk_right(&mut self, pool: &mut SpritePool) -> bool {
        pool.set_hflip(self.sprite, false);
        self.intent = WalkIntent::Right;

        let (width, _) = self.config.size.to_width_height();
        if self.position.x.floor() > WIDTH - width - self.config.border {
            true
        } else {
            self.position.x += Number::new(1);
            false
        }
    }

    /// Clears the walk intent and rewinds the animation to the standing
    /// frame. The counter is left just about to flip so walking again
    /// animates immediately.
    pub fn stop(&mut self, pool: &mut SpritePool) {
        self.intent = WalkIntent::Idle;
        self.frame = 0;
        self.counter = self.config.animation_delay + 1;
        pool.set_tile_offset(self.sprite, self.frame);
    }

    /// Launches a jump unless already airborne, so holding the button
    /// cannot stack velocity mid flight.
    pub fn jump(&mut self) {
        if self.vertical != VerticalState::Falling {
            self.yvel = self.config.jump_velocity;
            self.vertical = VerticalState::Falling;
        }
    }

    /// The per frame physics, ground contact and animation tick.
    pub fn update(&mut self, pool: &mut SpritePool, map: &TileMap, xscroll: i32) {
        if self.vertical == VerticalState::Falling {
            self.position.y += self.yvel;
            self.yvel += self.config.gravity;
        }

        // probe the tile under this actor's own feet
        let (width, height) = self.config.size.to_width_height();
        let tile = tile_lookup(
            self.position.x.floor() + width / 2,
            self.position.y.floor() + height,
            xscroll,
            0,
            map,
        );

        if (self.config.solid)(tile) {
            self.vertical = VerticalState::Grounded;
            self.yvel = 0.into();
            // line up with the top of the tile, one subunit down for the
            // gap row in the sprite art
            self.position.y = Number::from_raw((self.position.y.to_raw() & LANDING_SNAP_MASK) + 1);
        } else {
            self.vertical = VerticalState::Falling;
        }

        if self.intent != WalkIntent::Idle {
            self.counter += 1;
            if self.counter >= self.config.animation_delay {
                self.frame += self.config.frame_step;
                if self.frame > self.config.second_frame {
                    self.frame = 0;
                }
                pool.set_tile_offset(self.sprite, self.frame);
                self.counter = 0;
            }
        }

        pool.set_position(
            self.sprite,
            self.position.x.floor(),
            self.position.y.floor(),
        );
    }

    /// Whether both actors occupy exactly the same spot, compared in the
    /// same fixed point units on both axes.
    #[must_use]
    pub fn collides_with(&self, other: &Actor) -> bool {
        self.position == other.position
    }

    #[must_use]
    pub fn position(&self) -> Vector2D<Number> {
        self.position
    }

    #[must_use]
    pub fn velocity_y(&self) -> Number {
        self.yvel
    }

    #[must_use]
    pub fn is_airborne(&self) -> bool {
        self.vertical == VerticalState::Falling
    }

    #[must_use]
    pub fn animation_frame(&self) -> u16 {
        self.frame
    }

    #[must_use]
    pub fn sprite(&self) -> SpriteId {
        self.sprite
    }
}

#[cfg(test)]
mod tests {
    use agb_fixnum::vec2;

    use super::*;

    fn solid(tile: u16) -> bool {
        tile > 510
    }

    fn test_config() -> ActorConfig {
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
            solid,
            respawn_x: None,
            starts_airborne: true,
        }
    }

    fn sky_map() -> TileMap {
        TileMap::new(4, 4, vec![0; 16]).unwrap()
    }

    fn block_map() -> TileMap {
        TileMap::new(4, 4, vec![600; 16]).unwrap()
    }

    fn actor_on_ground() -> (Actor, SpritePool) {
        let mut pool = SpritePool::new();
        let mut actor = Actor::new(test_config(), &mut pool).unwrap();
        actor.update(&mut pool, &block_map(), 0);
        (actor, pool)
    }

    #[test]
    fn jump_does_not_stack_while_airborne() {
        let (mut actor, _pool) = actor_on_ground();
        assert!(!actor.is_airborne());

        actor.jump();
        let launched = actor.velocity_y();
        assert_eq!(launched, Number::from_raw(-1500));

        actor.jump();
        actor.jump();
        assert_eq!(actor.velocity_y(), launched);
        assert!(actor.is_airborne());
    }

    #[test]
    fn fall_accelerates_then_lands_snapped_to_tile_row() {
        let mut pool = SpritePool::new();
        let mut actor = Actor::new(test_config(), &mut pool).unwrap();
        let sky = sky_map();

        assert!(actor.is_airborne());

        // velocity integrates before position, so y holds for one frame
        // and then strictly increases
        actor.update(&mut pool, &sky, 0);
        assert_eq!(actor.position().y, Number::new(113));
        assert_eq!(actor.velocity_y(), Number::from_raw(90));

        let mut last_y = actor.position().y;
        for _ in 0..10 {
            actor.update(&mut pool, &sky, 0);
            assert!(actor.position().y > last_y);
            last_y = actor.position().y;
        }

        // the ground appears under its feet
        actor.update(&mut pool, &block_map(), 0);
        assert!(!actor.is_airborne());
        assert_eq!(actor.velocity_y(), Number::from_raw(0));
        let raw = actor.position().y.to_raw();
        assert_eq!(raw & 0x7ff, 1);
    }

    #[test]
    fn walk_animation_flips_every_delay_frames() {
        let (mut actor, mut pool) = actor_on_ground();
        let map = block_map();

        actor.walk_right(&mut pool);
        assert_eq!(actor.animation_frame(), 0);

        for _ in 0..5 {
            actor.update(&mut pool, &map, 0);
        }
        assert_eq!(actor.animation_frame(), 0);

        actor.update(&mut pool, &map, 0);
        assert_eq!(actor.animation_frame(), 16);

        for _ in 0..6 {
            actor.update(&mut pool, &map, 0);
        }
        assert_eq!(actor.animation_frame(), 0);
    }

    #[test]
    fn stop_rewinds_animation_and_arms_the_counter() {
        let (mut actor, mut pool) = actor_on_ground();
        let map = block_map();

        actor.walk_right(&mut pool);
        for _ in 0..6 {
            actor.update(&mut pool, &map, 0);
        }
        assert_eq!(actor.animation_frame(), 16);

        actor.stop(&mut pool);
        assert_eq!(actor.animation_frame(), 0);

        // the very next moving update flips straight away
        actor.walk_right(&mut pool);
        actor.update(&mut pool, &map, 0);
        assert_eq!(actor.animation_frame(), 16);
    }

    #[test]
    fn walking_is_one_pixel_per_call_and_respects_borders() {
        let mut pool = SpritePool::new();
        let mut config = test_config();
        config.border = 99;
        let mut actor = Actor::new(config, &mut pool).unwrap();

        assert!(!actor.walk_left(&mut pool));
        assert_eq!(actor.position().x, Number::new(99));
        assert!(!actor.walk_left(&mut pool));
        assert_eq!(actor.position().x, Number::new(98));

        // now past the border: the edge is signalled and nothing moves
        assert!(actor.walk_left(&mut pool));
        assert_eq!(actor.position().x, Number::new(98));

        // right border sits at screen width minus sprite and border
        let mut actor = Actor::new(test_config(), &mut pool).unwrap();
        for _ in 0..55 {
            assert!(!actor.walk_right(&mut pool));
        }
        assert_eq!(actor.position().x, Number::new(WIDTH - 16 - 70 + 1));
        assert!(actor.walk_right(&mut pool));
        assert_eq!(actor.position().x, Number::new(WIDTH - 16 - 70 + 1));
    }

    #[test]
    fn respawning_walker_wraps_at_its_border() {
        let mut pool = SpritePool::new();
        let mut config = test_config();
        config.start = vec2(Number::new(101), Number::new(113));
        config.border = 100;
        config.respawn_x = Some(200);
        let mut actor = Actor::new(config, &mut pool).unwrap();

        assert!(!actor.walk_left(&mut pool));
        assert_eq!(actor.position().x, Number::new(100));

        assert!(!actor.walk_left(&mut pool));
        assert_eq!(actor.position().x, Number::new(200));
    }

    #[test]
    fn collision_is_exact_equality_in_matching_units() {
        let mut pool = SpritePool::new();
        let a = Actor::new(test_config(), &mut pool).unwrap();
        let b = Actor::new(test_config(), &mut pool).unwrap();
        assert!(a.collides_with(&b));

        let mut c = Actor::new(test_config(), &mut pool).unwrap();
        c.position.x += Number::from_raw(1);
        assert!(!a.collides_with(&c));
    }
}
