//! Whole-round scenarios through the public API.

use shellrun::actor::{Actor, ActorConfig, Number};
use shellrun::assets::GameAssets;
use shellrun::display::Priority;
use shellrun::display::object::{Size, SpritePool};
use shellrun::display::tiled::TileMap;
use shellrun::fixnum::vec2;
use shellrun::game::{self, FrameResult, Round};
use shellrun::mmio::{FrameBudget, Mmio};
use shellrun::render::{FRAME_PIXELS, render};

fn scenario_config() -> ActorConfig {
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
        solid: |tile| tile > 510,
        respawn_x: None,
        starts_airborne: true,
    }
}

#[test]
fn fall_until_the_ground_appears_then_land_aligned() {
    let mut pool = SpritePool::new();
    let mut actor = Actor::new(scenario_config(), &mut pool).unwrap();

    let open_air = TileMap::new(8, 8, vec![0; 64]).unwrap();
    let solid_ground = TileMap::new(8, 8, vec![600; 64]).unwrap();

    // accelerating fall while the probe keeps reporting a non-solid tile
    let mut previous = actor.position().y;
    for step in 0..12 {
        actor.update(&mut pool, &open_air, 0);
        assert!(actor.is_airborne());
        if step > 0 {
            assert!(actor.position().y > previous);
        }
        previous = actor.position().y;
    }

    // the update where the probed tile turns solid lands the actor
    actor.update(&mut pool, &solid_ground, 0);
    assert!(!actor.is_airborne());
    assert_eq!(actor.velocity_y(), Number::from_raw(0));
    assert_eq!(actor.position().y.to_raw() & 0x7ff, 1);
}

#[test]
fn rounds_restart_until_the_clock_runs_out() {
    let assets = GameAssets::demo().unwrap();
    let mut mmio = Mmio::new();

    // enough frames for the rival to catch an idle player at least once,
    // forcing a full round restart inside run()
    let mut clock = FrameBudget::new(600);
    game::run(&mut mmio, &mut clock, &assets).unwrap();

    // the committed sprite table still carries both live actors
    assert_ne!(mmio.oam_word(0), 0);
    assert_ne!(mmio.oam_word(4), 0);
}

#[test]
fn a_played_frame_produces_a_visible_scene() {
    let assets = GameAssets::demo().unwrap();
    let mut mmio = Mmio::new();
    let mut round = Round::new(&mut mmio, &assets).unwrap();

    for _ in 0..5 {
        assert_eq!(round.frame(&mut mmio), FrameResult::Playing);
    }

    let mut frame = vec![0u32; FRAME_PIXELS];
    render(&mmio, &mut frame);

    // sky, ground and sprite pixels are all distinct
    let distinct = {
        let mut colours = frame.clone();
        colours.sort_unstable();
        colours.dedup();
        colours.len()
    };
    assert!(distinct > 4, "expected a composed scene, got {distinct} colours");
}
