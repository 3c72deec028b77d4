//! BeachBump entry point
//!
//! A headless, scripted rendition of the game: move along the beach without
//! hitting the crabs that pop up. The beachball steers itself left and
//! right, jumps on a timer, skids off dunes, and bumps crabs back into the
//! sea. Everything observable arrives through the log.
//!
//! Pass a JSON settings document as the first argument to override the
//! defaults (see [`DemoSettings`]).

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use beachbump::ShapeKind;
use beachbump::collision::{Aabb, QuadTree};
use beachbump::consts::DEFAULT_MAX_CHILDREN;
use beachbump::events::{SceneEvent, SceneEventKind, TrajectoryEvent, TrajectoryEventKind};
use beachbump::scene::Scene;
use beachbump::scene::object::{ObjectSettings, ShapeSettings};
use beachbump::settings::{CollisionSettings, DemoSettings};
use beachbump::trajectory::{Trajectory, TrajectorySettings};

const BALL: &str = "beachball";
const BALL_SIZE: f32 = 20.0;
const DUNE_SIZE: Vec2 = Vec2::new(32.0, 24.0);
const CRAB_SIZE: f32 = 24.0;

fn main() {
    env_logger::init();
    let settings = load_settings();
    log::info!(
        "beachbump starting: {}x{} beach, seed {}",
        settings.beach_width,
        settings.beach_height,
        settings.seed
    );

    let mut rng = Pcg32::seed_from_u64(settings.seed);
    let mut scene = Scene::new();
    scene
        .load_collisions(CollisionSettings {
            width: settings.beach_width,
            height: settings.beach_height,
            max_depth: 8,
            ..Default::default()
        })
        .expect("collision world");

    make_beachball(&mut scene, &settings);
    make_beachball_motion(&mut scene, &settings);
    make_jump(&mut scene, &settings);
    make_dunes(&mut scene, &settings, &mut rng);
    make_crab_spawner(&mut scene, &settings, rng);
    let collisions = make_collisions(&mut scene, &settings);

    // the demo stops itself after a fixed stretch of simulated time
    let run_seconds = settings.run_seconds;
    let mut sim_time = 0.0f32;
    scene.schedule_after(move |scene, dt| {
        sim_time += dt;
        if sim_time >= run_seconds {
            scene.stop();
        }
    });

    scene.start(settings.game_delay).expect("tick interval");
    scene.run();

    log::info!(
        "demo finished after {}s: {} collisions observed",
        settings.run_seconds,
        collisions.get()
    );
}

fn load_settings() -> DemoSettings {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path).unwrap_or_else(|err| {
                log::error!("cannot read settings {path:?}: {err}");
                std::process::exit(1);
            });
            serde_json::from_str(&text).unwrap_or_else(|err| {
                log::error!("bad settings document {path:?}: {err}");
                std::process::exit(1);
            })
        }
        None => DemoSettings::default(),
    }
}

/// The player: a circle clamped to the beach, starting dead center.
fn make_beachball(scene: &mut Scene, settings: &DemoSettings) {
    let beach_width = settings.beach_width;
    let ball = scene.add(
        BALL,
        ObjectSettings {
            x: Some((settings.beach_width - BALL_SIZE) / 2.0),
            y: Some((settings.beach_height - BALL_SIZE) / 2.0),
            width: BALL_SIZE,
            height: BALL_SIZE,
            ..Default::default()
        },
    );
    ball.set_shape(ShapeSettings {
        kind: ShapeKind::Circle,
        ..Default::default()
    });
    ball.set_map(move |pos| Vec2::new(pos.x.clamp(0.0, beach_width - BALL_SIZE), pos.y));
}

/// Scripted steering: swap direction every couple of seconds, standing in
/// for the arrow keys.
fn make_beachball_motion(scene: &mut Scene, settings: &DemoSettings) {
    let speed = settings.left_right_speed.abs();
    let mut elapsed = 0.0f32;
    scene.schedule_before(move |scene, dt| {
        elapsed += dt;
        let heading = if (elapsed / 2.0) as u32 % 2 == 0 {
            speed
        } else {
            -speed
        };
        if let Some(ball) = scene.get_mut(BALL) {
            let dy = ball.velocity().y;
            ball.set_velocity(heading, dy);
        }
    });
}

/// Ballistic jump on a timer. The trajectory's altitude is mapped onto the
/// ball's y axis as incremental steps; landing rearms the trajectory for
/// the next arc.
fn make_jump(scene: &mut Scene, settings: &DemoSettings) {
    let jumping = Rc::new(Cell::new(false));

    let mut arc = Trajectory::new(TrajectorySettings {
        v: settings.jump_velocity,
        a: -settings.jump_gravity,
        return_to_start: true,
        ..Default::default()
    });
    let landed = jumping.clone();
    arc.on(&[TrajectoryEventKind::ReturnedToStart], move |arc, event| {
        if let TrajectoryEvent::ReturnedToStart { position, .. } = event {
            log::debug!("jump landed at altitude {position}");
        }
        arc.reset();
        landed.set(false);
    });

    let in_air = jumping.clone();
    let mut altitude = 0.0f32;
    scene
        .get_mut(BALL)
        .expect("beachball registered")
        .add_motion("jump", move |dt, _| {
            if !in_air.get() {
                return None;
            }
            let sample = arc.calc(dt);
            let step = sample.position - altitude;
            altitude = sample.position;
            // screen y grows downward
            Some(Vec2::new(0.0, -step))
        });

    let trigger = jumping;
    let jump_delay = settings.jump_delay;
    let mut since_jump = 0.0f32;
    scene.schedule_before(move |_, dt| {
        since_jump += dt;
        if since_jump >= jump_delay && !trigger.get() {
            since_jump = 0.0;
            trigger.set(true);
            log::info!("jump!");
        }
    });
}

/// Scatter dunes with a minimum-distance rule so the ball can't get
/// trapped, rejection-sampling over a placement quadtree. Dunes scroll down
/// the beach and wrap around.
fn make_dunes(scene: &mut Scene, settings: &DemoSettings, rng: &mut Pcg32) {
    let (beach_width, beach_height) = (settings.beach_width, settings.beach_height);
    let min_distance = BALL_SIZE * 2.0;
    let world = Aabb::new(Vec2::ZERO, Vec2::new(beach_width, beach_height));
    let mut placed: QuadTree<usize> = QuadTree::new(world, 8, DEFAULT_MAX_CHILDREN);
    let mut centers: Vec<Vec2> = Vec::new();

    let mut attempts = 0;
    while centers.len() < settings.total_dunes && attempts < 100 * settings.total_dunes {
        attempts += 1;
        let candidate = Vec2::new(
            rng.random_range(0.0..beach_width),
            rng.random_range(0.0..beach_height),
        );
        let query = Aabb::from_center_size(candidate, Vec2::splat(min_distance * 2.0));
        let too_close = placed
            .retrieve(query)
            .iter()
            .any(|&i| centers[i].distance_squared(candidate) < min_distance * min_distance);
        if too_close {
            continue;
        }

        let index = centers.len();
        let dune = scene.add(
            format!("dune{index}"),
            ObjectSettings {
                x: Some(candidate.x - DUNE_SIZE.x / 2.0),
                y: Some(candidate.y - DUNE_SIZE.y / 2.0),
                dy: settings.beach_dy,
                width: DUNE_SIZE.x,
                height: DUNE_SIZE.y,
                ..Default::default()
            },
        );
        dune.set_shape(ShapeSettings::default());
        dune.set_map(move |pos| {
            Vec2::new(pos.x.rem_euclid(beach_width), pos.y.rem_euclid(beach_height))
        });

        placed.insert_one(Aabb::from_center_size(candidate, DUNE_SIZE), index);
        centers.push(candidate);
    }
    if centers.len() < settings.total_dunes {
        log::warn!(
            "placed only {} of {} dunes",
            centers.len(),
            settings.total_dunes
        );
    }
}

/// Spawn crabs at the bottom edge on a timer; they scuttle up the beach and
/// despawn past the top. The hitbox is slightly smaller than the crab.
fn make_crab_spawner(scene: &mut Scene, settings: &DemoSettings, mut rng: Pcg32) {
    let (beach_width, beach_height) = (settings.beach_width, settings.beach_height);
    let (min_dy, max_dy) = (settings.crab_min_dy, settings.crab_max_dy);
    let (max_crabs, spawn_delay) = (settings.max_crabs, settings.crab_spawn_delay);

    let mut spawn_timer = 0.0f32;
    let mut hatched = 0usize;
    scene.schedule_before(move |scene, dt| {
        spawn_timer += dt;
        if spawn_timer < spawn_delay {
            return;
        }
        spawn_timer = 0.0;

        let live = scene
            .names()
            .iter()
            .filter(|name| name.starts_with("crab"))
            .count();
        if live >= max_crabs {
            return;
        }

        let name = format!("crab{hatched}");
        hatched += 1;
        let crab = scene.add(
            &name,
            ObjectSettings {
                x: Some(rng.random_range(0.0..beach_width - CRAB_SIZE)),
                y: Some(beach_height),
                dy: -rng.random_range(min_dy..max_dy),
                width: CRAB_SIZE,
                height: CRAB_SIZE,
                ..Default::default()
            },
        );
        crab.set_shape(ShapeSettings {
            kind: ShapeKind::Rectangle,
            width: Some(CRAB_SIZE * 0.9),
            height: Some(CRAB_SIZE * 0.9),
        });
        crab.set_map(move |pos| Vec2::new(pos.x.rem_euclid(beach_width), pos.y));
        log::info!("spawned {name}");
    });

    // crabs that scuttle off the top of the beach are removed
    scene.schedule_after(|scene, _| {
        for name in scene.names() {
            if !name.starts_with("crab") {
                continue;
            }
            let off_beach = scene
                .get(&name)
                .is_some_and(|crab| crab.position().y <= 0.0);
            if off_beach {
                log::info!("{name} scuttled off the beach");
                scene.remove(&name);
            }
        }
    });
}

/// Collision responses: skid sideways off dunes, bump crabs away. Returns
/// the running collision count for the end-of-run summary.
fn make_collisions(scene: &mut Scene, settings: &DemoSettings) -> Rc<Cell<u32>> {
    let observed = Rc::new(Cell::new(0u32));
    let counter = observed.clone();
    let skid = settings.dune_skid_speed;
    let max_skid = settings.max_dune_skid_speed;

    scene.on(&[SceneEventKind::Collision], move |scene, event| {
        let SceneEvent::Collision { a, b } = event else {
            return;
        };
        counter.set(counter.get() + 1);
        log::info!("collision: {a} <-> {b}");

        let other = if a == BALL {
            b
        } else if b == BALL {
            a
        } else {
            return;
        };

        if other.starts_with("dune") {
            // skid off the dune, away from the side that was hit
            let Some(dune_x) = scene.get(other).map(|dune| dune.position().x) else {
                return;
            };
            let Some(ball) = scene.get_mut(BALL) else {
                return;
            };
            let push = if dune_x < ball.position().x { skid } else { -skid };
            let vel = ball.velocity();
            ball.set_velocity((vel.x + push).clamp(-max_skid, max_skid), vel.y);
        } else if other.starts_with("crab") {
            // bumped a crab off the beach
            scene.remove(other);
        }
    });

    observed
}
