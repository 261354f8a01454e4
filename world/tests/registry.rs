use std::{cell::RefCell, rc::Rc, time::Duration};

use glam::Vec2;
use moon_patrol_core::{
    Canvas, DrawList, EntityId, EntityKind, Hitbox, SimulationError, ENTITY_CAP,
};
use moon_patrol_system_timing::{ManualClock, TimerOwner, Timers};
use moon_patrol_world::{
    query, Body, Collidable, CollisionPeer, Entity, Frame, FrameContext, Movable, Registry,
    TickReport,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

type Log = Rc<RefCell<Vec<String>>>;

#[derive(Clone, Copy, Debug, PartialEq)]
enum OnHit {
    Record,
    DestroyPeer,
    RaiseGameOver,
}

#[derive(Debug)]
struct Recorder {
    name: &'static str,
    kind: EntityKind,
    body: Body,
    hitbox: Option<Hitbox>,
    movable: bool,
    on_hit: OnHit,
    log: Log,
}

impl Recorder {
    fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            kind: EntityKind::Rock,
            body: Body::new(Vec2::ZERO, 1.0),
            hitbox: None,
            movable: false,
            on_hit: OnHit::Record,
            log: Rc::clone(log),
        }
    }

    fn at(mut self, x: f32, y: f32) -> Self {
        self.body.position = Vec2::new(x, y);
        self
    }

    fn collidable(mut self, width: f32, height: f32) -> Self {
        self.hitbox = Some(Hitbox::new(0.0, 0.0, width, height));
        self
    }

    fn movable(mut self) -> Self {
        self.movable = true;
        self
    }

    fn reacting(mut self, on_hit: OnHit) -> Self {
        self.on_hit = on_hit;
        self
    }

    fn boxed(self) -> Box<dyn Entity> {
        Box::new(self)
    }

    fn record(&self, event: &str) {
        self.log.borrow_mut().push(format!("{}:{event}", self.name));
    }
}

impl Entity for Recorder {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update_status(&mut self, _ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        self.record("status");
        Ok(())
    }

    fn draw(&self, _canvas: &mut dyn Canvas) {
        self.record("draw");
    }

    fn as_movable_mut(&mut self) -> Option<&mut dyn Movable> {
        if self.movable {
            Some(self)
        } else {
            None
        }
    }

    fn as_collidable(&self) -> Option<&dyn Collidable> {
        self.hitbox.map(|_| self as &dyn Collidable)
    }

    fn as_collidable_mut(&mut self) -> Option<&mut dyn Collidable> {
        if self.hitbox.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl Movable for Recorder {
    fn update_position(&mut self, _ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        self.body.position.x += self.body.speed;
        self.record("position");
        Ok(())
    }
}

impl Collidable for Recorder {
    fn hitbox(&self) -> Hitbox {
        self.hitbox.unwrap_or(Hitbox::new(0.0, 0.0, 0.0, 0.0))
    }

    fn on_collision(
        &mut self,
        other: &CollisionPeer,
        ctx: &mut FrameContext<'_, '_>,
    ) -> Result<(), SimulationError> {
        self.record(&format!("hit#{}", other.id.get()));
        match self.on_hit {
            OnHit::Record => {}
            OnHit::DestroyPeer => ctx.destroy(other.id),
            OnHit::RaiseGameOver => ctx.raise_game_over(),
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Breeder {
    body: Body,
    spawned: Option<EntityId>,
    log: Log,
}

impl Entity for Breeder {
    fn kind(&self) -> EntityKind {
        EntityKind::Ufo
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update_status(&mut self, ctx: &mut FrameContext<'_, '_>) -> Result<(), SimulationError> {
        let child = match self.spawned {
            Some(id) => id,
            None => {
                let id = ctx.spawn(Recorder::new("child", &self.log).boxed());
                self.spawned = Some(id);
                id
            }
        };
        if ctx.is_live(child) {
            self.log.borrow_mut().push("breeder:sees-child".to_owned());
        }
        let owner = ctx.owner();
        ctx.timers()
            .activate_timer(owner, "breed", Duration::from_secs(10));
        Ok(())
    }

    fn draw(&self, _canvas: &mut dyn Canvas) {}
}

struct Harness {
    clock: ManualClock,
    timers: Timers,
    rng: ChaCha8Rng,
}

impl Harness {
    fn new() -> Self {
        let clock = ManualClock::new();
        Self {
            timers: Timers::new(Box::new(clock.clone())),
            clock,
            rng: ChaCha8Rng::seed_from_u64(1),
        }
    }

    fn tick(&mut self, registry: &mut Registry) -> Result<TickReport, SimulationError> {
        let mut frame = Frame {
            timers: &mut self.timers,
            rng: &mut self.rng,
            input: &[],
            announcement: None,
        };
        let mut canvas = DrawList::new();
        let report = registry.tick(&mut frame, &mut canvas);
        self.clock.advance(Duration::from_millis(16));
        report
    }
}

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

#[test]
fn additions_become_live_only_on_the_next_tick() {
    let log = new_log();
    let mut harness = Harness::new();
    let mut registry = Registry::new(ENTITY_CAP);

    let id = registry.add(Recorder::new("a", &log).boxed());
    assert!(registry.is_empty());
    assert!(!registry.contains(id));
    assert_eq!(registry.pending(), 1);

    let report = harness.tick(&mut registry).expect("tick");
    assert_eq!(report.live, 1);
    assert!(registry.contains(id));
    assert_eq!(registry.pending(), 0);
    assert_eq!(take(&log), vec!["a:status", "a:draw"]);
}

#[test]
fn buffered_adds_and_removes_apply_exactly_once() {
    let log = new_log();
    let mut harness = Harness::new();
    let mut registry = Registry::new(ENTITY_CAP);

    let first = registry.add(Recorder::new("first", &log).boxed());
    let second = registry.add(Recorder::new("second", &log).boxed());
    let _ = harness.tick(&mut registry).expect("tick");

    registry.remove(first);
    let third = registry.add(Recorder::new("third", &log).boxed());
    registry.remove(third);
    registry.remove(first);
    let fourth = registry.add(Recorder::new("fourth", &log).boxed());
    let _ = take(&log);

    let report = harness.tick(&mut registry).expect("tick");
    assert_eq!(report.live, 2);
    assert_eq!(query::ids(&registry), vec![second, fourth]);
    assert_eq!(
        take(&log),
        vec!["second:status", "second:draw", "fourth:status", "fourth:draw"]
    );
}

#[test]
fn removing_an_unknown_id_is_a_no_op() {
    let mut harness = Harness::new();
    let mut registry = Registry::new(ENTITY_CAP);
    registry.remove(EntityId::new(42));
    assert_eq!(registry.pending(), 0);
    let report = harness.tick(&mut registry).expect("tick");
    assert_eq!(report.live, 0);
}

#[test]
fn hooks_run_in_registration_order_before_collisions() {
    let log = new_log();
    let mut harness = Harness::new();
    let mut registry = Registry::new(ENTITY_CAP);
    let _ = registry.add(
        Recorder::new("a", &log)
            .movable()
            .collidable(10.0, 10.0)
            .boxed(),
    );
    let _ = registry.add(Recorder::new("b", &log).at(5.0, 0.0).collidable(10.0, 10.0).boxed());

    let _ = harness.tick(&mut registry).expect("tick");
    assert_eq!(
        take(&log),
        vec![
            "a:status",
            "a:position",
            "a:draw",
            "b:status",
            "b:draw",
            "a:hit#1",
            "b:hit#0",
        ]
    );
}

#[test]
fn overlapping_pairs_are_notified_once_each() {
    let log = new_log();
    let mut harness = Harness::new();
    let mut registry = Registry::new(ENTITY_CAP);
    let _ = registry.add(Recorder::new("a", &log).collidable(10.0, 10.0).boxed());
    let _ = registry.add(Recorder::new("b", &log).at(4.0, 4.0).collidable(10.0, 10.0).boxed());
    let _ = registry.add(Recorder::new("c", &log).at(8.0, 8.0).collidable(10.0, 10.0).boxed());
    let _ = registry.add(Recorder::new("far", &log).at(500.0, 500.0).collidable(10.0, 10.0).boxed());
    let _ = registry.add(Recorder::new("ghost", &log).at(4.0, 4.0).boxed());

    let report = harness.tick(&mut registry).expect("tick");
    assert_eq!(report.collisions, 3);

    let hits: Vec<String> = take(&log)
        .into_iter()
        .filter(|entry| entry.contains(":hit"))
        .collect();
    assert_eq!(hits.len(), 6);
    for (name, others) in [("a", ["1", "2"]), ("b", ["0", "2"]), ("c", ["0", "1"])] {
        for other in others {
            let expected = format!("{name}:hit#{other}");
            assert_eq!(
                hits.iter().filter(|hit| **hit == expected).count(),
                1,
                "{expected} must be reported exactly once"
            );
        }
    }
    assert!(!hits.iter().any(|hit| hit.starts_with("far") || hit.starts_with("ghost")));
}

#[test]
fn touching_hitboxes_do_not_collide() {
    let log = new_log();
    let mut harness = Harness::new();
    let mut registry = Registry::new(ENTITY_CAP);
    let _ = registry.add(Recorder::new("a", &log).collidable(10.0, 10.0).boxed());
    let _ = registry.add(Recorder::new("b", &log).at(10.0, 0.0).collidable(10.0, 10.0).boxed());

    let report = harness.tick(&mut registry).expect("tick");
    assert_eq!(report.collisions, 0);
}

#[test]
fn destruction_inside_a_reaction_is_deferred_to_the_next_tick() {
    let log = new_log();
    let mut harness = Harness::new();
    let mut registry = Registry::new(ENTITY_CAP);
    let _ = registry.add(
        Recorder::new("hunter", &log)
            .collidable(10.0, 10.0)
            .reacting(OnHit::DestroyPeer)
            .boxed(),
    );
    let prey = registry.add(Recorder::new("prey", &log).at(2.0, 2.0).collidable(10.0, 10.0).boxed());

    let report = harness.tick(&mut registry).expect("tick");
    assert_eq!(report.collisions, 1);
    assert!(take(&log).contains(&"prey:hit#0".to_owned()));
    assert!(registry.contains(prey), "still live until the next tick");

    let report = harness.tick(&mut registry).expect("tick");
    assert_eq!(report.live, 1);
    assert!(!registry.contains(prey));
    assert!(!take(&log).iter().any(|entry| entry.starts_with("prey")));
}

#[test]
fn spawns_requested_by_hooks_join_on_the_next_tick() {
    let log = new_log();
    let mut harness = Harness::new();
    let mut registry = Registry::new(ENTITY_CAP);
    let breeder = registry.add(Box::new(Breeder {
        body: Body::new(Vec2::ZERO, 0.0),
        spawned: None,
        log: Rc::clone(&log),
    }));

    let report = harness.tick(&mut registry).expect("tick");
    assert_eq!(report.live, 1);
    assert_eq!(
        take(&log),
        vec!["breeder:sees-child"],
        "child is not dispatched in its spawn frame"
    );

    let report = harness.tick(&mut registry).expect("tick");
    assert_eq!(report.live, 2);
    assert_eq!(
        take(&log),
        vec!["breeder:sees-child", "child:status", "child:draw"]
    );
    assert_eq!(query::count_of(&registry, EntityKind::Rock), 1);

    registry.remove(breeder);
    let _ = harness.tick(&mut registry).expect("tick");
    assert!(!harness.timers.timer_is_active(TimerOwner::Entity(breeder), "breed"));
    assert_eq!(harness.timers.pending(), 0, "timers of removed entities are dropped");
}

#[test]
fn exceeding_the_cap_is_fatal() {
    let log = new_log();
    let mut harness = Harness::new();
    let mut registry = Registry::new(ENTITY_CAP);
    for _ in 0..ENTITY_CAP {
        let _ = registry.add(Recorder::new("filler", &log).boxed());
    }
    let report = harness.tick(&mut registry).expect("cap is inclusive");
    assert_eq!(report.live, ENTITY_CAP);

    let _ = registry.add(Recorder::new("straw", &log).boxed());
    let error = harness.tick(&mut registry).expect_err("one past the cap");
    assert_eq!(
        error,
        SimulationError::TooManyEntities {
            count: ENTITY_CAP + 1,
            cap: ENTITY_CAP,
        }
    );
}

#[test]
fn world_scrolling_skips_movable_entities() {
    let log = new_log();
    let mut harness = Harness::new();
    let mut registry = Registry::new(ENTITY_CAP);
    let fixed = registry.add(Recorder::new("fixed", &log).at(100.0, 50.0).boxed());
    let mover = registry.add(Recorder::new("mover", &log).at(100.0, 50.0).movable().boxed());
    let _ = harness.tick(&mut registry).expect("tick");

    registry.move_world(Vec2::new(-2.0, 0.0));
    let fixed_body = registry.get(fixed).map(|entity| *entity.body());
    let mover_body = registry.get(mover).map(|entity| *entity.body());
    assert_eq!(fixed_body.map(|body| body.position), Some(Vec2::new(98.0, 50.0)));
    assert_eq!(mover_body.map(|body| body.position), Some(Vec2::new(101.0, 50.0)));
}

#[test]
fn teardown_keeps_listed_entities() {
    let log = new_log();
    let mut harness = Harness::new();
    let mut registry = Registry::new(ENTITY_CAP);
    let keeper = registry.add(Recorder::new("keeper", &log).boxed());
    let _ = registry.add(Recorder::new("doomed", &log).boxed());
    let _ = harness.tick(&mut registry).expect("tick");
    let _ = registry.add(Recorder::new("pending", &log).boxed());

    registry.destroy_all_except(&[keeper]);
    let report = harness.tick(&mut registry).expect("tick");
    assert_eq!(report.live, 1);
    assert_eq!(query::ids(&registry), vec![keeper]);
}

#[test]
fn game_over_is_reported_by_the_raising_tick() {
    let log = new_log();
    let mut harness = Harness::new();
    let mut registry = Registry::new(ENTITY_CAP);
    let _ = registry.add(
        Recorder::new("victim", &log)
            .collidable(10.0, 10.0)
            .reacting(OnHit::RaiseGameOver)
            .boxed(),
    );
    let bomb = registry.add(Recorder::new("bomb", &log).collidable(10.0, 10.0).boxed());

    let report = harness.tick(&mut registry).expect("tick");
    assert!(report.game_over_raised);

    registry.remove(bomb);
    let report = harness.tick(&mut registry).expect("tick");
    assert!(!report.game_over_raised);
}

#[test]
fn snapshots_expose_placed_hitboxes() {
    let log = new_log();
    let mut harness = Harness::new();
    let mut registry = Registry::new(ENTITY_CAP);
    let _ = registry.add(Recorder::new("box", &log).at(3.0, 4.0).collidable(5.0, 6.0).boxed());
    let _ = registry.add(Recorder::new("plain", &log).boxed());
    let _ = harness.tick(&mut registry).expect("tick");

    let snapshots = query::snapshots(&registry);
    assert_eq!(snapshots.len(), 2);
    assert_eq!(
        snapshots[0].hitbox,
        Some(moon_patrol_core::Rect::new(3.0, 4.0, 5.0, 6.0))
    );
    assert_eq!(snapshots[1].hitbox, None);
}
