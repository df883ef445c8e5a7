use std::{
    cell::Cell,
    collections::VecDeque,
    rc::Rc,
};

use embassy_futures::block_on;
use embassy_time::{
    Duration,
    Instant,
};
use palette::Srgb;
use rand::{
    SeedableRng,
    rngs::SmallRng,
};
use strip_invaders::{
    Clock,
    Game,
    GameState,
    HostLoop,
    OpenGate,
    PixelStrip,
    Request,
    Response,
    Router,
    Transport,
    Tuning,
    config::TRACK_LEN,
    render::{
        BULLET_COLOR,
        OFF,
        PLAYER_COLOR,
    },
};

#[derive(Clone, Default)]
struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.0.get())
    }
}

#[derive(Default)]
struct Scripted {
    pending: VecDeque<Request>,
    replies: Vec<Response>,
}

impl Scripted {
    fn with(paths: &[&str]) -> Self {
        Self {
            pending: paths.iter().map(|p| Request::get(*p)).collect(),
            replies: Vec::new(),
        }
    }
}

impl Transport for Scripted {
    fn poll(&mut self) -> Option<Request> {
        self.pending.pop_front()
    }

    fn reply(&mut self, response: Response) {
        self.replies.push(response);
    }
}

struct Recorder {
    frame: Vec<Srgb<u8>>,
    shows: usize,
}

impl Recorder {
    fn new() -> Self {
        Self {
            frame: vec![OFF; TRACK_LEN],
            shows: 0,
        }
    }
}

impl PixelStrip for Recorder {
    fn len(&self) -> usize {
        self.frame.len()
    }

    fn clear(&mut self) {
        self.frame.fill(OFF);
    }

    fn set(&mut self, index: usize, color: Srgb<u8>) {
        self.frame[index] = color;
    }

    async fn show(&mut self) {
        self.shows += 1;
    }
}

type Host = HostLoop<SmallRng, OpenGate, Recorder, Scripted, ManualClock>;

fn host(transport: Option<Scripted>, tuning: Tuning) -> (Host, ManualClock) {
    let clock = ManualClock::default();
    let game = Game::new(SmallRng::seed_from_u64(21), tuning, clock.now());
    let host = HostLoop::new(
        game,
        Router::new(OpenGate),
        Recorder::new(),
        transport,
        clock.clone(),
    );
    (host, clock)
}

#[test]
fn new_host_starts_a_session() {
    let (host, _) = host(None, Tuning::default().without_spawns());

    assert!(host.is_offline());
    assert_eq!(host.game().state(), GameState::Playing);
    assert_eq!(host.game().enemies().len(), 8);
}

#[test]
fn offline_host_keeps_simulating() {
    let tuning = Tuning {
        enemy_step: Duration::from_millis(10),
        ..Tuning::default().without_spawns()
    };
    let (mut host, clock) = host(None, tuning);

    assert!(block_on(host.step()));
    let front = host.game().enemies().iter().map(|e| e.position).min();

    clock.advance(10);
    assert!(block_on(host.step()));

    let moved = host.game().enemies().iter().map(|e| e.position).min();
    assert_eq!(moved, front.map(|p| p - 1));
}

#[test]
fn one_request_per_step() {
    let transport = Scripted::with(&["/shoot", "/shoot", "/state"]);
    let (mut host, _) = host(Some(transport), Tuning::default().without_spawns());

    block_on(host.step());
    assert_eq!(host.game().bullets().active_count(), 1);
    assert_eq!(host.transport().map(|t| t.replies.len()), Some(1));

    block_on(host.step());
    assert_eq!(host.game().bullets().active_count(), 2);

    block_on(host.step());
    let replies = host.transport().map(|t| t.replies.as_slice()).unwrap_or_default();
    assert_eq!(replies.len(), 3);
    assert_eq!(
        replies[2].body,
        r#"{"score":0,"lives":3,"enemies":8,"bullets":2,"gameState":1}"#
    );

    block_on(host.step());
    assert_eq!(host.transport().map(|t| t.replies.len()), Some(3));
}

#[test]
fn frames_are_pushed_only_when_something_changed() {
    let (mut host, clock) = host(Some(Scripted::default()), Tuning::default().without_spawns());

    assert!(block_on(host.step()));
    assert_eq!(host.strip().shows, 1);
    assert_eq!(host.strip().frame[0], PLAYER_COLOR);

    // Nothing due yet.
    assert!(!block_on(host.step()));
    assert!(!block_on(host.step()));
    assert_eq!(host.strip().shows, 1);

    // Projectile steps alone redraw nothing when no projectile is live.
    clock.advance(1);
    assert!(!block_on(host.step()));
    assert_eq!(host.strip().shows, 1);
}

#[test]
fn shoot_request_shows_up_on_the_strip() {
    let (mut host, clock) = host(
        Some(Scripted::with(&["/shoot"])),
        Tuning::default().without_spawns(),
    );

    assert!(block_on(host.step()));
    assert_eq!(host.strip().frame[1], BULLET_COLOR);

    clock.advance(1);
    assert!(block_on(host.step()));
    assert_eq!(host.strip().frame[1], OFF);
    assert_eq!(host.strip().frame[2], BULLET_COLOR);
}
