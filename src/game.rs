//! The game session and its fixed-tick simulation.
//!
//! A [`Game`] owns the entity arenas, score, lives and the dirty flag. The
//! host loop calls [`Game::tick`] as often as it can; the enemy and projectile
//! phases decide on their own whether enough time has passed to do any work.

use embassy_time::Instant;
use rand::{
    Rng,
    RngCore,
};

use crate::{
    config::{
        PLAYER_POSITION,
        SCORE_PER_KILL,
        STARTING_LIVES,
        Tuning,
        WAVE_START,
    },
    entities::{
        BulletStore,
        Enemy,
        EnemyColor,
        EnemyStore,
        on_track,
    },
    timer::IntervalTimer,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GameState {
    Ready,
    Playing,
    GameOver,
}

impl GameState {
    /// Numeric code used on the wire.
    pub const fn code(self) -> u8 {
        match self {
            Self::Ready => 0,
            Self::Playing => 1,
            Self::GameOver => 2,
        }
    }
}

/// One game session.
pub struct Game<R> {
    enemies: EnemyStore,
    bullets: BulletStore,
    player: i32,
    score: u32,
    lives: u32,
    state: GameState,
    dirty: bool,
    enemy_timer: IntervalTimer,
    bullet_timer: IntervalTimer,
    tuning: Tuning,
    rng: R,
}

impl<R: RngCore> Game<R> {
    /// A session in the `Ready` state with an empty track.
    ///
    /// Call [`restart`](Self::restart) to start playing.
    pub fn new(rng: R, tuning: Tuning, now: Instant) -> Self {
        Self {
            enemies: EnemyStore::new(),
            bullets: BulletStore::new(),
            player: PLAYER_POSITION,
            score: 0,
            lives: STARTING_LIVES,
            state: GameState::Ready,
            dirty: true,
            enemy_timer: IntervalTimer::new(tuning.enemy_step, now),
            bullet_timer: IntervalTimer::new(tuning.bullet_step, now),
            tuning,
            rng,
        }
    }

    /// Reset everything and put one fresh wave on the track.
    ///
    /// Works from any state; restarting twice in a row lands in the same
    /// place both times (apart from the random wave colors).
    pub fn restart(&mut self, now: Instant) {
        self.state = GameState::Playing;
        self.player = PLAYER_POSITION;
        self.lives = STARTING_LIVES;
        self.score = 0;
        self.bullets.clear();
        self.enemies.clear();
        self.enemy_timer.reset(now);
        self.bullet_timer.reset(now);
        self.dirty = true;

        self.spawn_wave();
        info!("New game, {} enemies incoming", self.enemies.len());
    }

    /// Launch a projectile if the game is running and a slot is free.
    pub fn fire(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        match self.bullets.fire(self.player) {
            Some(slot) => {
                debug!("Bullet {} launched", slot);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Advance the simulation to `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.state == GameState::Playing && self.enemy_timer.poll(now) {
            self.advance_enemies();
        }
        if self.state == GameState::Playing && self.bullet_timer.poll(now) {
            self.advance_bullets();
        }
        if self.state == GameState::Playing {
            self.maybe_spawn();
        }
    }

    fn advance_enemies(&mut self) {
        self.dirty = true;

        let mut i = 0;
        while i < self.enemies.len() {
            let Some(enemy) = self.enemies.get_mut(i) else {
                break;
            };
            enemy.position -= 1;
            // Once the game is over the rest of the wave still moves this step.
            if enemy.position > self.player || self.state == GameState::GameOver {
                i += 1;
                continue;
            }

            self.lives = self.lives.saturating_sub(1);
            info!("Enemy reached the player, {} lives left", self.lives);
            if self.lives == 0 {
                self.state = GameState::GameOver;
                warn!("Game over, final score {}", self.score);
                i += 1;
                continue;
            }
            // The next enemy shifts into slot `i`; look at it next.
            self.enemies.remove(i);
        }
    }

    fn advance_bullets(&mut self) {
        for slot in 0..self.bullets.slots().len() {
            let Some(bullet) = self.bullets.slot_mut(slot) else {
                continue;
            };
            if !bullet.active {
                continue;
            }
            bullet.position += 1;
            let position = bullet.position;
            self.dirty = true;

            let hit = self
                .enemies
                .iter()
                .position(|e| on_track(e.position) && e.position == position);

            match hit {
                Some(index) => {
                    self.score += SCORE_PER_KILL;
                    self.enemies.remove(index);
                    self.bullets.deactivate(slot);
                    debug!("Hit at {}, score {}", position, self.score);
                }
                None if !on_track(position) => self.bullets.deactivate(slot),
                None => {}
            }
        }
    }

    fn maybe_spawn(&mut self) {
        let roll: u32 = self.rng.gen_range(0..100);
        if roll < self.tuning.spawn_chance_percent
            && self.enemies.len() < self.tuning.spawn_soft_cap
        {
            self.spawn_wave();
        }
    }

    fn spawn_wave(&mut self) {
        let mut spawned = 0;
        for offset in 0..self.tuning.wave_size {
            let color = EnemyColor::ALL[self.rng.gen_range(0..EnemyColor::ALL.len())];
            if self.enemies.insert(Enemy::new(WAVE_START + offset as i32, color)) {
                spawned += 1;
            }
        }
        if spawned > 0 {
            self.dirty = true;
        }
        debug!("Wave spawned: {} enemies, {} live", spawned, self.enemies.len());
    }
}

impl<R> Game<R> {
    pub const fn state(&self) -> GameState {
        self.state
    }

    pub const fn score(&self) -> u32 {
        self.score
    }

    pub const fn lives(&self) -> u32 {
        self.lives
    }

    pub const fn player(&self) -> i32 {
        self.player
    }

    pub const fn enemies(&self) -> &EnemyStore {
        &self.enemies
    }

    pub const fn bullets(&self) -> &BulletStore {
        &self.bullets
    }

    pub const fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Whether anything visible changed since the last render.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called by the renderer once a frame has been shown.
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use embassy_time::Duration;
    use rand::{
        SeedableRng,
        rngs::SmallRng,
    };

    use super::*;
    use crate::config::{
        MAX_BULLETS,
        TRACK_LEN,
    };

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn playing(tuning: Tuning) -> Game<SmallRng> {
        let mut game = Game::new(SmallRng::seed_from_u64(7), tuning, at(0));
        game.restart(at(0));
        game
    }

    fn with_enemies(game: &mut Game<SmallRng>, positions: &[i32]) {
        game.enemies.clear();
        for &p in positions {
            game.enemies.insert(Enemy::new(p, EnemyColor::Red));
        }
    }

    #[test]
    fn new_session_waits_in_ready() {
        let mut game = Game::new(SmallRng::seed_from_u64(1), Tuning::default(), at(0));
        assert_eq!(game.state(), GameState::Ready);
        assert!(!game.fire());

        game.tick(at(10_000));
        assert!(game.enemies().is_empty());
        assert_eq!(game.bullets().active_count(), 0);
    }

    #[test]
    fn restart_spawns_one_wave_at_far_end() {
        let game = playing(Tuning::default().without_spawns());
        let positions: Vec<i32> = game.enemies().iter().map(|e| e.position).collect();
        let expected: Vec<i32> =
            (TRACK_LEN as i32 - 15..=TRACK_LEN as i32 - 8).collect();

        assert_eq!(positions, expected);
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.score(), 0);
        assert_eq!(game.lives(), 3);
        assert!(game.is_dirty());
    }

    #[test]
    fn enemies_wait_for_their_interval() {
        let mut game = playing(Tuning::default().without_spawns());
        game.mark_clean();

        game.tick(at(1999));
        assert_eq!(game.enemies().get(0).map(|e| e.position), Some(153));

        game.tick(at(2000));
        assert_eq!(game.enemies().get(0).map(|e| e.position), Some(152));
        assert!(game.is_dirty());
    }

    #[test]
    fn enemy_reaching_player_costs_a_life_and_is_removed() {
        let mut game = playing(Tuning::default().without_spawns());
        with_enemies(&mut game, &[1, 1, 5]);

        game.tick(at(2000));

        // Both enemies at 1 walked into the player; the removal compaction
        // must not skip the second one.
        assert_eq!(game.lives(), 1);
        let positions: Vec<i32> = game.enemies().iter().map(|e| e.position).collect();
        assert_eq!(positions, [4]);
        assert_eq!(game.state(), GameState::Playing);
    }

    #[test]
    fn last_life_ends_the_game_after_the_whole_wave_moves() {
        let mut game = playing(Tuning::default().without_spawns());
        game.lives = 1;
        with_enemies(&mut game, &[1, 7, 12]);
        game.fire();

        game.tick(at(2000));
        assert_eq!(game.lives(), 0);
        assert_eq!(game.state(), GameState::GameOver);
        // The whole wave moved on the fatal step, the fatal enemy included.
        let positions: Vec<i32> = game.enemies().iter().map(|e| e.position).collect();
        assert_eq!(positions, [0, 6, 11]);

        let frozen = (game.enemies().clone(), game.bullets().clone());
        game.tick(at(4000));
        game.tick(at(6000));
        assert_eq!((game.enemies().clone(), game.bullets().clone()), frozen);
        assert!(!game.fire());
    }

    #[test]
    fn bullet_kills_exactly_one_enemy() {
        let mut game = playing(Tuning::default().without_spawns());
        with_enemies(&mut game, &[3, 3, 9]);
        assert!(game.fire());

        game.tick(at(1));
        assert_eq!(game.bullets().slots()[0].position, 2);
        game.tick(at(2));

        assert_eq!(game.score(), 100);
        assert_eq!(game.enemies().len(), 2);
        assert_eq!(game.bullets().active_count(), 0);
    }

    #[test]
    fn stale_positions_are_never_hit() {
        let mut game = playing(Tuning::default().without_spawns());
        with_enemies(&mut game, &[40]);
        game.fire();
        // Force a slot into the sentinel range; nothing on track may match it.
        if let Some(b) = game.bullets.slot_mut(0) {
            b.position = -1000;
        }
        game.tick(at(1));
        assert_eq!(game.score(), 0);
        assert_eq!(game.enemies().len(), 1);
        assert_eq!(game.bullets().active_count(), 0);
    }

    #[test]
    fn bullet_leaving_the_track_despawns() {
        let mut game = playing(Tuning::default().without_spawns());
        with_enemies(&mut game, &[]);
        game.fire();
        if let Some(b) = game.bullets.slot_mut(0) {
            b.position = TRACK_LEN as i32 - 1;
        }

        game.tick(at(1));
        assert_eq!(game.bullets().active_count(), 0);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn firing_caps_at_slot_count() {
        let mut game = playing(Tuning::default().without_spawns());
        for _ in 0..MAX_BULLETS {
            assert!(game.fire());
        }
        assert!(!game.fire());
        assert_eq!(game.bullets().active_count(), MAX_BULLETS);
    }

    #[test]
    fn spawn_respects_soft_cap() {
        let tuning = Tuning {
            spawn_chance_percent: 100,
            enemy_step: Duration::from_secs(3600),
            ..Tuning::default()
        };
        let mut game = playing(tuning);
        assert_eq!(game.enemies().len(), 8);

        game.tick(at(1));
        assert_eq!(game.enemies().len(), 16);

        game.tick(at(2));
        assert_eq!(game.enemies().len(), 16);
    }

    #[test]
    fn spawn_stops_at_capacity() {
        let tuning = Tuning {
            spawn_chance_percent: 100,
            spawn_soft_cap: 100,
            enemy_step: Duration::from_secs(3600),
            ..Tuning::default()
        };
        let mut game = playing(tuning);
        game.tick(at(1));
        game.tick(at(2));
        game.tick(at(3));

        assert!(game.enemies().is_full());
        assert_eq!(game.enemies().len(), 20);
    }

    #[test]
    fn idle_tick_leaves_frame_clean() {
        let mut game = playing(Tuning::default().without_spawns());
        game.mark_clean();
        // Nothing in flight and the enemy timer has not elapsed.
        game.tick(at(5));
        assert!(!game.is_dirty());
    }
}
