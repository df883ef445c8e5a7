//! Fixed-capacity arenas for everything that moves on the track.
//!
//! Enemies are kept packed at the front of their arena; projectiles live in
//! independent slots. Neither arena ever grows: inserting into a full one is
//! silently ignored.

use crate::config::{
    EMPTY_SLOT,
    MAX_BULLETS,
    MAX_ENEMIES,
    TRACK_LEN,
};

/// Whether `position` addresses a real LED.
pub const fn on_track(position: i32) -> bool {
    position >= 0 && position < TRACK_LEN as i32
}

// ── Enemies ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnemyColor {
    Red,
    Green,
    Blue,
}

impl EnemyColor {
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Enemy {
    pub position: i32,
    pub color: EnemyColor,
}

impl Enemy {
    /// Contents of every slot past the live count.
    pub const EMPTY: Self = Self {
        position: EMPTY_SLOT,
        color: EnemyColor::Red,
    };

    pub const fn new(position: i32, color: EnemyColor) -> Self {
        Self { position, color }
    }
}

/// Dense, order-preserving enemy arena.
///
/// `slots[..len]` are live, `slots[len..]` always hold [`Enemy::EMPTY`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnemyStore<const M: usize = MAX_ENEMIES> {
    slots: [Enemy; M],
    len: usize,
}

impl<const M: usize> Default for EnemyStore<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const M: usize> EnemyStore<M> {
    pub const fn new() -> Self {
        Self {
            slots: [Enemy::EMPTY; M],
            len: 0,
        }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn is_full(&self) -> bool {
        self.len == M
    }

    pub const fn capacity(&self) -> usize {
        M
    }

    /// Append at the back. Returns `false` (and changes nothing) when full.
    pub fn insert(&mut self, enemy: Enemy) -> bool {
        if self.is_full() {
            return false;
        }
        self.slots[self.len] = enemy;
        self.len += 1;
        true
    }

    /// Remove the enemy at `index`, shifting later ones left by one.
    ///
    /// The vacated tail slot is reset to [`Enemy::EMPTY`] so stale data can
    /// never be read back as a live enemy. Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<Enemy> {
        if index >= self.len {
            return None;
        }
        let removed = self.slots[index];
        self.slots.copy_within(index + 1..self.len, index);
        self.len -= 1;
        self.slots[self.len] = Enemy::EMPTY;
        Some(removed)
    }

    pub fn get(&self, index: usize) -> Option<&Enemy> {
        self.live().get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Enemy> {
        let len = self.len;
        self.slots[..len].get_mut(index)
    }

    /// Live enemies, front to back.
    pub fn live(&self) -> &[Enemy] {
        &self.slots[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.live().iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        let len = self.len;
        self.slots[..len].iter_mut()
    }

    /// The whole arena, including cleared slots.
    pub const fn slots(&self) -> &[Enemy; M] {
        &self.slots
    }

    /// Drop every enemy and clear all slots.
    pub fn clear(&mut self) {
        self.slots.fill(Enemy::EMPTY);
        self.len = 0;
    }
}

// ── Projectiles ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bullet {
    pub active: bool,
    /// Meaningless once the slot is inactive.
    pub position: i32,
}

impl Bullet {
    pub const INACTIVE: Self = Self {
        active: false,
        position: -1,
    };
}

/// Projectile slots. Any inactive slot can be reused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulletStore<const K: usize = MAX_BULLETS> {
    slots: [Bullet; K],
}

impl<const K: usize> Default for BulletStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const K: usize> BulletStore<K> {
    pub const fn new() -> Self {
        Self {
            slots: [Bullet::INACTIVE; K],
        }
    }

    /// Launch from just ahead of `player` using the first free slot.
    ///
    /// Returns the slot index, or `None` when all `K` are in flight.
    pub fn fire(&mut self, player: i32) -> Option<usize> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, b)| !b.active)?;
        *slot = Bullet {
            active: true,
            position: player + 1,
        };
        Some(index)
    }

    pub fn deactivate(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.active = false;
        }
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|b| b.active).count()
    }

    /// `(slot, position)` for every projectile in flight.
    pub fn active(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, b)| b.active)
            .map(|(i, b)| (i, b.position))
    }

    pub const fn slots(&self) -> &[Bullet; K] {
        &self.slots
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut Bullet> {
        self.slots.get_mut(index)
    }

    pub fn clear(&mut self) {
        self.slots.fill(Bullet::INACTIVE);
    }
}
