use bevy::prelude::*;

// ============================================================================
// Health
// ============================================================================

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub max: f32,
    pub value: f32,
    /// Seconds of immunity granted by each hit.
    pub invulnerability: f32,
    /// Seconds of immunity left.
    pub invulnerable_for: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { max, value: max, invulnerability: 0.0, invulnerable_for: 0.0 }
    }

    pub fn with_invulnerability(mut self, seconds: f32) -> Self {
        self.invulnerability = seconds;
        self
    }

    pub fn is_dead(&self) -> bool {
        self.value <= 0.0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_for > 0.0
    }

    /// Returns whether the hit landed.
    pub fn damage(&mut self, amount: f32) -> bool {
        if self.is_dead() || self.is_invulnerable() {
            return false;
        }
        self.value = (self.value - amount).max(0.0);
        self.invulnerable_for = self.invulnerability;
        true
    }

    pub fn heal(&mut self, amount: f32) {
        self.value = (self.value + amount).min(self.max);
    }
}

/// Health regained per second, applied on the 100 ms interval clock.
#[derive(Component, Debug, Clone, Copy)]
pub struct Regeneration {
    pub per_second: f32,
}

/// Set once a `DeathEvent` was written so it is never written twice.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Dead;

/// Removes the entity once `remaining` reaches zero.
#[derive(Component, Debug, Clone, Copy)]
pub struct DespawnTimed {
    pub remaining: f32,
}

impl DespawnTimed {
    pub fn after(seconds: f32) -> Self {
        Self { remaining: seconds }
    }
}

// ============================================================================
// Combat
// ============================================================================

/// Damage dealt on entering a pursuer. Pierce is the projectile's own `Health`.
#[derive(Component, Debug, Clone, Copy)]
pub struct Projectile {
    pub damage: f32,
}

/// Fires projectiles on its own cooldown.
#[derive(Component, Debug, Clone, Copy)]
pub struct Shooter {
    pub interval: f32,
    pub cooldown: f32,
}

impl Shooter {
    pub fn every(interval: f32) -> Self {
        Self { interval, cooldown: interval }
    }
}

// ============================================================================
// Pickups
// ============================================================================

/// Experience dropped by a dead pursuer.
#[derive(Component, Debug, Clone, Copy)]
pub struct Powerup {
    pub experience: f32,
}

/// Pulls powerups within `range` toward itself at `speed`.
#[derive(Component, Debug, Clone, Copy)]
pub struct PowerCollector {
    pub range: f32,
    pub speed: f32,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Experience {
    pub points: f32,
    pub level: u32,
    pub next_level: f32,
}

impl Experience {
    pub fn new(first_level: f32) -> Self {
        Self { points: 0.0, level: 1, next_level: first_level }
    }

    /// Add points; returns the number of levels gained.
    pub fn gain(&mut self, points: f32, growth: f32) -> u32 {
        self.points += points;
        let mut gained = 0;
        while self.next_level > 0.0 && self.points >= self.next_level {
            self.points -= self.next_level;
            self.next_level *= growth.max(1.0);
            self.level += 1;
            gained += 1;
        }
        gained
    }
}
