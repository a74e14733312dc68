use bevy::prelude::*;

/// Health reached zero. `direction` is the entity's last movement direction.
#[derive(Event, Message, Debug, Clone, Copy)]
pub struct DeathEvent {
    pub entity: Entity,
    pub direction: Vec2,
}

#[derive(Event, Message, Debug, Clone, Copy)]
pub struct LevelUpEvent {
    pub entity: Entity,
    pub level: u32,
}
