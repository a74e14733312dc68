use bevy::prelude::*;

use crate::game::simulation::{Heading, PhysicsBody};

/// The single entity the horde chases. The pursuit field is centred on it.
#[derive(Component, Debug, Default)]
#[require(PhysicsBody, Heading)]
pub struct Player;

/// A horde member steered along the pursuit field.
#[derive(Component, Debug, Default)]
#[require(PhysicsBody, Heading)]
pub struct Pursuer;
