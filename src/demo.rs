//! Sample owners for the demo application.
//!
//! Players expose a few commands each, so a command name such as "Heal"
//! fans out to every live player. The world spawns and despawns players at
//! runtime, which registers and deregisters their commands while the
//! overlay is open.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use anyhow::Context;
use tracing::info;

use crate::commands::{CommandRegistry, Registration};
use crate::debug_commands;

/// Maximum number of lines kept in the activity log.
const MAX_LOG_LINES: usize = 50;

/// Shared log of what the demo owners did.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    lines: Rc<RefCell<VecDeque<String>>>,
}

impl ActivityLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line, dropping the oldest past the limit.
    pub fn push(&self, line: impl Into<String>) {
        let mut lines = self.lines.borrow_mut();
        lines.push_back(line.into());
        while lines.len() > MAX_LOG_LINES {
            lines.pop_front();
        }
    }

    /// The most recent `n` lines, oldest first.
    pub fn recent(&self, n: usize) -> Vec<String> {
        let lines = self.lines.borrow();
        let skip = lines.len().saturating_sub(n);
        lines.iter().skip(skip).cloned().collect()
    }

    /// Number of stored lines.
    pub fn len(&self) -> usize {
        self.lines.borrow().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }
}

/// A player with health.
#[derive(Debug)]
pub struct Player {
    name: String,
    health: u32,
    log: ActivityLog,
}

impl Player {
    /// Full health.
    pub const MAX_HEALTH: u32 = 100;

    /// Create a player at full health.
    pub fn new(name: impl Into<String>, log: ActivityLog) -> Self {
        Self {
            name: name.into(),
            health: Self::MAX_HEALTH,
            log,
        }
    }

    /// The player's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current health.
    pub fn health(&self) -> u32 {
        self.health
    }

    /// Restore 25 health.
    pub fn heal(&mut self) {
        self.health = (self.health + 25).min(Self::MAX_HEALTH);
        self.log
            .push(format!("{} healed to {}", self.name, self.health));
    }

    /// Lose 40 health.
    pub fn take_damage(&mut self) {
        self.health = self.health.saturating_sub(40);
        self.log
            .push(format!("{} took damage, {} left", self.name, self.health));
    }

    /// Jump, which a downed player cannot do.
    pub fn jump(&mut self) -> anyhow::Result<()> {
        if self.health == 0 {
            anyhow::bail!("{} is down and cannot jump", self.name);
        }
        self.log.push(format!("{} jumped", self.name));
        Ok(())
    }
}

debug_commands!(Player {
    "Heal" => heal,
    "Take Damage" => take_damage,
    "Jump" => jump,
});

/// Spawns and despawns players.
pub struct World {
    registry: Weak<CommandRegistry>,
    players: Vec<Registration<Player>>,
    spawned: usize,
    log: ActivityLog,
}

impl World {
    /// Create an empty world whose players register with `registry`.
    pub fn new(registry: &Rc<CommandRegistry>, log: ActivityLog) -> Self {
        Self {
            registry: Rc::downgrade(registry),
            players: Vec::new(),
            spawned: 0,
            log,
        }
    }

    /// Live players, oldest first.
    pub fn players(&self) -> impl Iterator<Item = &Rc<RefCell<Player>>> {
        self.players.iter().map(Registration::owner)
    }

    /// Number of live players.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Create a player and register its commands.
    pub fn spawn_player(&mut self) -> anyhow::Result<()> {
        let registry = self
            .registry
            .upgrade()
            .context("command registry is gone")?;

        self.spawned += 1;
        let name = format!("Player{}", self.spawned);
        let player = Rc::new(RefCell::new(Player::new(name.clone(), self.log.clone())));
        self.players.push(registry.attach(player));

        info!(player = %name, "Spawned player");
        self.log.push(format!("{} spawned", name));
        Ok(())
    }

    /// Remove the newest player and its commands.
    pub fn despawn_player(&mut self) -> anyhow::Result<()> {
        let registration = self.players.pop().context("no players to despawn")?;
        let name = registration.owner().borrow().name.clone();
        drop(registration);

        info!(player = %name, "Despawned player");
        self.log.push(format!("{} despawned", name));
        Ok(())
    }
}

debug_commands!(World {
    "Spawn Player" => spawn_player,
    "Despawn Player" => despawn_player,
});
