//! Components of the demo scene and the console commands they declare.

use console_core::{ObjectRef, Quaternion, TypeUniverse, Vector3};
use console_macros::{Commands, ConsoleEnum, console_commands};

#[derive(Debug, Clone, Copy, PartialEq, ConsoleEnum)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Nightmare,
}

fn announce_hit(damage: f32) -> String {
    format!("ouch, {damage} damage")
}

#[derive(Commands)]
pub struct Health {
    #[command]
    pub points: f32,
    #[command(readonly)]
    pub max: f32,
    #[command]
    pub god: bool,
    #[command(callback, name = "OnHit")]
    pub on_hit: fn(f32) -> String,
}

impl Health {
    pub fn new(points: f32) -> Self {
        Self { points, max: 100.0, god: false, on_hit: announce_hit }
    }
}

#[console_commands]
impl Health {
    #[command(name = "AddHealth")]
    pub fn add_health(&mut self, amount: f32) -> f32 {
        self.points = (self.points + amount).min(self.max);
        self.points
    }

    #[command]
    pub fn damage(&mut self, amount: f32) -> Result<f32, String> {
        if amount < 0.0 {
            return Err(format!("damage must not be negative, got {amount}"));
        }
        if !self.god {
            self.points = (self.points - amount).max(0.0);
        }
        Ok(self.points)
    }

    #[command(name = "ResetHealth")]
    pub fn reset_health(&mut self) {
        self.points = self.max;
    }

    #[command(force)]
    fn dump(&self) -> String {
        format!("{}/{} god={}", self.points, self.max, self.god)
    }
}

#[derive(Commands, Default)]
pub struct Transform {
    #[command]
    pub position: Vector3,
    #[command]
    pub rotation: Quaternion,
}

#[console_commands]
impl Transform {
    #[command]
    pub fn teleport(&mut self, to: Vector3) -> Vector3 {
        std::mem::replace(&mut self.position, to)
    }

    #[command]
    pub fn nudge(&mut self, dx: f32, dy: f32, dz: f32) -> Vector3 {
        self.position.x += dx;
        self.position.y += dy;
        self.position.z += dz;
        self.position
    }
}

pub struct Player {
    score: i32,
    difficulty: Difficulty,
    nickname: String,
    title: Option<String>,
}

impl Player {
    pub fn new(nickname: &str) -> Self {
        Self { score: 0, difficulty: Difficulty::Normal, nickname: nickname.to_string(), title: None }
    }
}

#[console_commands]
impl Player {
    #[command(get)]
    pub fn get_score(&self) -> i32 {
        self.score
    }

    #[command(set)]
    pub fn set_score(&mut self, score: i32) {
        self.score = score;
    }

    #[command(get)]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[command(name = "SetDifficulty")]
    pub fn set_difficulty(&mut self, level: Difficulty) {
        self.difficulty = level;
    }

    #[command]
    pub fn rename(&mut self, nickname: &str) -> String {
        std::mem::replace(&mut self.nickname, nickname.to_string())
    }

    #[command(name = "SetTitle")]
    pub fn set_title(&mut self, title: Option<String>) -> String {
        self.title = title;
        match &self.title {
            Some(title) => format!("{title} {}", self.nickname),
            None => self.nickname.clone(),
        }
    }

    #[command]
    pub fn inspect(&self, other: ObjectRef) -> String {
        format!("{} is looking at {}", self.nickname, other.0.name())
    }

    #[command]
    fn cheat(&mut self) -> i32 {
        self.score += 1000;
        self.score
    }
}

/// Commands that do not belong to any object.
pub struct Game;

#[console_commands]
impl Game {
    #[command]
    pub fn echo(text: &str) -> String {
        text.to_string()
    }

    #[command]
    pub fn add(a: i32, b: i32) -> i32 {
        a.wrapping_add(b)
    }

    #[command]
    pub fn restart() {
        tracing::info!("restart requested");
    }

    #[command(get)]
    pub fn version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

/// Every type the demo declares commands on.
pub fn universe() -> TypeUniverse {
    TypeUniverse::new()
        .register(Health::console_fields)
        .register(Health::console_methods)
        .register(Transform::console_fields)
        .register(Transform::console_methods)
        .register(Player::console_methods)
        .register(Game::console_methods)
}
