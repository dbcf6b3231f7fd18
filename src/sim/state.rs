//! Game state and core simulation types
//!
//! Everything the simulation mutates lives in one `GameState` value that is
//! passed to every system. There are no module-level globals.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::maze::MazeGeometry;
use crate::consts::*;
use crate::highscores::HighScores;
use crate::settings::Settings;
use crate::tuning::{Boost, LevelConfig, LevelTable, TypeBoost};
use crate::ui::Buttons;
use crate::normalize_angle;

/// How the ship is currently moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locomotion {
    /// Coasting with drag while the nose sweeps around
    Rotating,
    /// Accelerating along the locked thrust direction
    Thrusting,
}

/// The player's ship
#[derive(Debug, Clone, Serialize)]
pub struct Ship {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing angle, normalized to (-π, π]
    pub angle: f32,
    pub angular_vel: f32,
    pub locomotion: Locomotion,
    /// Facing captured when thrust began
    pub thrust_dir: f32,
    pub alive: bool,
}

impl Ship {
    pub fn new(pos: Vec2) -> Self {
        let angle = -std::f32::consts::FRAC_PI_2;
        Self {
            pos,
            vel: Vec2::ZERO,
            angle,
            angular_vel: ANGULAR_VEL,
            locomotion: Locomotion::Rotating,
            thrust_dir: angle,
            alive: true,
        }
    }

    /// Put the ship back at `pos`, pointing up and at rest
    pub fn reset_at(&mut self, pos: Vec2) {
        *self = Self::new(pos);
    }

    pub fn is_thrusting(&self) -> bool {
        self.locomotion == Locomotion::Thrusting
    }

    /// Lock the current facing and start thrusting
    pub fn begin_thrust(&mut self) {
        self.locomotion = Locomotion::Thrusting;
        self.thrust_dir = self.angle;
    }

    pub fn end_thrust(&mut self) {
        self.locomotion = Locomotion::Rotating;
    }

    /// Orientation of the hitbox (and the drawn hull)
    pub fn hull_angle(&self) -> f32 {
        match self.locomotion {
            Locomotion::Thrusting => self.thrust_dir,
            Locomotion::Rotating => self.angle,
        }
    }

    /// Advance the facing angle
    pub fn turn(&mut self, dt: f32) {
        self.angle = normalize_angle(self.angle + self.angular_vel * dt);
    }
}

/// Body types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    Coin,
    Hazard,
    HazardElite,
    Health,
    IceStar,
    /// Inert marker left behind by a struck ice star while its patch grows
    IcePatchExpanding,
}

impl BodyKind {
    /// Kinds that survive contact with health pickups (and destroy them)
    pub fn is_hazardous(self) -> bool {
        matches!(
            self,
            BodyKind::Hazard
                | BodyKind::HazardElite
                | BodyKind::IceStar
                | BodyKind::IcePatchExpanding
        )
    }

    /// Level boost family for this kind; None means neutral
    pub fn boost(self, table: &TypeBoost) -> Boost {
        match self {
            BodyKind::Coin => table.coin,
            BodyKind::Hazard | BodyKind::IceStar => table.hazard,
            BodyKind::HazardElite => table.elite,
            BodyKind::Health | BodyKind::IcePatchExpanding => Boost::NEUTRAL,
        }
    }
}

/// A gravitating body (pickup or hazard)
#[derive(Debug, Clone, Serialize)]
pub struct Body {
    pub id: u32,
    pub kind: BodyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub grav_mult: f32,
    pub attract_mult: f32,
    pub speed_mult: f32,
    /// Grow-in animation progress (seconds)
    pub spawn_time: f32,
    pub spawn_duration: f32,
    /// Placed by the maze layout rather than a spawner
    pub maze_item: bool,
}

impl Body {
    pub fn new(id: u32, kind: BodyKind, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            radius,
            grav_mult: 1.0,
            attract_mult: 1.0,
            speed_mult: 1.0,
            spawn_time: 0.0,
            spawn_duration: BODY_SPAWN_DURATION,
            maze_item: false,
        }
    }

    /// Circles touch or overlap
    pub fn overlaps(&self, other: &Body) -> bool {
        let min_dist = self.radius + other.radius;
        self.pos.distance_squared(other.pos) <= min_dist * min_dist
    }

    /// Multiply gravity and speed by the level's boost for this kind
    pub fn apply_boost(&mut self, table: &TypeBoost) {
        let boost = self.kind.boost(table);
        self.grav_mult *= boost.grav;
        self.speed_mult *= boost.speed;
    }

    pub fn advance(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        if self.spawn_time < self.spawn_duration {
            self.spawn_time = (self.spawn_time + dt).min(self.spawn_duration);
        }
    }
}

/// Explosion debris
#[derive(Debug, Clone, Serialize)]
pub struct Fragment {
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f32,
    pub life: f32,
}

/// The level-exit vortex
#[derive(Debug, Clone, Serialize)]
pub struct Wormhole {
    pub pos: Vec2,
    pub radius: f32,
    /// Animation phase (radians)
    pub phase: f32,
    /// Open levels pull the ship in; maze exits do not
    pub pulls: bool,
}

impl Wormhole {
    /// Distance at which the ship is captured
    pub fn capture_distance(&self) -> f32 {
        if self.pulls {
            self.radius + SHIP_RADIUS * CAPTURE_SHIP_FRACTION
        } else {
            SHIP_RADIUS
        }
    }
}

/// Freezing area left by a struck ice star
#[derive(Debug, Clone, Serialize)]
pub struct IcePatch {
    pub pos: Vec2,
    pub initial_radius: f32,
    pub target_radius: f32,
    pub current_radius: f32,
    pub expansion_timer: f32,
    pub timer: f32,
    /// Radius ratios around the rim, for drawing
    pub edge_profile: Vec<f32>,
    /// Marker body removed once expansion completes
    #[serde(skip)]
    pub source_body: Option<u32>,
}

impl IcePatch {
    pub fn new(pos: Vec2, radius: f32, source_body: u32, edge_profile: Vec<f32>) -> Self {
        Self {
            pos,
            initial_radius: radius,
            target_radius: radius * ICE_GROWTH,
            current_radius: radius,
            expansion_timer: 0.0,
            timer: 0.0,
            edge_profile,
            source_body: Some(source_body),
        }
    }

    pub fn is_expanding(&self) -> bool {
        self.expansion_timer < ICE_EXPANSION_TIME
    }

    pub fn is_expired(&self) -> bool {
        self.timer >= ICE_LIFETIME
    }

    /// Point lies inside the freezing radius (with tolerance)
    pub fn freezes(&self, point: Vec2) -> bool {
        let reach = self.current_radius * FREEZE_TOLERANCE;
        self.pos.distance_squared(point) <= reach * reach
    }

    pub fn advance(&mut self, dt: f32) {
        self.timer += dt;
        self.expansion_timer = (self.expansion_timer + dt).min(ICE_EXPANSION_TIME);
        let t = self.expansion_timer / ICE_EXPANSION_TIME;
        self.current_radius = self.initial_radius + (self.target_radius - self.initial_radius) * t;
    }
}

/// Timed and positional status effects on the ship
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusEffects {
    /// Velocity captured on entering an ice patch
    pub frozen_vel: Option<Vec2>,
    /// Seconds of reversed spin remaining
    pub reverse_spin: f32,
}

impl StatusEffects {
    pub fn is_frozen(&self) -> bool {
        self.frozen_vel.is_some()
    }

    pub fn reverse_spin_active(&self) -> bool {
        self.reverse_spin > 0.0
    }

    /// Angular velocity the effects impose on the ship
    pub fn angular_vel(&self) -> f32 {
        if self.reverse_spin_active() {
            -ANGULAR_VEL
        } else if self.is_frozen() {
            0.0
        } else {
            ANGULAR_VEL
        }
    }
}

/// Hit flash colour family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTint {
    #[default]
    Hazard,
    Elite,
    Wall,
}

/// Short visual signals for the renderer
#[derive(Debug, Clone, Default, Serialize)]
pub struct Flashes {
    pub hit: f32,
    pub hit_tint: HitTint,
    pub heal: f32,
}

impl Flashes {
    pub fn hit(&mut self, tint: HitTint, duration: f32) {
        self.hit_tint = tint;
        self.hit = self.hit.max(duration);
    }

    pub fn decay(&mut self, dt: f32) {
        self.hit = (self.hit - dt).max(0.0);
        self.heal = (self.heal - dt).max(0.0);
    }
}

/// Smoothed HUD values
#[derive(Debug, Clone, Serialize)]
pub struct HudDisplay {
    pub energy: f32,
    pub score: f64,
}

/// Pending resurrection after an explosion
#[derive(Debug, Clone, Serialize)]
pub struct Respawn {
    pub cooldown: f32,
    pub check_timer: f32,
    pub checks: u32,
}

impl Respawn {
    pub fn new() -> Self {
        Self {
            cooldown: RESPAWN_COOLDOWN,
            check_timer: 0.0,
            checks: 0,
        }
    }
}

impl Default for Respawn {
    fn default() -> Self {
        Self::new()
    }
}

/// Between-levels sub-stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntermissionStage {
    Banner,
    Tally,
    Pause,
    Fade,
    Countdown,
    Quote,
}

impl IntermissionStage {
    pub fn duration(self) -> f32 {
        match self {
            IntermissionStage::Banner => BANNER_TIME,
            IntermissionStage::Tally => TALLY_TIME,
            IntermissionStage::Pause => PAUSE_TIME,
            IntermissionStage::Fade => FADE_TIME,
            IntermissionStage::Countdown => LEVEL_COUNTDOWN,
            IntermissionStage::Quote => QUOTE_TIME,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            IntermissionStage::Banner => Some(IntermissionStage::Tally),
            IntermissionStage::Tally => Some(IntermissionStage::Pause),
            IntermissionStage::Pause => Some(IntermissionStage::Fade),
            IntermissionStage::Fade => Some(IntermissionStage::Countdown),
            IntermissionStage::Countdown => Some(IntermissionStage::Quote),
            IntermissionStage::Quote => None,
        }
    }
}

/// Between-levels payload
#[derive(Debug, Clone, Serialize)]
pub struct Intermission {
    pub stage: IntermissionStage,
    pub timer: f32,
    pub from_level: usize,
    pub bonus: u64,
    /// Score before the bonus is credited
    pub base_score: u64,
    /// Bonus still shown as uncredited
    pub shown_bonus: u64,
    pub quote: Option<usize>,
}

/// Game-over sub-stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverStage {
    /// Waiting for the leaderboard to answer
    AwaitingScores,
    NameEntry { name: String },
    Summary,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameOver {
    pub stage: GameOverStage,
    pub timer: f32,
    pub final_score: u64,
    pub rank: Option<usize>,
}

/// Top-level game phase
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// Title screen, waiting for the start button
    Start,
    StartCountdown { timer: f32 },
    Playing,
    /// Ship is being pulled through the wormhole
    Captured { timer: f32, warp_from: u32 },
    BetweenLevels(Intermission),
    GameOver(GameOver),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::StartCountdown { .. } => "startCountdown",
            Phase::Playing => "playing",
            Phase::Captured { .. } => "captured",
            Phase::BetweenLevels(_) => "betweenLevels",
            Phase::GameOver(_) => "gameOver",
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Phase::Playing)
    }

    pub fn is_captured(&self) -> bool {
        matches!(self, Phase::Captured { .. })
    }
}

/// Notifications for the driver, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    LevelStarted { level: usize },
    WormholeOpened { level: usize },
    ShipExploded { lives_left: u8 },
    Captured { level: usize },
    LevelComplete { level: usize, bonus: u64 },
    GameOver { score: u64 },
    /// Ask the leaderboard for its top entries
    FetchTopScores { limit: usize },
    SubmitScore { name: String, score: u64 },
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub levels: LevelTable,
    pub level_index: usize,
    /// Play-area size in pixels
    pub arena: Vec2,
    pub max_dt: f32,

    pub ship: Ship,
    pub bodies: Vec<Body>,
    pub fragments: Vec<Fragment>,
    pub wormhole: Option<Wormhole>,
    pub ice_patches: Vec<IcePatch>,
    pub maze: Option<MazeGeometry>,

    /// 0..=1
    pub energy: f32,
    pub score: u64,
    pub warp: u32,
    /// Spare lives
    pub lives: u8,
    pub starting_lives: u8,
    /// Suppresses slingshot scoring while captured
    pub score_locked: bool,
    pub invuln: f32,

    pub spawn_timer: f32,
    pub health_timer: f32,
    pub health_interval: Option<f32>,

    pub effects: StatusEffects,
    pub flashes: Flashes,
    pub hud: HudDisplay,
    pub respawn: Option<Respawn>,
    pub game_over_delay: Option<f32>,

    pub phase: Phase,
    /// Cached top scores (local fallback and qualification)
    pub leaderboard: HighScores,
    pub events: Vec<GameEvent>,
    pub buttons: Buttons,
    pub time: f64,
    next_id: u32,
}

impl GameState {
    /// Create a new game on the title screen
    pub fn new(seed: u64, levels: LevelTable, width: f32, height: f32) -> Self {
        let arena = Vec2::new(width.max(1.0), height.max(1.0));
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            levels,
            level_index: 0,
            arena,
            max_dt: MAX_FRAME_DT,
            ship: Ship::new(arena * 0.5),
            bodies: Vec::with_capacity(MAX_BODIES),
            fragments: Vec::new(),
            wormhole: None,
            ice_patches: Vec::new(),
            maze: None,
            energy: 1.0,
            score: 0,
            warp: 0,
            lives: STARTING_LIVES,
            starting_lives: STARTING_LIVES,
            score_locked: false,
            invuln: 0.0,
            spawn_timer: 0.0,
            health_timer: 0.0,
            health_interval: None,
            effects: StatusEffects::default(),
            flashes: Flashes::default(),
            hud: HudDisplay {
                energy: 1.0,
                score: 0.0,
            },
            respawn: None,
            game_over_delay: None,
            phase: Phase::Start,
            leaderboard: HighScores::new(),
            events: Vec::new(),
            buttons: Buttons::layout(arena),
            time: 0.0,
            next_id: 1,
        }
    }

    /// Create a game using host settings
    pub fn with_settings(seed: u64, settings: &Settings, width: f32, height: f32) -> Self {
        let mut state = Self::new(seed, settings.level_table(), width, height);
        state.max_dt = settings.effective_max_dt();
        state.starting_lives = settings.starting_lives;
        state.lives = settings.starting_lives;
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Active level configuration
    pub fn level(&self) -> &LevelConfig {
        self.levels.get(self.level_index)
    }

    pub fn is_maze_level(&self) -> bool {
        self.maze.is_some()
    }

    pub fn score_goal(&self) -> u32 {
        self.level().score_goal
    }

    /// Legal rectangle for the ship centre
    ///
    /// Open levels use the play area below the HUD; maze levels use the
    /// grid's outer rectangle.
    pub fn ship_bounds(&self) -> (Vec2, Vec2) {
        let (min, max) = match &self.maze {
            Some(maze) => {
                let (top_left, bottom_right) = maze.grid_rect(self.arena);
                (
                    top_left + Vec2::splat(SHIP_RADIUS),
                    bottom_right - Vec2::splat(SHIP_RADIUS),
                )
            }
            None => (
                Vec2::new(SHIP_RADIUS, HUD_SAFE_BOTTOM + SHIP_RADIUS / 4.0),
                Vec2::new(self.arena.x - SHIP_RADIUS, self.arena.y - SHIP_RADIUS),
            ),
        };
        (min, max.max(min))
    }

    /// Where the ship (re)appears
    pub fn spawn_point(&self) -> Vec2 {
        match &self.maze {
            Some(maze) => maze.cell_center(maze.entry(), self.arena),
            None => self.arena * 0.5,
        }
    }

    /// Deduct energy; true when this hit should destroy the ship
    pub fn drain_energy(&mut self, amount: f32) -> bool {
        self.energy = (self.energy - amount).clamp(0.0, 1.0);
        self.energy <= 0.0 && self.ship.alive
    }

    pub fn restore_energy(&mut self, amount: f32) {
        self.energy = (self.energy + amount).clamp(0.0, 1.0);
    }

    /// Uniform sample in [0, 1)
    pub fn random_unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform sample in [min, max); returns `min` for an empty range
    pub fn random_between(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.random_range(min..max)
        } else {
            min
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending driver notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
