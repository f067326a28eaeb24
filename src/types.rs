use serde::Serialize;

/// Point or direction in sensor space (millimetres for positions, unit
/// length for directions). `y` grows upward from the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Anatomical finger type as reported by the tracking service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerType {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl FingerType {
    /// Map the Leap protocol finger code (0 = thumb .. 4 = pinky).
    pub fn from_code(code: i64) -> Option<FingerType> {
        match code {
            0 => Some(FingerType::Thumb),
            1 => Some(FingerType::Index),
            2 => Some(FingerType::Middle),
            3 => Some(FingerType::Ring),
            4 => Some(FingerType::Pinky),
            _ => None,
        }
    }
}

/// A tracked finger-like appendage.
#[derive(Debug, Clone, PartialEq)]
pub struct Pointable {
    pub extended: bool,
    pub tip_position: Vector3,
    pub direction: Vector3,
    /// `None` for tools or untyped pointables.
    pub finger: Option<FingerType>,
}

/// One tracked hand.
///
/// `thumb`, `middle_finger` and `pinky` are the same pointables found in
/// `pointables`, looked up by finger type. They are optional because the
/// tracker may drop a finger; consumers that need one report it as
/// malformed input rather than guessing.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    pub palm_position: Vector3,
    pub direction: Vector3,
    pub pointables: Vec<Pointable>,
    pub thumb: Option<Pointable>,
    pub middle_finger: Option<Pointable>,
    pub pinky: Option<Pointable>,
}

/// Recognized discrete gesture kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Circle,
    Swipe,
    KeyTap,
    ScreenTap,
}

/// Gesture lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Start,
    Update,
    Stop,
}

/// A recognized discrete gesture. `radius` and `normal` are only meaningful
/// for circles; other kinds carry zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    pub kind: GestureKind,
    pub state: GestureState,
    pub radius: f64,
    pub normal: Vector3,
}

/// One sensor sample.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub id: u64,
    pub timestamp_us: u64,
    pub hands: Vec<Hand>,
    pub gestures: Vec<Gesture>,
}

impl Frame {
    /// The hand the pilot follows. Additional hands are ignored.
    pub fn primary_hand(&self) -> Option<&Hand> {
        self.hands.first()
    }

    /// The gesture fed to the takeoff/land machine this tick.
    pub fn primary_gesture(&self) -> Option<&Gesture> {
        self.gestures.first()
    }
}

/// Whether the vehicle is grounded, arming, airborne or disarming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlightState {
    #[default]
    Landed,
    /// `seen` qualifying takeoff circles so far.
    TakeoffConfirming { seen: u32 },
    Flying,
    /// `seen` qualifying landing circles so far.
    LandConfirming { seen: u32 },
}

impl FlightState {
    pub fn is_flying(&self) -> bool {
        matches!(self, FlightState::Flying)
    }

    /// Airborne states: motors running, a landing is meaningful.
    pub fn is_airborne(&self) -> bool {
        matches!(self, FlightState::Flying | FlightState::LandConfirming { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightState::Landed => "LANDED",
            FlightState::TakeoffConfirming { .. } => "TAKE_OFF",
            FlightState::Flying => "FLYING",
            FlightState::LandConfirming { .. } => "LAND",
        }
    }
}

/// Motion axis of a velocity command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Up/down.
    Vertical,
    /// Left/right.
    Lateral,
    /// Forward/back.
    Longitudinal,
}

/// Sign of a velocity command along its axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
}

/// A command for the vehicle. Transient: the core keeps no history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Takeoff,
    Land,
    Hover,
    Move {
        axis: Axis,
        direction: Direction,
        speed: f64,
    },
}

impl Command {
    pub fn is_move(&self) -> bool {
        matches!(self, Command::Move { .. })
    }

    /// Human-readable motion label.
    ///
    /// Positive lateral maps to the vehicle's left and positive longitudinal
    /// to forward.
    pub fn label(&self) -> &'static str {
        match self {
            Command::Takeoff => "Taking Off",
            Command::Land => "Landing",
            Command::Hover => "Hovering",
            Command::Move { axis, direction, .. } => match (axis, direction) {
                (Axis::Vertical, Direction::Positive) => "Going Up",
                (Axis::Vertical, Direction::Negative) => "Going Down",
                (Axis::Lateral, Direction::Positive) => "Going Left",
                (Axis::Lateral, Direction::Negative) => "Going Right",
                (Axis::Longitudinal, Direction::Positive) => "Going Forward",
                (Axis::Longitudinal, Direction::Negative) => "Going Backward",
            },
        }
    }
}
