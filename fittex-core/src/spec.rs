use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target size level of the factorial design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetSize {
    Small,
    Medium,
    Large,
}

impl TargetSize {
    pub const ALL: [TargetSize; 3] = [TargetSize::Small, TargetSize::Medium, TargetSize::Large];

    /// Target radius in pixels
    pub fn radius(self) -> f64 {
        match self {
            TargetSize::Small => 12.5,
            TargetSize::Medium => 25.0,
            TargetSize::Large => 50.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TargetSize::Small => "small",
            TargetSize::Medium => "medium",
            TargetSize::Large => "large",
        }
    }
}

/// Gap level: distance from the start position to the target center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gap {
    Short,
    Long,
}

impl Gap {
    pub const ALL: [Gap; 2] = [Gap::Short, Gap::Long];

    /// Center offset in pixels
    pub fn distance(self) -> f64 {
        match self {
            Gap::Short => 100.0,
            Gap::Long => 250.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gap::Short => "short",
            Gap::Long => "long",
        }
    }
}

/// Side level: which half of the screen the target appears on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    /// Direction sign applied to the center offset
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

macro_rules! level_text_impls {
    ($ty:ty { $($label:literal => $variant:expr),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = InvalidLevel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($variant),)+
                    other => Err(InvalidLevel::new(other)),
                }
            }
        }
    };
}

level_text_impls!(TargetSize {
    "small" => TargetSize::Small,
    "medium" => TargetSize::Medium,
    "large" => TargetSize::Large,
});
level_text_impls!(Gap { "short" => Gap::Short, "long" => Gap::Long });
level_text_impls!(Side { "left" => Side::Left, "right" => Side::Right });

/// One cell of the size x gap x side design. Immutable; the pool holds one
/// copy per replicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrialSpec {
    pub size: TargetSize,
    pub gap: Gap,
    pub side: Side,
}

impl TrialSpec {
    pub fn new(size: TargetSize, gap: Gap, side: Side) -> Self {
        Self { size, gap, side }
    }

    /// Pure lookup from symbolic levels to pixel geometry.
    pub fn geometry(self) -> TrialGeometry {
        TrialGeometry {
            radius: self.size.radius(),
            distance: self.gap.distance(),
            sign: self.side.sign(),
        }
    }
}

impl fmt::Display for TrialSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.size, self.gap, self.side)
    }
}

/// Numeric target geometry in an origin-centered space, x right, y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialGeometry {
    pub radius: f64,
    pub distance: f64,
    pub sign: f64,
}

impl TrialGeometry {
    /// Target center; the start position is the origin.
    pub fn center(&self) -> (f64, f64) {
        (self.distance * self.sign, 0.0)
    }

    /// Fitts amplitude A
    pub fn amplitude(&self) -> f64 {
        self.distance
    }

    /// Effective target width W (diameter)
    pub fn width(&self) -> f64 {
        2.0 * self.radius
    }
}

/// A symbolic level outside the enumerated design. The level enums make this
/// unrepresentable past the parsing boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLevel {
    level: String,
}

impl InvalidLevel {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
        }
    }
}

impl fmt::Display for InvalidLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid trial level: {:?}", self.level)
    }
}

impl std::error::Error for InvalidLevel {}
