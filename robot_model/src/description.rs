use mass_properties::MassProperties;
use ron::{
    from_str,
    ser::{PrettyConfig, to_string_pretty},
};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescriptionErrors {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse RON: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to write RON: {0}")]
    Serialize(#[from] ron::Error),
}

fn default_gravity() -> [f64; 3] {
    [0.0, 0.0, -9.81]
}

fn default_axis() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}

/// The ordered list of links making up a robot.
/// The first link is the fixed base, every parent is listed before its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotDescription {
    pub name: String,
    #[serde(default = "default_gravity")]
    pub gravity: [f64; 3],
    pub links: Vec<LinkDescription>,
}

impl RobotDescription {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            gravity: default_gravity(),
            links: Vec::new(),
        }
    }

    pub fn with_gravity(mut self, gravity: [f64; 3]) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_link(mut self, link: LinkDescription) -> Self {
        self.links.push(link);
        self
    }

    pub fn from_ron_str(s: &str) -> Result<Self, DescriptionErrors> {
        Ok(from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, DescriptionErrors> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_ron_str(&contents)
    }

    pub fn save(&self, path: &Path) -> Result<(), DescriptionErrors> {
        let ron_string = to_string_pretty(self, PrettyConfig::new())?;
        let mut file = File::create(path)?;
        file.write_all(ron_string.as_bytes())?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDescription {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// The joint connecting this link to its parent.
    #[serde(default)]
    pub joint: JointDescription,
    #[serde(default)]
    pub inertial: MassProperties<f64>,
}

impl LinkDescription {
    pub fn root(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            joint: JointDescription::default(),
            inertial: MassProperties::default(),
        }
    }

    pub fn new(name: &str, parent: &str, joint: JointDescription) -> Self {
        Self {
            name: name.to_string(),
            parent: Some(parent.to_string()),
            joint,
            inertial: MassProperties::default(),
        }
    }

    pub fn with_inertial(mut self, inertial: MassProperties<f64>) -> Self {
        self.inertial = inertial;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointKind {
    #[default]
    Fixed,
    Revolute,
    Prismatic,
}

/// Pose of the joint frame in the parent link frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    #[serde(default)]
    pub xyz: [f64; 3],
    /// Fixed axis roll, pitch, yaw in radians.
    #[serde(default)]
    pub rpy: [f64; 3],
}

impl Origin {
    pub fn new(xyz: [f64; 3], rpy: [f64; 3]) -> Self {
        Self { xyz, rpy }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    pub lower: f64,
    pub upper: f64,
    pub velocity: f64,
    pub effort: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointDescription {
    #[serde(default)]
    pub kind: JointKind,
    #[serde(default = "default_axis")]
    pub axis: [f64; 3],
    #[serde(default)]
    pub origin: Origin,
    #[serde(default)]
    pub damping: f64,
    #[serde(default)]
    pub limits: Option<JointLimits>,
}

impl Default for JointDescription {
    fn default() -> Self {
        Self::fixed(Origin::default())
    }
}

impl JointDescription {
    pub fn fixed(origin: Origin) -> Self {
        Self {
            kind: JointKind::Fixed,
            axis: default_axis(),
            origin,
            damping: 0.0,
            limits: None,
        }
    }

    pub fn revolute(axis: [f64; 3], origin: Origin) -> Self {
        Self {
            kind: JointKind::Revolute,
            axis,
            ..Self::fixed(origin)
        }
    }

    pub fn prismatic(axis: [f64; 3], origin: Origin) -> Self {
        Self {
            kind: JointKind::Prismatic,
            axis,
            ..Self::fixed(origin)
        }
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_limits(mut self, limits: JointLimits) -> Self {
        self.limits = Some(limits);
        self
    }
}
