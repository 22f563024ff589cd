use mass_properties::{CenterOfMass, Inertia, MassProperties};

use crate::description::{
    JointDescription, JointLimits, LinkDescription, Origin, RobotDescription,
};

fn rod(mass: f64, length: f64) -> MassProperties<f64> {
    let i = mass * length * length / 12.0;
    MassProperties::new(
        mass,
        CenterOfMass::new(length / 2.0, 0.0, 0.0),
        Inertia::new(1e-4, i, i, 0.0, 0.0, 0.0).unwrap(),
    )
    .unwrap()
}

/// Single revolute link about y with its center of mass `length` along x.
pub fn pendulum(mass: f64, length: f64) -> RobotDescription {
    RobotDescription::new("pendulum")
        .with_link(LinkDescription::root("pivot"))
        .with_link(
            LinkDescription::new(
                "rod",
                "pivot",
                JointDescription::revolute([0.0, 1.0, 0.0], Origin::default()),
            )
            .with_inertial(
                MassProperties::new(
                    mass,
                    CenterOfMass::new(length, 0.0, 0.0),
                    Inertia::new(0.001, 0.01, 0.01, 0.0, 0.0, 0.0).unwrap(),
                )
                .unwrap(),
            ),
        )
}

/// Planar chain in the xy plane with a massless tip frame at the end of link2.
pub fn two_link(l1: f64, l2: f64) -> RobotDescription {
    let z = [0.0, 0.0, 1.0];
    RobotDescription::new("two_link")
        .with_link(LinkDescription::root("base"))
        .with_link(
            LinkDescription::new("link1", "base", JointDescription::revolute(z, Origin::default()))
                .with_inertial(rod(1.0, l1)),
        )
        .with_link(
            LinkDescription::new(
                "link2",
                "link1",
                JointDescription::revolute(z, Origin::new([l1, 0.0, 0.0], [0.0; 3])),
            )
            .with_inertial(rod(1.0, l2)),
        )
        .with_link(LinkDescription::new(
            "tip",
            "link2",
            JointDescription::fixed(Origin::new([l2, 0.0, 0.0], [0.0; 3])),
        ))
}

/// A tree with two branches off the torso, a prismatic joint, a tilted axis and a fixed sensor.
pub fn branched() -> RobotDescription {
    RobotDescription::new("branched")
        .with_link(LinkDescription::root("base"))
        .with_link(
            LinkDescription::new(
                "torso",
                "base",
                JointDescription::revolute([0.0, 0.0, 1.0], Origin::new([0.0, 0.0, 0.2], [0.0; 3]))
                    .with_damping(0.3)
                    .with_limits(JointLimits {
                        lower: -3.0,
                        upper: 3.0,
                        velocity: 1.5,
                        effort: 40.0,
                    }),
            )
            .with_inertial(
                MassProperties::new(
                    3.0,
                    CenterOfMass::new(0.0, 0.0, 0.25),
                    Inertia::new(0.05, 0.05, 0.02, 0.0, 0.0, 0.0).unwrap(),
                )
                .unwrap(),
            ),
        )
        .with_link(
            LinkDescription::new(
                "left",
                "torso",
                JointDescription::revolute([0.0, 1.0, 0.0], Origin::new([0.0, 0.2, 0.5], [0.0; 3]))
                    .with_damping(0.1),
            )
            .with_inertial(rod(1.0, 0.5)),
        )
        .with_link(
            LinkDescription::new(
                "left_tip",
                "left",
                JointDescription::prismatic([1.0, 0.0, 0.0], Origin::new([0.5, 0.0, 0.0], [0.0; 3]))
                    .with_damping(0.4),
            )
            .with_inertial(
                MassProperties::new(
                    0.5,
                    CenterOfMass::new(0.05, 0.0, 0.0),
                    Inertia::new(0.001, 0.002, 0.002, 0.0, 0.0, 0.0).unwrap(),
                )
                .unwrap(),
            ),
        )
        .with_link(
            LinkDescription::new(
                "right",
                "torso",
                JointDescription::revolute(
                    [1.0, 1.0, 0.0],
                    Origin::new([0.0, -0.2, 0.5], [0.1, 0.2, 0.3]),
                ),
            )
            .with_inertial(
                MassProperties::new(
                    1.2,
                    CenterOfMass::new(0.1, -0.05, 0.2),
                    Inertia::new(0.01, 0.012, 0.008, 0.001, -0.0005, 0.0002).unwrap(),
                )
                .unwrap(),
            ),
        )
        .with_link(
            LinkDescription::new(
                "camera",
                "torso",
                JointDescription::fixed(Origin::new([0.1, 0.0, 0.6], [0.0, 0.5, 0.0])),
            )
            .with_inertial(
                MassProperties::new(
                    0.2,
                    CenterOfMass::new(0.02, 0.0, 0.0),
                    Inertia::new(0.0002, 0.0002, 0.0002, 0.0, 0.0, 0.0).unwrap(),
                )
                .unwrap(),
            ),
        )
}

pub fn arm() -> RobotDescription {
    RobotDescription::from_ron_str(include_str!("../tests/data/arm.ron")).unwrap()
}
