//! Up-axis specifier parsing and root orientation table.

use glam::{Quat, Vec3};

/// Which world axis the model's "up" direction maps to.
///
/// Parsed from a two-character specifier: an optional sign (`+`/`-`,
/// default `+`) and an axis letter (`X`/`Y`/`Z`, default `Y`,
/// case-insensitive). Invalid or empty specifiers fall back to `+Y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpAxis {
    PosX,
    NegX,
    #[default]
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl UpAxis {
    /// Parses a specifier, falling back to the default for anything invalid.
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim().to_ascii_uppercase();

        // At most two characters: an optional leading sign, then the axis.
        let mut chars = spec.chars();
        let (negative, axis) = match (chars.next(), chars.next(), chars.next()) {
            (Some(sign @ ('+' | '-')), axis, None) => (sign == '-', axis),
            (axis, None, None) => (false, axis),
            _ => return UpAxis::default(),
        };

        match (axis, negative) {
            (Some('X'), false) => UpAxis::PosX,
            (Some('X'), true) => UpAxis::NegX,
            (Some('Y'), false) => UpAxis::PosY,
            (Some('Y'), true) => UpAxis::NegY,
            (Some('Z'), false) => UpAxis::PosZ,
            (Some('Z'), true) => UpAxis::NegZ,
            _ => UpAxis::default(),
        }
    }

    /// The model-frame direction this axis selects.
    pub fn direction(&self) -> Vec3 {
        match self {
            UpAxis::PosX => Vec3::X,
            UpAxis::NegX => Vec3::NEG_X,
            UpAxis::PosY => Vec3::Y,
            UpAxis::NegY => Vec3::NEG_Y,
            UpAxis::PosZ => Vec3::Z,
            UpAxis::NegZ => Vec3::NEG_Z,
        }
    }

    /// Fixed rotation mapping this axis onto world +Y.
    ///
    /// One of six absolute orientations; `+Y` is the identity.
    pub fn orientation(&self) -> Quat {
        use std::f32::consts::{FRAC_PI_2, PI};
        match self {
            UpAxis::PosX => Quat::from_rotation_z(FRAC_PI_2),
            UpAxis::NegX => Quat::from_rotation_z(-FRAC_PI_2),
            UpAxis::PosY => Quat::IDENTITY,
            UpAxis::NegY => Quat::from_rotation_z(PI),
            UpAxis::PosZ => Quat::from_rotation_x(-FRAC_PI_2),
            UpAxis::NegZ => Quat::from_rotation_x(FRAC_PI_2),
        }
    }
}
