//! # Position target field masks
//!
//! `SET_POSITION_TARGET_LOCAL_NED` carries a `type_mask` where each set bit tells the autopilot
//! to *ignore* the corresponding field. [`FieldMask`] provides named masks for every supported
//! intent, each of them marking exactly one group of fields as valid.
//!
//! Fields that are ignored by the mask are filled with [`IGNORED`] instead of zero, so they can't
//! be mistaken for a real zero position or velocity.

use std::fmt::{Debug, Formatter};

/// Value placed into numeric fields that are ignored according to [`FieldMask`].
pub const IGNORED: f32 = f32::NAN;

/// Numeric field of a position target.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u16)]
pub enum TargetField {
    /// Position X.
    X = 0x0001,
    /// Position Y.
    Y = 0x0002,
    /// Position Z.
    Z = 0x0004,
    /// Velocity X.
    Vx = 0x0008,
    /// Velocity Y.
    Vy = 0x0010,
    /// Velocity Z.
    Vz = 0x0020,
    /// Acceleration X.
    Ax = 0x0040,
    /// Acceleration Y.
    Ay = 0x0080,
    /// Acceleration Z.
    Az = 0x0100,
    /// Yaw.
    Yaw = 0x0400,
    /// Yaw rate.
    YawRate = 0x0800,
}

impl TargetField {
    /// All position target fields.
    pub const ALL: [TargetField; 11] = [
        TargetField::X,
        TargetField::Y,
        TargetField::Z,
        TargetField::Vx,
        TargetField::Vy,
        TargetField::Vz,
        TargetField::Ax,
        TargetField::Ay,
        TargetField::Az,
        TargetField::Yaw,
        TargetField::YawRate,
    ];

    /// Bit that marks this field as ignored.
    #[inline(always)]
    pub fn ignore_bit(self) -> u16 {
        self as u16
    }
}

/// Type mask of a position target.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FieldMask(u16);

impl FieldMask {
    /// Only `x`, `y`, `z` are valid.
    pub const USE_POSITION: FieldMask = FieldMask(0x0DF8);
    /// Only `vx`, `vy`, `vz` are valid.
    pub const USE_VELOCITY: FieldMask = FieldMask(0x0DC7);
    /// Only `yaw` is valid.
    pub const USE_YAW: FieldMask = FieldMask(0x09FF);

    /// Raw `type_mask` bits.
    #[inline(always)]
    pub fn bits(&self) -> u16 {
        self.0
    }

    /// Returns `true` if `field` is marked as valid.
    #[inline]
    pub fn is_valid(&self, field: TargetField) -> bool {
        self.0 & field.ignore_bit() == 0
    }
}

impl Debug for FieldMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FieldMask")
            .field(&format_args!("{:#06x}", self.0))
            .finish()
    }
}
