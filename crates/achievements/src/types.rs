//! Normalized achievement record.

use serde::{Deserialize, Serialize};

/// One unlockable in-game event.
///
/// Field order matters: the emulator's settings files carry the fields in
/// exactly this order, and serde serializes in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    /// Human-readable description; empty when the achievement is hidden.
    pub description: String,

    /// Human-readable label.
    #[serde(rename = "displayName")]
    pub display_name: String,

    /// True iff the source marks the achievement as spoiler-hidden.
    /// Stored as 0/1 on disk.
    #[serde(with = "int_bool")]
    pub hidden: bool,

    /// Relative path to the unlocked-state image (`images/<basename>`).
    pub icon: String,

    /// Relative path to the locked-state image. Equals `icon` when the
    /// source provides only one image per achievement.
    pub icongray: String,

    /// Stable machine identifier, unique within a title. Synthetic
    /// `ach{N}` ordinals when the source exposes no identifier.
    pub name: String,
}

/// Serializes a bool as the 0/1 integers the emulator reads.
mod int_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(deserializer)? != 0)
    }
}
