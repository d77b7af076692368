/// One submittable action per actor per round.
///
/// The camelCase wire names (`moveForward`, `turnLeft`, ...) are the
/// protocol-level action identifiers clients submit.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum ActionKind {
    DoNothing,
    MoveForward,
    MoveBackward,
    TurnLeft,
    TurnRight,
    StandUp,
    CrouchDown,
    ReachForward,
}
