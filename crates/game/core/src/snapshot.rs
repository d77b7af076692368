use crate::action::ActionKind;

/// Read-only projection of one actor's view, sent after a mid-game join,
/// after every accepted submission, and after every resolved round.
///
/// Only the actor's own narrative and scalar status cross this boundary; the
/// grid, other actors' positions, inventories, and pending actions never
/// leave the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct StateSnapshot {
    pub rounds_remaining: u32,

    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub selected_action: Option<ActionKind>,

    pub is_standing: bool,

    /// Turn segments in order, each an ordered list of event strings.
    pub timeline_events: Vec<Vec<String>>,
}
