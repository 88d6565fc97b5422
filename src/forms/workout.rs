use serde::Deserialize;

/// Body of workout create and update requests. A workout has no client settable
/// attributes, so any JSON object is accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkoutForm {}
