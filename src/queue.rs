use crate::error::AppError;

pub const RANKED_SOLO: i32 = 420;
pub const RANKED_FLEX: i32 = 440;

/// The two ranked queues we track; everything else is ignored.
pub const RANKED_QUEUES: [i32; 2] = [RANKED_SOLO, RANKED_FLEX];

/// Stable queue names used as keys in persisted snapshot files.
pub fn name(queue_id: i32) -> &'static str {
    match queue_id {
        RANKED_SOLO => "RANKED_SOLO_5x5",
        RANKED_FLEX => "RANKED_FLEX_SR",
        _ => "UNKNOWN",
    }
}

pub fn from_name(queue_name: &str) -> Option<i32> {
    match queue_name {
        "RANKED_SOLO_5x5" => Some(RANKED_SOLO),
        "RANKED_FLEX_SR" => Some(RANKED_FLEX),
        _ => None,
    }
}

pub fn from_cli(arg: &str) -> Result<i32, AppError> {
    match arg.to_lowercase().as_str() {
        "solo" | "soloq" => Ok(RANKED_SOLO),
        "flex" => Ok(RANKED_FLEX),
        other => Err(AppError::UnknownQueue(other.to_string())),
    }
}
