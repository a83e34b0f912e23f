//! Per-request tracing metadata attached to outgoing gateway calls.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";
pub const REQUEST_TIMESTAMP_HEADER: &str = "x-request-timestamp";

const CORRELATION_PREFIX: &str = "req-";
const RANDOM_LEN: usize = 6;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Headers stamped on one outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub correlation_id: String,
    pub timestamp: String,
}

impl RequestMeta {
    pub fn now() -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            correlation_id: correlation_id_at(now),
            timestamp: now.format(&Rfc3339).unwrap_or_default(),
        }
    }
}

/// `req-<base36 unix millis>-<6 random base36 chars>`.
pub fn correlation_id_at(at: OffsetDateTime) -> String {
    let millis = u128::try_from(at.unix_timestamp_nanos() / 1_000_000).unwrap_or_default();
    let random = to_base36(Uuid::new_v4().as_u128());
    let suffix: String = random.chars().rev().take(RANDOM_LEN).collect();
    format!("{CORRELATION_PREFIX}{}-{suffix}", to_base36(millis))
}

/// True when `value` has the shape produced by [`correlation_id_at`].
pub fn is_correlation_id(value: &str) -> bool {
    let Some(rest) = value.strip_prefix(CORRELATION_PREFIX) else {
        return false;
    };
    let Some((stamp, random)) = rest.split_once('-') else {
        return false;
    };
    let is_base36 = |part: &str| part.bytes().all(|byte| BASE36.contains(&byte));
    !stamp.is_empty() && is_base36(stamp) && random.len() == RANDOM_LEN && is_base36(random)
}

fn to_base36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
