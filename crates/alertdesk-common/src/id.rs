//! 告警 ID 分配
//!
//! Alert ids are snowflake values written out in decimal. The worker identity
//! is fixed by whichever comes first: [`init`] or the first [`next_id`].

use snowflake::SnowflakeIdBucket;
use std::sync::{Mutex, OnceLock, PoisonError};

const DEFAULT_MACHINE_ID: i32 = 1;
const DEFAULT_NODE_ID: i32 = 1;

static BUCKET: OnceLock<Mutex<SnowflakeIdBucket>> = OnceLock::new();

/// 设置本进程的 worker 标识（`machine_id` / `node_id` 取值 0-31）。
///
/// Returns `false` when the bucket already exists; the earlier identity stays.
pub fn init(machine_id: i32, node_id: i32) -> bool {
    let mut created = false;
    BUCKET.get_or_init(|| {
        created = true;
        Mutex::new(SnowflakeIdBucket::new(machine_id, node_id))
    });
    created
}

/// 分配下一个告警 ID
pub fn next_id() -> String {
    let bucket = BUCKET.get_or_init(|| {
        Mutex::new(SnowflakeIdBucket::new(DEFAULT_MACHINE_ID, DEFAULT_NODE_ID))
    });
    let mut bucket = bucket.lock().unwrap_or_else(PoisonError::into_inner);
    bucket.get_id().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_distinct_positive_decimals() {
        init(DEFAULT_MACHINE_ID, DEFAULT_NODE_ID);
        let ids: HashSet<i64> = (0..2000)
            .map(|_| next_id().parse().expect("decimal id"))
            .collect();
        assert_eq!(ids.len(), 2000);
        assert!(ids.iter().all(|id| *id > 0));
    }

    #[test]
    fn late_init_keeps_existing_bucket() {
        next_id();
        assert!(!init(7, 7));
    }
}
