use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `{guild_id: {source_key: channel_id}}`
pub type ChannelMap = BTreeMap<String, BTreeMap<String, u64>>;

/// `{guild_id: role_id}`
pub type AdminRoleMap = BTreeMap<String, u64>;

/// `{source_key: seconds}`; intervals are global per source, not per guild.
pub type IntervalMap = BTreeMap<String, u64>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastSeen {
    pub last_post_id: String,
}
