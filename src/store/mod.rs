pub mod models;

use anyhow::{Context as _, Result};
use models::{AdminRoleMap, ChannelMap, IntervalMap, LastSeen};
use poise::serenity_prelude as serenity;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::sources::Source;

const CHANNEL_FILE: &str = "channel_config.json";
const INTERVAL_FILE: &str = "interval_config.json";
const ADMIN_ROLE_FILE: &str = "admin_roles.json";

fn cursor_file(source: Source) -> String {
    format!("last_seen_{}.json", source.key())
}

/// Flat-file JSON config store. Every read and write is a synchronous
/// whole-file operation under one critical section, so no cooperative task
/// can observe a half-written file.
pub struct ConfigStore {
    dir: PathBuf,
    io_lock: Mutex<()>,
}

impl ConfigStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
        Ok(Self {
            dir,
            io_lock: Mutex::new(()),
        })
    }

    pub fn channel_for(
        &self,
        guild: serenity::GuildId,
        source: Source,
    ) -> Result<Option<serenity::ChannelId>> {
        let _guard = self.io_lock.lock().unwrap();
        let map: ChannelMap = self.read_json(CHANNEL_FILE)?;
        Ok(map
            .get(&guild.to_string())
            .and_then(|channels| channels.get(source.key()))
            .map(|&id| serenity::ChannelId::new(id)))
    }

    pub fn set_channel(
        &self,
        guild: serenity::GuildId,
        source: Source,
        channel: serenity::ChannelId,
    ) -> Result<()> {
        let _guard = self.io_lock.lock().unwrap();
        let mut map: ChannelMap = self.read_json(CHANNEL_FILE)?;
        map.entry(guild.to_string())
            .or_default()
            .insert(source.key().to_string(), channel.get());
        self.write_json(CHANNEL_FILE, &map)
    }

    /// All configured `source key -> channel id` entries for one guild.
    pub fn guild_channels(&self, guild: serenity::GuildId) -> Result<BTreeMap<String, u64>> {
        let _guard = self.io_lock.lock().unwrap();
        let map: ChannelMap = self.read_json(CHANNEL_FILE)?;
        Ok(map.get(&guild.to_string()).cloned().unwrap_or_default())
    }

    pub fn admin_role(&self, guild: serenity::GuildId) -> Result<Option<serenity::RoleId>> {
        let _guard = self.io_lock.lock().unwrap();
        let map: AdminRoleMap = self.read_json(ADMIN_ROLE_FILE)?;
        Ok(map
            .get(&guild.to_string())
            .map(|&id| serenity::RoleId::new(id)))
    }

    pub fn set_admin_role(&self, guild: serenity::GuildId, role: serenity::RoleId) -> Result<()> {
        let _guard = self.io_lock.lock().unwrap();
        let mut map: AdminRoleMap = self.read_json(ADMIN_ROLE_FILE)?;
        map.insert(guild.to_string(), role.get());
        self.write_json(ADMIN_ROLE_FILE, &map)
    }

    /// Returns whether a role was actually configured.
    pub fn remove_admin_role(&self, guild: serenity::GuildId) -> Result<bool> {
        let _guard = self.io_lock.lock().unwrap();
        let mut map: AdminRoleMap = self.read_json(ADMIN_ROLE_FILE)?;
        let removed = map.remove(&guild.to_string()).is_some();
        if removed {
            self.write_json(ADMIN_ROLE_FILE, &map)?;
        }
        Ok(removed)
    }

    /// Stored interval for a source, falling back to the source default.
    pub fn interval_for(&self, source: Source) -> Result<u64> {
        let _guard = self.io_lock.lock().unwrap();
        let map: IntervalMap = self.read_json(INTERVAL_FILE)?;
        Ok(map
            .get(source.key())
            .copied()
            .unwrap_or_else(|| source.default_interval_secs()))
    }

    pub fn set_interval(&self, source: Source, seconds: u64) -> Result<()> {
        let _guard = self.io_lock.lock().unwrap();
        let mut map: IntervalMap = self.read_json(INTERVAL_FILE)?;
        map.insert(source.key().to_string(), seconds);
        self.write_json(INTERVAL_FILE, &map)
    }

    /// Last delivered item id for a source, if any tick has completed yet.
    pub fn cursor(&self, source: Source) -> Result<Option<String>> {
        let _guard = self.io_lock.lock().unwrap();
        let file = cursor_file(source);
        let path = self.dir.join(&file);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let last: LastSeen = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(last.last_post_id))
    }

    pub fn set_cursor(&self, source: Source, post_id: &str) -> Result<()> {
        let _guard = self.io_lock.lock().unwrap();
        self.write_json(
            &cursor_file(source),
            &LastSeen {
                last_post_id: post_id.to_string(),
            },
        )
    }

    fn read_json<T>(&self, file: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(T::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Write to a temp sibling, then rename over the target.
    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file);
        let tmp = path.with_extension("tmp");
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, ConfigStore) {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::open(tmp.path()).unwrap();
        (tmp, store)
    }

    fn guild(id: u64) -> serenity::GuildId {
        serenity::GuildId::new(id)
    }

    #[test]
    fn unconfigured_channel_is_none() {
        let (_tmp, store) = open_store();
        let channel = store.channel_for(guild(1), Source::Meme).unwrap();
        assert!(channel.is_none());
    }

    #[test]
    fn channel_roundtrip_keeps_other_entries() {
        let (_tmp, store) = open_store();
        store
            .set_channel(guild(1), Source::Meme, serenity::ChannelId::new(10))
            .unwrap();
        store
            .set_channel(guild(1), Source::Quote, serenity::ChannelId::new(11))
            .unwrap();
        store
            .set_channel(guild(2), Source::Meme, serenity::ChannelId::new(20))
            .unwrap();

        assert_eq!(
            store.channel_for(guild(1), Source::Meme).unwrap(),
            Some(serenity::ChannelId::new(10))
        );
        assert_eq!(
            store.channel_for(guild(1), Source::Quote).unwrap(),
            Some(serenity::ChannelId::new(11))
        );
        assert_eq!(
            store.channel_for(guild(2), Source::Meme).unwrap(),
            Some(serenity::ChannelId::new(20))
        );
        assert!(store.channel_for(guild(2), Source::Quote).unwrap().is_none());
    }

    #[test]
    fn guild_channels_lists_configured_sources() {
        let (_tmp, store) = open_store();
        store
            .set_channel(guild(1), Source::Insta, serenity::ChannelId::new(30))
            .unwrap();
        let channels = store.guild_channels(guild(1)).unwrap();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels.get("insta"), Some(&30));
        assert!(store.guild_channels(guild(2)).unwrap().is_empty());
    }

    #[test]
    fn interval_defaults_until_set() {
        let (_tmp, store) = open_store();
        assert_eq!(store.interval_for(Source::Meme).unwrap(), 21_600);
        assert_eq!(store.interval_for(Source::MangaChapter).unwrap(), 1_800);

        store.set_interval(Source::Meme, 5_400).unwrap();
        assert_eq!(store.interval_for(Source::Meme).unwrap(), 5_400);
        assert_eq!(store.interval_for(Source::Quote).unwrap(), 21_600);
    }

    #[test]
    fn cursor_roundtrip() {
        let (_tmp, store) = open_store();
        assert!(store.cursor(Source::Insta).unwrap().is_none());

        store.set_cursor(Source::Insta, "post-123").unwrap();
        assert_eq!(
            store.cursor(Source::Insta).unwrap().as_deref(),
            Some("post-123")
        );

        // Cursors are per source.
        assert!(store.cursor(Source::Meme).unwrap().is_none());
    }

    #[test]
    fn admin_role_roundtrip() {
        let (_tmp, store) = open_store();
        assert!(store.admin_role(guild(1)).unwrap().is_none());

        store
            .set_admin_role(guild(1), serenity::RoleId::new(77))
            .unwrap();
        assert_eq!(
            store.admin_role(guild(1)).unwrap(),
            Some(serenity::RoleId::new(77))
        );

        assert!(store.remove_admin_role(guild(1)).unwrap());
        assert!(!store.remove_admin_role(guild(1)).unwrap());
        assert!(store.admin_role(guild(1)).unwrap().is_none());
    }

    #[test]
    fn rewrite_leaves_no_temp_file() {
        let (tmp, store) = open_store();
        store
            .set_channel(guild(1), Source::Meme, serenity::ChannelId::new(10))
            .unwrap();
        store
            .set_channel(guild(1), Source::Meme, serenity::ChannelId::new(12))
            .unwrap();

        assert!(tmp.path().join("channel_config.json").exists());
        assert!(!tmp.path().join("channel_config.tmp").exists());
        assert_eq!(
            store.channel_for(guild(1), Source::Meme).unwrap(),
            Some(serenity::ChannelId::new(12))
        );
    }
}
