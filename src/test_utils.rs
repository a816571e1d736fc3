//! Shared test utilities for the homelab bot.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        encryption::TokenCipher,
        monitoring::system::{DiskStats, LoadAverage, MemoryStats, SystemSnapshot},
        projects,
        provisioning::ChannelProvider,
    },
    entities,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::collections::HashSet;
use std::sync::Mutex;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Cipher with a fixed test passphrase.
#[allow(clippy::unwrap_used)]
pub fn test_cipher() -> TokenCipher {
    TokenCipher::from_passphrase("test-passphrase").unwrap()
}

/// Creates a test project with sensible defaults.
///
/// # Defaults
/// * `description`: `"Test project"`
/// * `created_by`: `"test_user"`
pub async fn create_test_project(
    db: &DatabaseConnection,
    guild_id: &str,
    name: &str,
) -> Result<entities::project::Model> {
    projects::create_project(db, guild_id, name, "Test project", "test_user").await
}

/// Host snapshot with the given CPU usage, 50% memory and 40% disk usage.
pub fn sample_snapshot(cpu_percent: f64) -> SystemSnapshot {
    SystemSnapshot {
        cpu_percent,
        memory: MemoryStats {
            total_bytes: 8 * 1024 * 1024 * 1024,
            available_bytes: 4 * 1024 * 1024 * 1024,
        },
        disk: DiskStats {
            filesystem: "/dev/sda1".to_string(),
            mount: "/".to_string(),
            total_bytes: 100 * 1024 * 1024 * 1024,
            used_bytes: 40 * 1024 * 1024 * 1024,
            available_bytes: 60 * 1024 * 1024 * 1024,
        },
        load: LoadAverage {
            one: 0.5,
            five: 0.4,
            fifteen: 0.3,
        },
        uptime_secs: 3600,
        top_processes: Vec::new(),
    }
}

#[derive(Debug, Default)]
struct FakeGuild {
    next_id: u64,
    live: HashSet<u64>,
    created: Vec<String>,
}

/// In-memory guild used to test provisioning without Discord.
#[derive(Debug, Default)]
pub struct FakeChannels {
    guild: Mutex<FakeGuild>,
}

impl FakeChannels {
    /// Names of every channel and category created so far, in order.
    #[allow(clippy::unwrap_used)]
    pub fn created_names(&self) -> Vec<String> {
        self.guild.lock().unwrap().created.clone()
    }

    /// Simulates someone deleting a channel by hand.
    #[allow(clippy::unwrap_used)]
    pub fn delete(&self, id: u64) {
        self.guild.lock().unwrap().live.remove(&id);
    }

    fn create(&self, name: &str) -> Result<u64> {
        let mut guild = self.guild.lock().map_err(|e| Error::Provisioning {
            message: e.to_string(),
        })?;
        guild.next_id += 1;
        let id = 1000 + guild.next_id;
        guild.live.insert(id);
        guild.created.push(name.to_string());
        Ok(id)
    }
}

impl ChannelProvider for FakeChannels {
    async fn existing_channel_ids(&self) -> Result<HashSet<u64>> {
        let guild = self.guild.lock().map_err(|e| Error::Provisioning {
            message: e.to_string(),
        })?;
        Ok(guild.live.clone())
    }

    async fn create_category(&self, name: &str) -> Result<u64> {
        self.create(name)
    }

    async fn create_text_channel(&self, name: &str, _parent: Option<u64>) -> Result<u64> {
        self.create(name)
    }
}
