//! SQLite-backed store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::application::errors::StorageError;
use crate::domain::entities::{GuildId, MessageId, ReactionKey, Restriction, RoleId, UserId};
use crate::domain::traits::Store;

/// Store backed by a single SQLite connection.
///
/// Every operation takes the connection lock for its whole duration, and
/// multi-statement writes run inside one transaction, so the reconciliation
/// timer and the event path never observe a half-applied change.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

// Snowflakes fit in 63 bits, so the casts below are lossless.
fn sql_id(id: u64) -> i64 {
    id as i64
}

fn to_time(secs: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| StorageError::InvalidRecord(format!("timestamp out of range: {}", secs)))
}

struct RestrictionRow {
    id: i64,
    guild: i64,
    user: i64,
    start: i64,
    end: i64,
}

impl RestrictionRow {
    const COLUMNS: &'static str = "id, guild_id, user_id, starts_at, ends_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            guild: row.get(1)?,
            user: row.get(2)?,
            start: row.get(3)?,
            end: row.get(4)?,
        })
    }

    fn into_restriction(self) -> Result<Restriction, StorageError> {
        Ok(Restriction {
            id: self.id,
            guild: GuildId(self.guild as u64),
            user: UserId(self.user as u64),
            start: to_time(self.start)?,
            end: to_time(self.end)?,
        })
    }
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        let store = Self { conn: Mutex::new(conn) };
        store.init_tables()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    fn init_tables(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS restrictions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                starts_at INTEGER NOT NULL,
                ends_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS restriction_roles (
                restriction_id INTEGER NOT NULL,
                role_id INTEGER NOT NULL,
                PRIMARY KEY (restriction_id, role_id),
                FOREIGN KEY (restriction_id) REFERENCES restrictions(id)
            );

            CREATE TABLE IF NOT EXISTS user_links (
                guild_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                PRIMARY KEY (guild_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS bans (
                user_id INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS auto_roles (
                message_id INTEGER NOT NULL,
                reaction TEXT NOT NULL,
                role_id INTEGER NOT NULL,
                PRIMARY KEY (message_id, reaction)
            );

            CREATE TABLE IF NOT EXISTS points (
                guild_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                points REAL NOT NULL DEFAULT 0,
                PRIMARY KEY (guild_id, user_id)
            );

            CREATE INDEX IF NOT EXISTS idx_restrictions_end ON restrictions(ends_at);
            CREATE INDEX IF NOT EXISTS idx_restrictions_member ON restrictions(user_id, guild_id);",
        )?;
        Ok(())
    }

    /// Number of guild links recorded for a user
    pub fn link_count(&self, user: UserId) -> Result<usize, StorageError> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM user_links WHERE user_id = ?1",
            [sql_id(user.get())],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn expiring_restrictions(&self) -> Result<Vec<Restriction>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM restrictions WHERE ends_at <= ?1 ORDER BY ends_at",
            RestrictionRow::COLUMNS
        ))?;
        let rows = stmt.query_map([Utc::now().timestamp()], RestrictionRow::from_row)?;

        let mut due = Vec::new();
        for row in rows {
            due.push(row?.into_restriction()?);
        }
        Ok(due)
    }

    async fn remove_restriction(&self, restriction: &Restriction) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM restriction_roles WHERE restriction_id = ?1", [restriction.id])?;
        tx.execute("DELETE FROM restrictions WHERE id = ?1", [restriction.id])?;
        tx.commit()?;
        Ok(())
    }

    async fn role_ids_for(&self, restriction: &Restriction) -> Result<Vec<RoleId>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT role_id FROM restriction_roles WHERE restriction_id = ?1 ORDER BY role_id",
        )?;
        let rows = stmt.query_map([restriction.id], |row| row.get::<_, i64>(0))?;

        let mut roles = Vec::new();
        for role in rows {
            roles.push(RoleId(role? as u64));
        }
        Ok(roles)
    }

    async fn find_mute(&self, user: UserId, guild: GuildId) -> Result<Option<Restriction>, StorageError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM restrictions WHERE user_id = ?1 AND guild_id = ?2 ORDER BY ends_at DESC LIMIT 1",
                    RestrictionRow::COLUMNS
                ),
                params![sql_id(user.get()), sql_id(guild.get())],
                RestrictionRow::from_row,
            )
            .optional()?;
        row.map(RestrictionRow::into_restriction).transpose()
    }

    async fn add_restriction(
        &self,
        guild: GuildId,
        user: UserId,
        end: DateTime<Utc>,
        roles: &[RoleId],
    ) -> Result<Restriction, StorageError> {
        let start = Utc::now();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO restrictions (guild_id, user_id, starts_at, ends_at) VALUES (?1, ?2, ?3, ?4)",
            params![sql_id(guild.get()), sql_id(user.get()), start.timestamp(), end.timestamp()],
        )?;
        let id = tx.last_insert_rowid();
        for role in roles {
            tx.execute(
                "INSERT OR IGNORE INTO restriction_roles (restriction_id, role_id) VALUES (?1, ?2)",
                params![id, sql_id(role.get())],
            )?;
        }
        tx.commit()?;

        Ok(Restriction {
            id,
            guild,
            user,
            start: to_time(start.timestamp())?,
            end: to_time(end.timestamp())?,
        })
    }

    async fn add_link(&self, guild: GuildId, user: UserId) -> Result<(), StorageError> {
        self.conn()?.execute(
            "INSERT OR IGNORE INTO user_links (guild_id, user_id) VALUES (?1, ?2)",
            params![sql_id(guild.get()), sql_id(user.get())],
        )?;
        Ok(())
    }

    async fn banned(&self, user: UserId) -> Result<bool, StorageError> {
        let found = self
            .conn()?
            .query_row(
                "SELECT 1 FROM bans WHERE user_id = ?1",
                [sql_id(user.get())],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    async fn set_banned(&self, user: UserId, banned: bool) -> Result<(), StorageError> {
        let sql = if banned {
            "INSERT OR IGNORE INTO bans (user_id) VALUES (?1)"
        } else {
            "DELETE FROM bans WHERE user_id = ?1"
        };
        self.conn()?.execute(sql, [sql_id(user.get())])?;
        Ok(())
    }

    async fn auto_role(&self, message: MessageId, reaction: &ReactionKey) -> Result<Option<RoleId>, StorageError> {
        let role = self
            .conn()?
            .query_row(
                "SELECT role_id FROM auto_roles WHERE message_id = ?1 AND reaction = ?2",
                params![sql_id(message.get()), reaction.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(role.map(|r| RoleId(r as u64)))
    }

    async fn add_auto_role(&self, message: MessageId, reaction: &ReactionKey, role: RoleId) -> Result<(), StorageError> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO auto_roles (message_id, reaction, role_id) VALUES (?1, ?2, ?3)",
            params![sql_id(message.get()), reaction.as_str(), sql_id(role.get())],
        )?;
        Ok(())
    }

    async fn add_points(&self, guild: GuildId, user: UserId, points: f64) -> Result<f64, StorageError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO points (guild_id, user_id, points) VALUES (?1, ?2, ?3)
             ON CONFLICT (guild_id, user_id) DO UPDATE SET points = points + excluded.points",
            params![sql_id(guild.get()), sql_id(user.get()), points],
        )?;
        let total = conn.query_row(
            "SELECT points FROM points WHERE guild_id = ?1 AND user_id = ?2",
            params![sql_id(guild.get()), sql_id(user.get())],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    async fn points(&self, guild: GuildId, user: UserId) -> Result<f64, StorageError> {
        let total = self
            .conn()?
            .query_row(
                "SELECT points FROM points WHERE guild_id = ?1 AND user_id = ?2",
                params![sql_id(guild.get()), sql_id(user.get())],
                |row| row.get(0),
            )
            .optional()?;
        Ok(total.unwrap_or(0.0))
    }
}
