//! SQLite-based inquiry storage

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use rusqlite_migration::{M, Migrations};

use super::traits::InquiryStore;
use crate::models::{
    InquiryThread, Message, MessageId, Notification, NotificationId, SenderRole, ThreadId,
    ThreadStatus, UserId,
};

/// Database migrations
///
/// Each migration is applied in order. The user_version pragma tracks which
/// migrations have been applied.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // Migration 1: Initial schema
        M::up(
            r#"
            -- Inquiry threads
            CREATE TABLE threads (
                id TEXT PRIMARY KEY,
                owner_user_id TEXT NOT NULL,
                subject TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'open',
                created_at TEXT NOT NULL,
                last_message_at TEXT NOT NULL
            );

            CREATE INDEX idx_threads_owner ON threads(owner_user_id);
            CREATE INDEX idx_threads_status
                ON threads(status, last_message_at DESC);

            -- Messages with zstd-compressed bodies
            CREATE TABLE messages (
                id TEXT PRIMARY KEY,
                thread_id TEXT NOT NULL,
                sender_role TEXT NOT NULL,
                body BLOB NOT NULL,  -- zstd compressed
                is_read INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY (thread_id) REFERENCES threads(id) ON DELETE CASCADE
            );

            CREATE INDEX idx_messages_thread_id ON messages(thread_id);
            CREATE INDEX idx_messages_read_state
                ON messages(thread_id, sender_role, is_read);

            -- Standalone notifications
            CREATE TABLE notifications (
                id TEXT PRIMARY KEY,
                recipient_user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                data TEXT NOT NULL DEFAULT 'null',
                is_read INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE INDEX idx_notifications_recipient
                ON notifications(recipient_user_id, is_read);
            "#,
        ),
    ])
}

/// SQLite-based inquiry storage
///
/// Holds queryable metadata in SQLite; message bodies are compressed
/// before they hit the BLOB column. The two read-state mutations run as
/// single conditional UPDATE statements, so concurrent duplicate
/// invocations converge without any application-level locking.
pub struct SqliteInquiryStore {
    conn: Mutex<Connection>,
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .unwrap_or_else(|_| chrono::Utc::now())
}

impl SqliteInquiryStore {
    /// Create a new SQLite inquiry store
    ///
    /// - `db_path`: Path to the SQLite database file
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(db_path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", db_path.as_ref()))?;

        // WAL keeps concurrent readers alive during the bulk read-state
        // flip; foreign_keys must be ON for the thread -> message CASCADE.
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            "#,
        )?;

        migrations()
            .to_latest(&mut conn)
            .context("Failed to run database migrations")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn thread_from_parts(
        id: String,
        owner_user_id: String,
        subject: String,
        status: String,
        created_at: String,
        last_message_at: String,
    ) -> Result<InquiryThread> {
        Ok(InquiryThread {
            id: ThreadId::new(id),
            owner_user_id: UserId::new(owner_user_id),
            subject,
            status: status.parse::<ThreadStatus>()?,
            created_at: parse_datetime(&created_at),
            last_message_at: parse_datetime(&last_message_at),
        })
    }

    fn message_from_parts(
        id: String,
        thread_id: String,
        sender_role: String,
        body_compressed: Vec<u8>,
        is_read: bool,
        created_at: String,
    ) -> Result<Message> {
        let body_bytes =
            zstd::decode_all(body_compressed.as_slice()).context("Failed to decompress body")?;
        let body = String::from_utf8_lossy(&body_bytes).into_owned();

        Ok(Message {
            id: MessageId::new(id),
            thread_id: ThreadId::new(thread_id),
            sender_role: sender_role.parse::<SenderRole>()?,
            body,
            is_read,
            created_at: parse_datetime(&created_at),
        })
    }

    fn notification_from_parts(
        id: String,
        recipient_user_id: String,
        title: String,
        body: String,
        data_json: String,
        is_read: bool,
        created_at: String,
    ) -> Notification {
        Notification {
            id: NotificationId::new(id),
            recipient_user_id: UserId::new(recipient_user_id),
            title,
            body,
            data: serde_json::from_str(&data_json).unwrap_or(serde_json::Value::Null),
            is_read,
            created_at: parse_datetime(&created_at),
        }
    }
}

impl InquiryStore for SqliteInquiryStore {
    fn upsert_thread(&self, thread: InquiryThread) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        // ON CONFLICT DO UPDATE rather than INSERT OR REPLACE: the latter
        // deletes the old row first, which would CASCADE away the thread's
        // messages.
        conn.execute(
            "INSERT INTO threads
             (id, owner_user_id, subject, status, created_at, last_message_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                owner_user_id = excluded.owner_user_id,
                subject = excluded.subject,
                status = excluded.status,
                created_at = excluded.created_at,
                last_message_at = excluded.last_message_at",
            params![
                thread.id.as_str(),
                thread.owner_user_id.as_str(),
                thread.subject,
                thread.status.as_str(),
                thread.created_at.to_rfc3339(),
                thread.last_message_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn get_thread(&self, id: &ThreadId) -> Result<Option<InquiryThread>> {
        let conn = self.conn.lock().unwrap();

        let row: Option<(String, String, String, String, String, String)> = conn
            .query_row(
                "SELECT id, owner_user_id, subject, status, created_at, last_message_at
                 FROM threads WHERE id = ?",
                [id.as_str()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, owner, subject, status, created_at, last_message_at)) = row else {
            return Ok(None);
        };

        Ok(Some(Self::thread_from_parts(
            id,
            owner,
            subject,
            status,
            created_at,
            last_message_at,
        )?))
    }

    fn has_thread(&self, id: &ThreadId) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM threads WHERE id = ?",
            [id.as_str()],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    fn set_thread_status(&self, id: &ThreadId, status: ThreadStatus) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE threads SET status = ? WHERE id = ?",
            params![status.as_str(), id.as_str()],
        )?;
        Ok(())
    }

    fn list_open_threads(&self) -> Result<Vec<InquiryThread>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, owner_user_id, subject, status, created_at, last_message_at
             FROM threads
             WHERE status = 'open'
             ORDER BY last_message_at DESC",
        )?;

        let rows: Vec<(String, String, String, String, String, String)> = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, owner, subject, status, created_at, last_message_at)| {
                Self::thread_from_parts(id, owner, subject, status, created_at, last_message_at)
            })
            .collect()
    }

    fn list_threads_for_owner(&self, owner: &UserId) -> Result<Vec<InquiryThread>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, owner_user_id, subject, status, created_at, last_message_at
             FROM threads
             WHERE owner_user_id = ?
             ORDER BY last_message_at DESC",
        )?;

        let rows: Vec<(String, String, String, String, String, String)> = stmt
            .query_map([owner.as_str()], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, owner, subject, status, created_at, last_message_at)| {
                Self::thread_from_parts(id, owner, subject, status, created_at, last_message_at)
            })
            .collect()
    }

    fn count_threads(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM threads", [], |row| row.get(0))?;

        Ok(count as usize)
    }

    fn upsert_message(&self, message: Message) -> Result<()> {
        // Level 3 keeps compression cheap for short inquiry bodies
        let body_compressed =
            zstd::encode_all(message.body.as_bytes(), 3).context("Failed to compress body")?;

        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO messages
             (id, thread_id, sender_role, body, is_read, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                thread_id = excluded.thread_id,
                sender_role = excluded.sender_role,
                body = excluded.body,
                is_read = excluded.is_read,
                created_at = excluded.created_at",
            params![
                message.id.as_str(),
                message.thread_id.as_str(),
                message.sender_role.as_str(),
                body_compressed,
                message.is_read,
                message.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn get_message(&self, id: &MessageId) -> Result<Option<Message>> {
        let conn = self.conn.lock().unwrap();

        let row: Option<(String, String, String, Vec<u8>, bool, String)> = conn
            .query_row(
                "SELECT id, thread_id, sender_role, body, is_read, created_at
                 FROM messages WHERE id = ?",
                [id.as_str()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, thread_id, sender_role, body, is_read, created_at)) = row else {
            return Ok(None);
        };

        Ok(Some(Self::message_from_parts(
            id,
            thread_id,
            sender_role,
            body,
            is_read,
            created_at,
        )?))
    }

    fn list_messages_for_thread(&self, thread_id: &ThreadId) -> Result<Vec<Message>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, thread_id, sender_role, body, is_read, created_at
             FROM messages WHERE thread_id = ? ORDER BY created_at ASC",
        )?;

        let rows: Vec<(String, String, String, Vec<u8>, bool, String)> = stmt
            .query_map([thread_id.as_str()], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, thread_id, sender_role, body, is_read, created_at)| {
                Self::message_from_parts(id, thread_id, sender_role, body, is_read, created_at)
            })
            .collect()
    }

    fn count_messages_in_thread(&self, thread_id: &ThreadId) -> Result<usize> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE thread_id = ?",
            [thread_id.as_str()],
            |row| row.get(0),
        )?;

        Ok(count as usize)
    }

    fn unread_count_in_thread(
        &self,
        thread_id: &ThreadId,
        sender_role: SenderRole,
    ) -> Result<usize> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM messages
             WHERE thread_id = ? AND sender_role = ? AND is_read = 0",
            params![thread_id.as_str(), sender_role.as_str()],
            |row| row.get(0),
        )?;

        Ok(count as usize)
    }

    fn mark_messages_read(&self, thread_id: &ThreadId, sender_role: SenderRole) -> Result<usize> {
        let conn = self.conn.lock().unwrap();

        // The whole flip is one conditional UPDATE; SQLite applies it
        // atomically, so duplicate concurrent triggers cannot interleave
        // partial states.
        let flipped = conn.execute(
            "UPDATE messages SET is_read = 1
             WHERE thread_id = ? AND sender_role = ? AND is_read = 0",
            params![thread_id.as_str(), sender_role.as_str()],
        )?;

        Ok(flipped)
    }

    fn upsert_notification(&self, notification: Notification) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        let data_json = serde_json::to_string(&notification.data)?;

        conn.execute(
            "INSERT INTO notifications
             (id, recipient_user_id, title, body, data, is_read, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                recipient_user_id = excluded.recipient_user_id,
                title = excluded.title,
                body = excluded.body,
                data = excluded.data,
                is_read = excluded.is_read,
                created_at = excluded.created_at",
            params![
                notification.id.as_str(),
                notification.recipient_user_id.as_str(),
                notification.title,
                notification.body,
                data_json,
                notification.is_read,
                notification.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn get_notification(&self, id: &NotificationId) -> Result<Option<Notification>> {
        let conn = self.conn.lock().unwrap();

        let row: Option<(String, String, String, String, String, bool, String)> = conn
            .query_row(
                "SELECT id, recipient_user_id, title, body, data, is_read, created_at
                 FROM notifications WHERE id = ?",
                [id.as_str()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.map(|(id, recipient, title, body, data, is_read, created_at)| {
            Self::notification_from_parts(id, recipient, title, body, data, is_read, created_at)
        }))
    }

    fn mark_notification_read(&self, id: &NotificationId) -> Result<Option<Notification>> {
        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE id = ? AND is_read = 0",
                [id.as_str()],
            )?;
        }

        self.get_notification(id)
    }

    fn list_notifications_for_user(&self, user: &UserId) -> Result<Vec<Notification>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, recipient_user_id, title, body, data, is_read, created_at
             FROM notifications
             WHERE recipient_user_id = ?
             ORDER BY created_at DESC",
        )?;

        let rows: Vec<(String, String, String, String, String, bool, String)> = stmt
            .query_map([user.as_str()], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|(id, recipient, title, body, data, is_read, created_at)| {
                Self::notification_from_parts(id, recipient, title, body, data, is_read, created_at)
            })
            .collect())
    }

    fn count_unread_notifications(&self, user: &UserId) -> Result<usize> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM notifications
             WHERE recipient_user_id = ? AND is_read = 0",
            [user.as_str()],
            |row| row.get(0),
        )?;

        Ok(count as usize)
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            "DELETE FROM messages;
             DELETE FROM threads;
             DELETE FROM notifications;",
        )?;

        Ok(())
    }
}
