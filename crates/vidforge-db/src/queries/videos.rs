//! Generated video queries.
//!
//! A row is inserted when a submission starts, gets its remote task id once
//! the provider accepts the job, and is closed out as succeeded or failed.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use vidforge_common::{Error, Result, TaskId, TaskStatus};

use crate::models::{NewVideo, Video};

fn parse_timestamp(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Parse a video from a database row.
///
/// Expects columns in order: id, prompt, model, duration, aspect_ratio,
/// task_id, state, file_url, error_reason, time, created_at.
fn parse_video_row(row: &rusqlite::Row) -> rusqlite::Result<Video> {
    Ok(Video {
        id: row.get(0)?,
        prompt: row.get(1)?,
        model: row.get(2)?,
        duration: row.get(3)?,
        aspect_ratio: row.get(4)?,
        task_id: row.get(5)?,
        state: row.get(6)?,
        file_url: row.get(7)?,
        error_reason: row.get(8)?,
        time: row.get(9)?,
        created_at: parse_timestamp(10, row.get(10)?)?,
    })
}

fn expect_one(changed: usize, id: i64) -> Result<()> {
    if changed == 0 {
        return Err(Error::not_found(format!("video {}", id)));
    }
    Ok(())
}

/// Insert a new video record in the `queued` state.
///
/// # Returns
///
/// * `Ok(i64)` - The row id of the inserted video
/// * `Err(Error)` - If a database error occurs
pub fn insert_video(conn: &Connection, video: &NewVideo) -> Result<i64> {
    conn.execute(
        "INSERT INTO t_video (prompt, model, duration, aspect_ratio, state, created_at)
         VALUES (:prompt, :model, :duration, :aspect_ratio, :state, :created_at)",
        rusqlite::named_params! {
            ":prompt": &video.prompt,
            ":model": &video.model,
            ":duration": video.duration,
            ":aspect_ratio": &video.aspect_ratio,
            ":state": TaskStatus::Queued.as_db_str(),
            ":created_at": Utc::now().to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(conn.last_insert_rowid())
}

/// Get a video by row id.
pub fn get_video(conn: &Connection, id: i64) -> Result<Option<Video>> {
    conn.query_row(
        "SELECT id, prompt, model, duration, aspect_ratio, task_id, state, file_url,
                error_reason, time, created_at
         FROM t_video WHERE id = :id",
        rusqlite::named_params! { ":id": id },
        parse_video_row,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Attach the provider's task id and mark the video as running.
pub fn set_task_id(conn: &Connection, id: i64, task_id: &TaskId) -> Result<()> {
    let changed = conn
        .execute(
            "UPDATE t_video SET task_id = :task_id, state = :state WHERE id = :id",
            rusqlite::named_params! {
                ":task_id": task_id.as_str(),
                ":state": TaskStatus::Running.as_db_str(),
                ":id": id,
            },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    expect_one(changed, id)
}

/// Record a finished video with its result URL and generation time.
pub fn mark_completed(conn: &Connection, id: i64, file_url: &str, time_secs: i64) -> Result<()> {
    let changed = conn
        .execute(
            "UPDATE t_video
             SET state = :state, file_url = :file_url, time = :time, error_reason = NULL
             WHERE id = :id",
            rusqlite::named_params! {
                ":state": TaskStatus::Succeeded.as_db_str(),
                ":file_url": file_url,
                ":time": time_secs,
                ":id": id,
            },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    expect_one(changed, id)
}

/// Record a failed video with the reason reported to the caller.
pub fn mark_failed(conn: &Connection, id: i64, reason: &str) -> Result<()> {
    let changed = conn
        .execute(
            "UPDATE t_video SET state = :state, error_reason = :reason WHERE id = :id",
            rusqlite::named_params! {
                ":state": TaskStatus::Failed.as_db_str(),
                ":reason": reason,
                ":id": id,
            },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    expect_one(changed, id)
}
