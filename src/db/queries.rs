use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Intent, NumberedResult, ScheduledEvent, SearchResult, StoredSearch};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

fn parse_naive(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

// ── Searches ──

/// Store a search and its results. Results are numbered from 1 in the given order.
pub fn save_search(
    conn: &Connection,
    id: &str,
    query: &str,
    intent: &Intent,
    results: &[SearchResult],
) -> anyhow::Result<()> {
    let intent_json = serde_json::to_string(intent)?;
    let now = format_utc(&Utc::now());

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO searches (id, query, intent, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, query, intent_json, now],
    )?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO search_results (search_id, position, title, url, preview_text, source)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for (i, result) in results.iter().enumerate() {
            stmt.execute(params![
                id,
                (i + 1) as i64,
                result.title,
                result.url,
                result.preview_text,
                result.source,
            ])?;
        }
    }

    tx.commit()?;
    Ok(())
}

pub fn get_search(conn: &Connection, id: &str) -> anyhow::Result<Option<StoredSearch>> {
    let result = conn.query_row(
        "SELECT id, query, intent, created_at FROM searches WHERE id = ?1",
        params![id],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        },
    );

    match result {
        Ok((id, query, intent_json, created_at)) => {
            let intent = serde_json::from_str(&intent_json).unwrap_or(serde_json::json!({}));
            let results = get_search_results(conn, &id)?;
            Ok(Some(StoredSearch {
                id,
                query,
                intent,
                created_at,
                results,
            }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_search_results(conn: &Connection, search_id: &str) -> anyhow::Result<Vec<NumberedResult>> {
    let mut stmt = conn.prepare(
        "SELECT position, title, url, preview_text, source
         FROM search_results WHERE search_id = ?1 ORDER BY position ASC",
    )?;

    let rows = stmt.query_map(params![search_id], |row| {
        Ok(NumberedResult {
            number: row.get::<_, i64>(0)? as usize,
            result: SearchResult {
                title: row.get(1)?,
                url: row.get(2)?,
                preview_text: row.get(3)?,
                source: row.get(4)?,
            },
        })
    })?;

    let mut results = vec![];
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Result `number` (1-based) of a stored search.
pub fn get_search_result(
    conn: &Connection,
    search_id: &str,
    number: usize,
) -> anyhow::Result<Option<SearchResult>> {
    let result = conn.query_row(
        "SELECT title, url, preview_text, source
         FROM search_results WHERE search_id = ?1 AND position = ?2",
        params![search_id, number as i64],
        |row| {
            Ok(SearchResult {
                title: row.get(0)?,
                url: row.get(1)?,
                preview_text: row.get(2)?,
                source: row.get(3)?,
            })
        },
    );

    match result {
        Ok(r) => Ok(Some(r)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Scheduled events ──

pub fn insert_scheduled_event(conn: &Connection, event: &ScheduledEvent) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO scheduled_events (id, calendar_event_id, summary, start_time, end_time, search_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.id,
            event.calendar_event_id,
            event.summary,
            format_utc(&event.start),
            format_utc(&event.end),
            event.search_id,
            event.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// Most recently created first.
pub fn list_scheduled_events(conn: &Connection, limit: i64) -> anyhow::Result<Vec<ScheduledEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, calendar_event_id, summary, start_time, end_time, search_id, created_at
         FROM scheduled_events ORDER BY created_at DESC, start_time DESC LIMIT ?1",
    )?;

    let rows = stmt.query_map(params![limit], |row| {
        let start: String = row.get(3)?;
        let end: String = row.get(4)?;
        let created_at: String = row.get(6)?;
        Ok(ScheduledEvent {
            id: row.get(0)?,
            calendar_event_id: row.get(1)?,
            summary: row.get(2)?,
            start: parse_naive(&start).and_utc(),
            end: parse_naive(&end).and_utc(),
            search_id: row.get(5)?,
            created_at: parse_naive(&created_at),
        })
    })?;

    let mut events = vec![];
    for row in rows {
        events.push(row?);
    }
    Ok(events)
}
