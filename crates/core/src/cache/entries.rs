//! Cached entry CRUD operations.
//!
//! Entries are request → response pairs inside a named store. A put for an
//! existing request overwrites it; entries are never expired individually.

use std::fmt;
use std::str::FromStr;

use super::connection::CacheDb;
use super::hash::compute_request_key;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// How a response relates to the origin that requested it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin response; the only kind that is ever cached.
    Basic,
    /// Cross-origin response with readable body.
    Cors,
    /// Cross-origin response with hidden status and body.
    Opaque,
    /// Network error placeholder.
    Error,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Basic => "basic",
            ResponseType::Cors => "cors",
            ResponseType::Opaque => "opaque",
            ResponseType::Error => "error",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(ResponseType::Basic),
            "cors" => Ok(ResponseType::Cors),
            "opaque" => Ok(ResponseType::Opaque),
            "error" => Ok(ResponseType::Error),
            other => Err(Error::CorruptEntry(format!("unknown response type: {other}"))),
        }
    }
}

/// A captured response keyed by the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub method: String,
    pub url: String,
    pub status_code: u16,
    pub status_text: Option<String>,
    pub response_type: ResponseType,
    /// Header name/value pairs in response order.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub cached_at: String,
}

impl CachedResponse {
    /// Exact-match key for this entry's request.
    pub fn key(&self) -> String {
        compute_request_key(&self.method, &self.url)
    }
}

fn insert_entry(conn: &rusqlite::Connection, store: &str, entry: &CachedResponse) -> Result<(), Error> {
    let headers_json = serde_json::to_string(&entry.headers)?;
    conn.execute(
        "INSERT INTO cache_entries (
            store, key_hash, method, url, status_code, status_text,
            response_type, headers_json, body, cached_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(store, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status_code = excluded.status_code,
            status_text = excluded.status_text,
            response_type = excluded.response_type,
            headers_json = excluded.headers_json,
            body = excluded.body,
            cached_at = excluded.cached_at",
        params![
            store,
            entry.key(),
            &entry.method,
            &entry.url,
            entry.status_code as i64,
            &entry.status_text,
            entry.response_type.as_str(),
            headers_json,
            &entry.body,
            &entry.cached_at,
        ],
    )?;
    Ok(())
}

fn ensure_store(conn: &rusqlite::Connection, store: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
        params![store, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

impl CacheDb {
    /// Insert or overwrite one entry, creating the store if absent.
    pub async fn put_entry(&self, store: &str, entry: &CachedResponse) -> Result<(), Error> {
        let store = store.to_string();
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_store(&tx, &store)?;
                insert_entry(&tx, &store, &entry)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or overwrite a batch of entries in one transaction.
    ///
    /// Either every entry is written or none is.
    pub async fn put_entries(&self, store: &str, entries: Vec<CachedResponse>) -> Result<(), Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_store(&tx, &store)?;
                for entry in &entries {
                    insert_entry(&tx, &store, entry)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an entry by exact request match.
    ///
    /// Returns None if the store or the entry doesn't exist.
    pub async fn match_entry(&self, store: &str, method: &str, url: &str) -> Result<Option<CachedResponse>, Error> {
        let store = store.to_string();
        let key_hash = compute_request_key(method, url);
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url, status_code, status_text, response_type,
                            headers_json, body, cached_at
                     FROM cache_entries WHERE store = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![store, key_hash], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, Vec<u8>>(6)?,
                        row.get::<_, String>(7)?,
                    ))
                });

                let (method, url, status_code, status_text, response_type, headers_json, body, cached_at) =
                    match result {
                        Ok(row) => row,
                        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                        Err(e) => return Err(e.into()),
                    };

                let status_code = u16::try_from(status_code)
                    .map_err(|_| Error::CorruptEntry(format!("status code out of range: {status_code}")))?;

                Ok(Some(CachedResponse {
                    method,
                    url,
                    status_code,
                    status_text,
                    response_type: response_type.parse()?,
                    headers: serde_json::from_str(&headers_json)?,
                    body,
                    cached_at,
                }))
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries held by a store.
    pub async fn entry_count(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM cache_entries WHERE store = ?1", params![store], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Request URLs held by a store, in insertion order.
    pub async fn entry_urls(&self, store: &str) -> Result<Vec<String>, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM cache_entries WHERE store = ?1 ORDER BY rowid ASC")?;
                let urls = stmt
                    .query_map(params![store], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }
}
