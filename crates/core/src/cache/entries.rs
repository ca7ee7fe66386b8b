//! Generation and entry operations on the SQLite store.

use super::connection::CacheDb;
use super::hash::request_key;
use crate::{Error, Request, Response};
use chrono::Utc;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

const RESPONSE_COLUMNS: &str = "e.response_url, e.status, e.content_type, e.headers_json, e.body";

fn read_response(row: &rusqlite::Row<'_>) -> rusqlite::Result<Response> {
    let headers_json: String = row.get(3)?;
    let headers = serde_json::from_str(&headers_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e)))?;
    Ok(Response {
        url: row.get(0)?,
        status: row.get(1)?,
        content_type: row.get(2)?,
        headers,
        body: row.get(4)?,
    })
}

/// A request/response pair prepared for insertion.
struct EntryRow {
    request_key: String,
    method: String,
    url: String,
    response: Response,
    headers_json: String,
}

impl EntryRow {
    fn new(request: &Request, response: &Response) -> Result<Self, Error> {
        if !request.is_cacheable() {
            return Err(Error::InvalidInput(format!("cannot store {} request for {}", request.method, request.url)));
        }
        let headers_json = serde_json::to_string(&response.headers)
            .map_err(|e| Error::InvalidInput(format!("failed to encode headers: {e}")))?;
        Ok(Self {
            request_key: request_key(request),
            method: request.method.clone(),
            url: request.url.to_string(),
            response: response.clone(),
            headers_json,
        })
    }
}

impl CacheDb {
    /// Create the named generation if it does not exist yet.
    pub async fn open_generation(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let created_at = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
                    params![name, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store every pair in one transaction, creating the generation if needed.
    ///
    /// Either all pairs are written or none are. Existing entries for the same
    /// request are replaced.
    pub async fn put_entries(&self, name: &str, pairs: &[(Request, Response)]) -> Result<(), Error> {
        let rows = pairs
            .iter()
            .map(|(req, resp)| EntryRow::new(req, resp))
            .collect::<Result<Vec<_>, _>>()?;
        let name = name.to_string();
        let now = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO entries (
                            generation, request_key, method, url, response_url,
                            status, content_type, headers_json, body, stored_at
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                        ON CONFLICT(generation, request_key) DO UPDATE SET
                            response_url = excluded.response_url,
                            status = excluded.status,
                            content_type = excluded.content_type,
                            headers_json = excluded.headers_json,
                            body = excluded.body,
                            stored_at = excluded.stored_at",
                    )?;
                    for row in &rows {
                        stmt.execute(params![
                            name,
                            row.request_key,
                            row.method,
                            row.url,
                            row.response.url,
                            row.response.status,
                            row.response.content_type,
                            row.headers_json,
                            row.response.body,
                            now,
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a request in one generation.
    pub async fn match_entry(&self, name: &str, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_cacheable() {
            return Ok(None);
        }
        let name = name.to_string();
        let key = request_key(request);
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let sql = format!("SELECT {RESPONSE_COLUMNS} FROM entries e WHERE e.generation = ?1 AND e.request_key = ?2");
                let found = conn.query_row(&sql, params![name, key], read_response).optional()?;
                Ok(found)
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a request across all generations, oldest generation first.
    pub async fn match_any_entry(&self, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_cacheable() {
            return Ok(None);
        }
        let key = request_key(request);
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let sql = format!(
                    "SELECT {RESPONSE_COLUMNS} FROM entries e
                     JOIN generations g ON g.name = e.generation
                     WHERE e.request_key = ?1
                     ORDER BY g.rowid ASC LIMIT 1"
                );
                let found = conn.query_row(&sql, params![key], read_response).optional()?;
                Ok(found)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a generation and all of its entries.
    ///
    /// Returns false if no generation had that name.
    pub async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM entries WHERE generation = ?1", params![name])?;
                let deleted = tx.execute("DELETE FROM generations WHERE name = ?1", params![name])?;
                tx.commit()?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of all generations in creation order.
    pub async fn generation_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations ORDER BY rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Request URLs stored in a generation, in insertion order.
    pub async fn entry_urls(&self, name: &str) -> Result<Vec<String>, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM entries WHERE generation = ?1 ORDER BY rowid ASC")?;
                let urls = stmt
                    .query_map(params![name], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }
}
