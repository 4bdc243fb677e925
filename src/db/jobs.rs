use super::{Db, models::*};
use rusqlite::{OptionalExtension, Result, params};

impl Db {
    /// Record a listing the first time it is seen.
    ///
    /// Returns `true` when a new row was written; later writers with the same
    /// id are silently ignored.
    pub fn upsert_job(&self, job: &JobPost) -> Result<bool> {
        let rows = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO jobs (id, title, company, location, url, source)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                job.job_id,
                job.title,
                job.company,
                job.location,
                job.url,
                job.source
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn get_job(&self, job_id: &str) -> Result<Option<JobRecord>> {
        self.conn
            .query_row(
                "SELECT id, title, company, location, url, source, created_at FROM jobs WHERE id = ?",
                params![job_id],
                row_to_job,
            )
            .optional()
    }

    /// Most recently recorded jobs first.
    pub fn list_jobs(&self, limit: usize) -> Result<Vec<JobRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, company, location, url, source, created_at FROM jobs ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )?;
        let rows = stmt.query_map(params![limit as i64], row_to_job)?;
        rows.collect()
    }

    pub fn count_jobs(&self) -> Result<usize> {
        self.conn
            .query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))
    }
}

fn row_to_job(row: &rusqlite::Row<'_>) -> Result<JobRecord> {
    Ok(JobRecord {
        id: row.get(0)?,
        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        company: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        location: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        url: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        source: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        created_at: row.get(6)?,
    })
}
