use super::{Db, models::*};
use rusqlite::{OptionalExtension, Result, params};

impl Db {
    /// Record the outcome of an application attempt, replacing any earlier one.
    pub fn mark_applied(&self, job_id: &str, status: &str, notes: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO applications (job_id, status, notes) VALUES (?, ?, ?)",
            params![job_id, status, notes],
        )?;
        Ok(())
    }

    /// Whether any application record exists for this job.
    pub fn is_applied(&self, job_id: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM applications WHERE job_id = ? LIMIT 1",
                params![job_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn get_application(&self, job_id: &str) -> Result<Option<ApplicationRecord>> {
        self.conn
            .query_row(
                "SELECT job_id, status, applied_at, notes FROM applications WHERE job_id = ?",
                params![job_id],
                |row| {
                    Ok(ApplicationRecord {
                        job_id: row.get(0)?,
                        status: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        applied_at: row.get(2)?,
                        notes: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    })
                },
            )
            .optional()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_query() {
        let db = Db::open_in_memory().unwrap();
        assert!(!db.is_applied("job-1").unwrap());

        db.mark_applied("job-1", STATUS_SUBMITTED, "via linkedin").unwrap();
        assert!(db.is_applied("job-1").unwrap());

        let rec = db.get_application("job-1").unwrap().unwrap();
        assert_eq!(rec.status, "submitted");
        assert_eq!(rec.notes, "via linkedin");
    }

    #[test]
    fn test_mark_applied_replaces() {
        let db = Db::open_in_memory().unwrap();
        db.mark_applied("job-1", STATUS_PREPARED, "").unwrap();
        db.mark_applied("job-1", STATUS_SUBMITTED, "second try").unwrap();

        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM applications", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(db.get_application("job-1").unwrap().unwrap().status, "submitted");
    }
}
