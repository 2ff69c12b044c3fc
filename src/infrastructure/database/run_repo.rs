//! SQLite implementation of the result cache.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::models::{
    Hardware, LogReference, OverallStatus, PlotReference, SanityModelResult, TaskResult,
    TaskStatus, TestRun,
};
use crate::domain::ports::{RunRepository, StoreError, StoredRun};

/// SQLite-backed [`RunRepository`] using sqlx.
pub struct SqliteRunRepository {
    pool: SqlitePool,
}

impl SqliteRunRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_test_run(row: &SqliteRow) -> Result<TestRun, StoreError> {
        Ok(TestRun {
            id: Uuid::parse_str(row.get::<String, _>("id").as_str())?,
            run_date: parse_date(row.get::<String, _>("run_date").as_str())?,
            hardware: row
                .get::<String, _>("hardware")
                .parse::<Hardware>()
                .map_err(StoreError::Parse)?,
            docker_image: row.get("docker_image"),
            overall_status: row
                .get::<String, _>("overall_status")
                .parse::<OverallStatus>()
                .map_err(StoreError::Parse)?,
            total_tasks: row.get("total_tasks"),
            passed_tasks: row.get("passed_tasks"),
            failed_tasks: row.get("failed_tasks"),
            unknown_tasks: row.get("unknown_tasks"),
            not_run_tasks: row.get("not_run_tasks"),
            run_timestamp: row
                .get::<Option<String>, _>("run_timestamp")
                .as_deref()
                .and_then(parse_datetime),
            created_at: parse_datetime(row.get::<String, _>("created_at").as_str())
                .ok_or_else(|| StoreError::Parse("bad created_at".to_string()))?,
            updated_at: parse_datetime(row.get::<String, _>("updated_at").as_str())
                .ok_or_else(|| StoreError::Parse("bad updated_at".to_string()))?,
        })
    }

    fn row_to_task_result(row: &SqliteRow) -> Result<(String, TaskResult), StoreError> {
        let name: String = row.get("benchmark_name");
        let result = TaskResult {
            status: row
                .get::<String, _>("status")
                .parse::<TaskStatus>()
                .map_err(StoreError::Parse)?,
            exists: row.get::<i64, _>("log_exists") != 0,
            runtime: row.get("runtime"),
            error: row.get("error_message"),
            accuracy: row.get("accuracy"),
        };
        Ok((name, result))
    }

    async fn load_children(&self, run: TestRun) -> Result<StoredRun, StoreError> {
        let run_id = run.id.to_string();

        let mut task_results = BTreeMap::new();
        let rows = sqlx::query(
            "SELECT benchmark_name, status, log_exists, runtime, error_message, accuracy
             FROM benchmark_results WHERE test_run_id = ? ORDER BY benchmark_name",
        )
        .bind(&run_id)
        .fetch_all(&self.pool)
        .await?;
        for row in &rows {
            let (name, result) = Self::row_to_task_result(row)?;
            task_results.insert(name, result);
        }

        let mut sanity_results = Vec::new();
        let rows = sqlx::query(
            "SELECT model_name, status, accuracy
             FROM sanity_check_results WHERE test_run_id = ? ORDER BY model_name",
        )
        .bind(&run_id)
        .fetch_all(&self.pool)
        .await?;
        for row in &rows {
            sanity_results.push(SanityModelResult {
                model_name: row.get("model_name"),
                status: row
                    .get::<String, _>("status")
                    .parse::<TaskStatus>()
                    .map_err(StoreError::Parse)?,
                accuracy: row.get("accuracy"),
            });
        }

        let log_references = sqlx::query(
            "SELECT kind, local_path, remote_url FROM log_references WHERE test_run_id = ?",
        )
        .bind(&run_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| LogReference {
            kind: row.get("kind"),
            local_path: row.get("local_path"),
            remote_url: row.get("remote_url"),
        })
        .collect();

        let plot_references = sqlx::query(
            "SELECT kind, local_path, remote_url FROM plot_references WHERE test_run_id = ?",
        )
        .bind(&run_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| PlotReference {
            kind: row.get("kind"),
            local_path: row.get("local_path"),
            remote_url: row.get("remote_url"),
        })
        .collect();

        Ok(StoredRun {
            run,
            task_results,
            sanity_results,
            log_references,
            plot_references,
        })
    }
}

#[async_trait]
impl RunRepository for SqliteRunRepository {
    async fn upsert_run(&self, stored: &StoredRun) -> Result<(), StoreError> {
        if !stored.run.counts_consistent() {
            return Err(StoreError::InconsistentCounts(stored.run.id));
        }

        let run = &stored.run;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"INSERT INTO test_runs (
                id, run_date, hardware, docker_image, overall_status,
                total_tasks, passed_tasks, failed_tasks, unknown_tasks, not_run_tasks,
                run_timestamp, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(run_date, hardware) DO UPDATE SET
                docker_image = excluded.docker_image,
                overall_status = excluded.overall_status,
                total_tasks = excluded.total_tasks,
                passed_tasks = excluded.passed_tasks,
                failed_tasks = excluded.failed_tasks,
                unknown_tasks = excluded.unknown_tasks,
                not_run_tasks = excluded.not_run_tasks,
                run_timestamp = excluded.run_timestamp,
                updated_at = excluded.updated_at",
        )
        .bind(run.id.to_string())
        .bind(run.run_date.format("%Y-%m-%d").to_string())
        .bind(run.hardware.as_str())
        .bind(&run.docker_image)
        .bind(run.overall_status.as_str())
        .bind(run.total_tasks)
        .bind(run.passed_tasks)
        .bind(run.failed_tasks)
        .bind(run.unknown_tasks)
        .bind(run.not_run_tasks)
        .bind(run.run_timestamp.map(|t| t.to_rfc3339()))
        .bind(run.created_at.to_rfc3339())
        .bind(run.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        // The upsert may have kept a pre-existing row's id; children must
        // attach to the canonical one.
        let run_id: String =
            sqlx::query_scalar("SELECT id FROM test_runs WHERE run_date = ? AND hardware = ?")
                .bind(run.run_date.format("%Y-%m-%d").to_string())
                .bind(run.hardware.as_str())
                .fetch_one(&mut *tx)
                .await?;

        // Children are always fully replaced, never partially updated.
        for table in [
            "benchmark_results",
            "sanity_check_results",
            "log_references",
            "plot_references",
        ] {
            sqlx::query(&format!("DELETE FROM {table} WHERE test_run_id = ?"))
                .bind(&run_id)
                .execute(&mut *tx)
                .await?;
        }

        for (name, result) in &stored.task_results {
            sqlx::query(
                "INSERT INTO benchmark_results
                     (test_run_id, benchmark_name, status, log_exists, runtime, error_message, accuracy)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&run_id)
            .bind(name)
            .bind(result.status.as_str())
            .bind(i64::from(result.exists))
            .bind(&result.runtime)
            .bind(&result.error)
            .bind(result.accuracy)
            .execute(&mut *tx)
            .await?;
        }

        for model in &stored.sanity_results {
            sqlx::query(
                "INSERT INTO sanity_check_results (test_run_id, model_name, status, accuracy)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&run_id)
            .bind(&model.model_name)
            .bind(model.status.as_str())
            .bind(model.accuracy)
            .execute(&mut *tx)
            .await?;
        }

        for reference in &stored.log_references {
            sqlx::query(
                "INSERT INTO log_references (test_run_id, kind, local_path, remote_url)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&run_id)
            .bind(&reference.kind)
            .bind(&reference.local_path)
            .bind(&reference.remote_url)
            .execute(&mut *tx)
            .await?;
        }

        for reference in &stored.plot_references {
            sqlx::query(
                "INSERT INTO plot_references (test_run_id, kind, local_path, remote_url)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&run_id)
            .bind(&reference.kind)
            .bind(&reference.local_path)
            .bind(&reference.remote_url)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(
            date = %run.run_date,
            hardware = %run.hardware,
            tasks = stored.task_results.len(),
            "run upserted"
        );
        Ok(())
    }

    async fn get_run(
        &self,
        date: NaiveDate,
        hardware: Hardware,
    ) -> Result<Option<StoredRun>, StoreError> {
        let row = sqlx::query("SELECT * FROM test_runs WHERE run_date = ? AND hardware = ?")
            .bind(date.format("%Y-%m-%d").to_string())
            .bind(hardware.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            debug!(%date, %hardware, "no cached run");
            return Ok(None);
        };
        let run = Self::row_to_test_run(&row)?;
        Ok(Some(self.load_children(run).await?))
    }

    async fn list_runs(
        &self,
        hardware: Hardware,
        since: NaiveDate,
    ) -> Result<Vec<TestRun>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM test_runs WHERE hardware = ? AND run_date >= ? ORDER BY run_date ASC",
        )
        .bind(hardware.as_str())
        .bind(since.format("%Y-%m-%d").to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_test_run).collect()
    }

    async fn list_dates(&self, hardware: Hardware) -> Result<Vec<NaiveDate>, StoreError> {
        let rows: Vec<String> = sqlx::query_scalar(
            "SELECT run_date FROM test_runs WHERE hardware = ? ORDER BY run_date ASC",
        )
        .bind(hardware.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|d| parse_date(d)).collect()
    }

    async fn delete_run(&self, date: NaiveDate, hardware: Hardware) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM test_runs WHERE run_date = ? AND hardware = ?")
            .bind(date.format("%Y-%m-%d").to_string())
            .bind(hardware.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| StoreError::Parse(format!("bad run_date {raw}: {e}")))
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
