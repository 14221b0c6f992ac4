//! Camera repository.
//!
//! `ultima_verificacao` is a heartbeat column: the store layer refreshes it
//! only when an update actually changes something, so this repository just
//! persists whatever timestamp it is handed.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::sqlite::row_types::CameraRow;

/// Options for creating a camera.
pub struct CreateCameraOptions<'a> {
    /// Location label.
    pub localizacao: &'a str,
    /// Free-text status; defaults to "ativo" when `None`.
    pub status: Option<&'a str>,
}

/// Options for listing cameras.
#[derive(Default)]
pub struct ListCamerasOptions<'a> {
    /// Filter by status (case-insensitive exact match).
    pub status: Option<&'a str>,
    /// Skip results.
    pub skip: Option<i64>,
    /// Maximum results.
    pub take: Option<i64>,
}

/// Camera repository — stateless, every method takes `&Connection`.
pub struct CameraRepo;

impl CameraRepo {
    /// Insert a camera and return the stored row.
    pub fn create(conn: &Connection, opts: &CreateCameraOptions<'_>) -> Result<CameraRow> {
        let status = opts.status.unwrap_or("ativo");
        let now = chrono::Utc::now().to_rfc3339();
        let _ = conn.execute(
            "INSERT INTO cameras (localizacao, status, ultima_verificacao)
             VALUES (?1, ?2, ?3)",
            params![opts.localizacao, status, now],
        )?;
        Ok(CameraRow {
            id_camera: conn.last_insert_rowid(),
            localizacao: opts.localizacao.to_string(),
            status: status.to_string(),
            ultima_verificacao: now,
        })
    }

    /// Get camera by id.
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<CameraRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM cameras WHERE id_camera = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// List cameras with filtering, ordered by id.
    pub fn list(conn: &Connection, opts: &ListCamerasOptions<'_>) -> Result<Vec<CameraRow>> {
        use std::fmt::Write;
        let mut sql = String::from("SELECT * FROM cameras WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(status) = opts.status {
            let _ = write!(
                sql,
                " AND LOWER(status) = LOWER(?{})",
                param_values.len() + 1
            );
            param_values.push(Box::new(status.to_string()));
        }
        sql.push_str(" ORDER BY id_camera ASC");
        if opts.skip.is_some() || opts.take.is_some() {
            let _ = write!(
                sql,
                " LIMIT {} OFFSET {}",
                opts.take.unwrap_or(-1),
                opts.skip.unwrap_or(0)
            );
        }

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(Box::as_ref).collect();
        let rows = stmt
            .query_map(params_refs.as_slice(), Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Overwrite a camera row in place.
    pub fn update(conn: &Connection, row: &CameraRow) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE cameras SET localizacao = ?1, status = ?2, ultima_verificacao = ?3
             WHERE id_camera = ?4",
            params![
                row.localizacao,
                row.status,
                row.ultima_verificacao,
                row.id_camera
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a camera.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let changed = conn.execute("DELETE FROM cameras WHERE id_camera = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Check if a camera exists.
    pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM cameras WHERE id_camera = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Total number of cameras.
    pub fn count(conn: &Connection) -> Result<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM cameras", [], |row| row.get(0))?;
        Ok(count)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CameraRow> {
        Ok(CameraRow {
            id_camera: row.get("id_camera")?,
            localizacao: row.get("localizacao")?,
            status: row.get("status")?,
            ultima_verificacao: row.get("ultima_verificacao")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::sqlite::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn create_defaults_status_ativo() {
        let conn = setup();
        let cam = CameraRepo::create(
            &conn,
            &CreateCameraOptions {
                localizacao: "Portão Principal",
                status: None,
            },
        )
        .unwrap();
        assert_eq!(cam.status, "ativo");
        assert!(!cam.ultima_verificacao.is_empty());
    }

    #[test]
    fn list_filter_by_status() {
        let conn = setup();
        CameraRepo::create(
            &conn,
            &CreateCameraOptions {
                localizacao: "Portão Principal",
                status: None,
            },
        )
        .unwrap();
        CameraRepo::create(
            &conn,
            &CreateCameraOptions {
                localizacao: "Saída de Emergência",
                status: Some("manutencao"),
            },
        )
        .unwrap();

        let ativos = CameraRepo::list(
            &conn,
            &ListCamerasOptions {
                status: Some("ATIVO"),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(ativos.len(), 1);
        assert_eq!(ativos[0].localizacao, "Portão Principal");
    }

    #[test]
    fn list_skip_take() {
        let conn = setup();
        for i in 1..=4 {
            CameraRepo::create(
                &conn,
                &CreateCameraOptions {
                    localizacao: &format!("Setor {i}"),
                    status: None,
                },
            )
            .unwrap();
        }
        let page = CameraRepo::list(
            &conn,
            &ListCamerasOptions {
                skip: Some(2),
                take: Some(1),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].localizacao, "Setor 3");
    }

    #[test]
    fn update_persists_handed_timestamp() {
        let conn = setup();
        let mut cam = CameraRepo::create(
            &conn,
            &CreateCameraOptions {
                localizacao: "Portão Principal",
                status: None,
            },
        )
        .unwrap();
        cam.status = "inativo".to_string();
        cam.ultima_verificacao = "2025-06-01T12:00:00Z".to_string();
        assert!(CameraRepo::update(&conn, &cam).unwrap());

        let found = CameraRepo::get_by_id(&conn, cam.id_camera).unwrap().unwrap();
        assert_eq!(found.status, "inativo");
        assert_eq!(found.ultima_verificacao, "2025-06-01T12:00:00Z");
    }

    #[test]
    fn delete_and_exists() {
        let conn = setup();
        let cam = CameraRepo::create(
            &conn,
            &CreateCameraOptions {
                localizacao: "Portão Principal",
                status: None,
            },
        )
        .unwrap();
        assert!(CameraRepo::exists(&conn, cam.id_camera).unwrap());
        assert!(CameraRepo::delete(&conn, cam.id_camera).unwrap());
        assert!(!CameraRepo::exists(&conn, cam.id_camera).unwrap());
    }
}
