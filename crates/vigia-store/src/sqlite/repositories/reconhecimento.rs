//! Reconhecimento repository — recognition events, newest first.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::sqlite::row_types::ReconhecimentoRow;

/// Options for creating a reconhecimento.
pub struct CreateReconhecimentoOptions<'a> {
    /// Recognized moto.
    pub id_moto: i64,
    /// Capturing camera.
    pub id_camera: i64,
    /// Precision score in [0,1].
    pub precisao: f64,
    /// Captured-image path.
    pub imagem_capturada: &'a str,
    /// Minimum-confidence threshold in [0,1].
    pub confianca_minima: f64,
    /// Event timestamp; defaults to now when `None`.
    pub data_hora: Option<&'a str>,
}

/// Options for listing reconhecimentos.
#[derive(Default)]
pub struct ListReconhecimentosOptions {
    /// Filter by moto.
    pub id_moto: Option<i64>,
    /// Filter by camera.
    pub id_camera: Option<i64>,
    /// Keep only events with precisao at or above this value.
    pub precisao_min: Option<f64>,
    /// Skip results.
    pub skip: Option<i64>,
    /// Maximum results.
    pub take: Option<i64>,
}

/// Reconhecimento repository — stateless, every method takes `&Connection`.
pub struct ReconhecimentoRepo;

impl ReconhecimentoRepo {
    /// Insert a reconhecimento and return the stored row.
    pub fn create(
        conn: &Connection,
        opts: &CreateReconhecimentoOptions<'_>,
    ) -> Result<ReconhecimentoRow> {
        let data_hora = opts
            .data_hora
            .map_or_else(|| chrono::Utc::now().to_rfc3339(), String::from);
        let _ = conn.execute(
            "INSERT INTO reconhecimentos
             (id_moto, id_camera, data_hora, precisao, imagem_capturada, confianca_minima)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                opts.id_moto,
                opts.id_camera,
                data_hora,
                opts.precisao,
                opts.imagem_capturada,
                opts.confianca_minima
            ],
        )?;
        Ok(ReconhecimentoRow {
            id_reconhecimento: conn.last_insert_rowid(),
            id_moto: opts.id_moto,
            id_camera: opts.id_camera,
            data_hora,
            precisao: opts.precisao,
            imagem_capturada: opts.imagem_capturada.to_string(),
            confianca_minima: opts.confianca_minima,
        })
    }

    /// Get reconhecimento by id.
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<ReconhecimentoRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM reconhecimentos WHERE id_reconhecimento = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// List reconhecimentos with filtering, newest first.
    pub fn list(
        conn: &Connection,
        opts: &ListReconhecimentosOptions,
    ) -> Result<Vec<ReconhecimentoRow>> {
        use std::fmt::Write;
        let mut sql = String::from("SELECT * FROM reconhecimentos WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(id_moto) = opts.id_moto {
            let _ = write!(sql, " AND id_moto = ?{}", param_values.len() + 1);
            param_values.push(Box::new(id_moto));
        }
        if let Some(id_camera) = opts.id_camera {
            let _ = write!(sql, " AND id_camera = ?{}", param_values.len() + 1);
            param_values.push(Box::new(id_camera));
        }
        if let Some(min) = opts.precisao_min {
            let _ = write!(sql, " AND precisao >= ?{}", param_values.len() + 1);
            param_values.push(Box::new(min));
        }
        sql.push_str(" ORDER BY data_hora DESC, id_reconhecimento DESC");
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

    /// Overwrite a reconhecimento row in place.
    pub fn update(conn: &Connection, row: &ReconhecimentoRow) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE reconhecimentos SET id_moto = ?1, id_camera = ?2, data_hora = ?3,
             precisao = ?4, imagem_capturada = ?5, confianca_minima = ?6
             WHERE id_reconhecimento = ?7",
            params![
                row.id_moto,
                row.id_camera,
                row.data_hora,
                row.precisao,
                row.imagem_capturada,
                row.confianca_minima,
                row.id_reconhecimento
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a reconhecimento.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM reconhecimentos WHERE id_reconhecimento = ?1",
            params![id],
        )?;
        Ok(changed > 0)
    }

    /// Check if a reconhecimento exists.
    pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM reconhecimentos WHERE id_reconhecimento = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Total number of reconhecimentos.
    pub fn count(conn: &Connection) -> Result<i64> {
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM reconhecimentos", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Number of reconhecimentos referencing a moto (delete guard input).
    pub fn count_by_moto(conn: &Connection, id_moto: i64) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM reconhecimentos WHERE id_moto = ?1",
            params![id_moto],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Number of reconhecimentos referencing a camera (delete guard input).
    pub fn count_by_camera(conn: &Connection, id_camera: i64) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM reconhecimentos WHERE id_camera = ?1",
            params![id_camera],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReconhecimentoRow> {
        Ok(ReconhecimentoRow {
            id_reconhecimento: row.get("id_reconhecimento")?,
            id_moto: row.get("id_moto")?,
            id_camera: row.get("id_camera")?,
            data_hora: row.get("data_hora")?,
            precisao: row.get("precisao")?,
            imagem_capturada: row.get("imagem_capturada")?,
            confianca_minima: row.get("confianca_minima")?,
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
    use crate::sqlite::repositories::camera::{CameraRepo, CreateCameraOptions};
    use crate::sqlite::repositories::moto::{CreateMotoOptions, MotoRepo};

    fn setup() -> (Connection, i64, i64) {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        let moto = MotoRepo::create(
            &conn,
            &CreateMotoOptions {
                placa: "ABC1234",
                marca: "Honda",
                modelo: "CB 500",
                cor: "Preta",
                presente: None,
                imagem_referencia: None,
            },
        )
        .unwrap();
        let camera = CameraRepo::create(
            &conn,
            &CreateCameraOptions {
                localizacao: "Portão Principal",
                status: None,
            },
        )
        .unwrap();
        (conn, moto.id_moto, camera.id_camera)
    }

    fn create_at(
        conn: &Connection,
        id_moto: i64,
        id_camera: i64,
        precisao: f64,
        data_hora: &str,
    ) -> ReconhecimentoRow {
        ReconhecimentoRepo::create(
            conn,
            &CreateReconhecimentoOptions {
                id_moto,
                id_camera,
                precisao,
                imagem_capturada: "/capturas/x.jpg",
                confianca_minima: 0.8,
                data_hora: Some(data_hora),
            },
        )
        .unwrap()
    }

    #[test]
    fn create_defaults_data_hora_to_now() {
        let (conn, id_moto, id_camera) = setup();
        let rec = ReconhecimentoRepo::create(
            &conn,
            &CreateReconhecimentoOptions {
                id_moto,
                id_camera,
                precisao: 0.95,
                imagem_capturada: "/capturas/x.jpg",
                confianca_minima: 0.8,
                data_hora: None,
            },
        )
        .unwrap();
        assert!(!rec.data_hora.is_empty());
        let found = ReconhecimentoRepo::get_by_id(&conn, rec.id_reconhecimento)
            .unwrap()
            .unwrap();
        assert!((found.precisao - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn list_newest_first() {
        let (conn, id_moto, id_camera) = setup();
        create_at(&conn, id_moto, id_camera, 0.9, "2025-06-01T10:00:00Z");
        create_at(&conn, id_moto, id_camera, 0.8, "2025-06-02T10:00:00Z");

        let all =
            ReconhecimentoRepo::list(&conn, &ListReconhecimentosOptions::default()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].data_hora, "2025-06-02T10:00:00Z");
    }

    #[test]
    fn list_filter_by_moto_and_camera() {
        let (conn, id_moto, id_camera) = setup();
        let cam2 = CameraRepo::create(
            &conn,
            &CreateCameraOptions {
                localizacao: "Saída",
                status: None,
            },
        )
        .unwrap();
        create_at(&conn, id_moto, id_camera, 0.9, "2025-06-01T10:00:00Z");
        create_at(&conn, id_moto, cam2.id_camera, 0.8, "2025-06-01T11:00:00Z");

        let from_cam2 = ReconhecimentoRepo::list(
            &conn,
            &ListReconhecimentosOptions {
                id_camera: Some(cam2.id_camera),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(from_cam2.len(), 1);

        let for_moto = ReconhecimentoRepo::list(
            &conn,
            &ListReconhecimentosOptions {
                id_moto: Some(id_moto),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(for_moto.len(), 2);
    }

    #[test]
    fn list_filter_by_precisao_min() {
        let (conn, id_moto, id_camera) = setup();
        create_at(&conn, id_moto, id_camera, 0.72, "2025-06-01T10:00:00Z");
        create_at(&conn, id_moto, id_camera, 0.96, "2025-06-01T11:00:00Z");

        let confident = ReconhecimentoRepo::list(
            &conn,
            &ListReconhecimentosOptions {
                precisao_min: Some(0.9),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(confident.len(), 1);
        assert!((confident[0].precisao - 0.96).abs() < f64::EPSILON);
    }

    #[test]
    fn list_skip_take() {
        let (conn, id_moto, id_camera) = setup();
        for i in 1..=5 {
            create_at(
                &conn,
                id_moto,
                id_camera,
                0.9,
                &format!("2025-06-0{i}T10:00:00Z"),
            );
        }
        let page = ReconhecimentoRepo::list(
            &conn,
            &ListReconhecimentosOptions {
                skip: Some(1),
                take: Some(2),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].data_hora, "2025-06-04T10:00:00Z");
    }

    #[test]
    fn counts_by_moto_and_camera() {
        let (conn, id_moto, id_camera) = setup();
        create_at(&conn, id_moto, id_camera, 0.9, "2025-06-01T10:00:00Z");
        create_at(&conn, id_moto, id_camera, 0.8, "2025-06-02T10:00:00Z");
        assert_eq!(
            ReconhecimentoRepo::count_by_moto(&conn, id_moto).unwrap(),
            2
        );
        assert_eq!(
            ReconhecimentoRepo::count_by_camera(&conn, id_camera).unwrap(),
            2
        );
        assert_eq!(ReconhecimentoRepo::count_by_moto(&conn, 999).unwrap(), 0);
    }

    #[test]
    fn update_and_delete() {
        let (conn, id_moto, id_camera) = setup();
        let mut rec = create_at(&conn, id_moto, id_camera, 0.9, "2025-06-01T10:00:00Z");
        rec.precisao = 0.97;
        assert!(ReconhecimentoRepo::update(&conn, &rec).unwrap());

        let found = ReconhecimentoRepo::get_by_id(&conn, rec.id_reconhecimento)
            .unwrap()
            .unwrap();
        assert!((found.precisao - 0.97).abs() < f64::EPSILON);

        assert!(ReconhecimentoRepo::delete(&conn, rec.id_reconhecimento).unwrap());
        assert!(!ReconhecimentoRepo::exists(&conn, rec.id_reconhecimento).unwrap());
    }
}
