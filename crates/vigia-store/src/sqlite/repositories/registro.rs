//! Registro repository — entry/exit registrations with joined display fields.
//!
//! Reads return [`RegistroDetail`], which carries the moto plate, the usuario
//! name, and (for automatic registrations) the source camera location and
//! precision. The reconhecimento joins are LEFT JOINs since manual
//! registrations have no reconhecimento.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::sqlite::row_types::{RegistroDetail, RegistroRow};

/// Options for creating a registro.
pub struct CreateRegistroOptions<'a> {
    /// Registered moto.
    pub id_moto: i64,
    /// Registering usuario.
    pub id_usuario: i64,
    /// Associated reconhecimento (None for manual registrations).
    pub id_reconhecimento: Option<i64>,
    /// "entrada" or "saida".
    pub tipo: &'a str,
    /// "automatico" or "manual".
    pub modo_registro: &'a str,
    /// Registration timestamp; defaults to now when `None`.
    pub data_hora: Option<&'a str>,
}

/// Options for listing registros.
#[derive(Default)]
pub struct ListRegistrosOptions<'a> {
    /// Filter by moto.
    pub id_moto: Option<i64>,
    /// Filter by usuario.
    pub id_usuario: Option<i64>,
    /// Filter by kind ("entrada"/"saida").
    pub tipo: Option<&'a str>,
    /// Filter by mode ("automatico"/"manual").
    pub modo_registro: Option<&'a str>,
    /// Skip results.
    pub skip: Option<i64>,
    /// Maximum results.
    pub take: Option<i64>,
}

const DETAIL_SELECT: &str = "SELECT r.id_registro, r.id_moto, m.placa AS moto_placa,
       r.id_usuario, u.nome AS usuario_nome,
       r.id_reconhecimento, c.localizacao AS reconhecimento_camera_localizacao,
       rec.precisao AS reconhecimento_precisao,
       r.data_hora, r.tipo, r.modo_registro
 FROM registros r
 JOIN motos m ON m.id_moto = r.id_moto
 JOIN usuarios u ON u.id_usuario = r.id_usuario
 LEFT JOIN reconhecimentos rec ON rec.id_reconhecimento = r.id_reconhecimento
 LEFT JOIN cameras c ON c.id_camera = rec.id_camera";

/// Registro repository — stateless, every method takes `&Connection`.
pub struct RegistroRepo;

impl RegistroRepo {
    /// Insert a registro and return the stored row.
    pub fn create(conn: &Connection, opts: &CreateRegistroOptions<'_>) -> Result<RegistroRow> {
        let data_hora = opts
            .data_hora
            .map_or_else(|| chrono::Utc::now().to_rfc3339(), String::from);
        let _ = conn.execute(
            "INSERT INTO registros
             (id_moto, id_usuario, id_reconhecimento, data_hora, tipo, modo_registro)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                opts.id_moto,
                opts.id_usuario,
                opts.id_reconhecimento,
                data_hora,
                opts.tipo,
                opts.modo_registro
            ],
        )?;
        Ok(RegistroRow {
            id_registro: conn.last_insert_rowid(),
            id_moto: opts.id_moto,
            id_usuario: opts.id_usuario,
            id_reconhecimento: opts.id_reconhecimento,
            data_hora,
            tipo: opts.tipo.to_string(),
            modo_registro: opts.modo_registro.to_string(),
        })
    }

    /// Get registro by id (raw row).
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<RegistroRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM registros WHERE id_registro = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Get registro by id with joined display fields.
    pub fn get_detail(conn: &Connection, id: i64) -> Result<Option<RegistroDetail>> {
        let sql = format!("{DETAIL_SELECT} WHERE r.id_registro = ?1");
        let row = conn
            .query_row(&sql, params![id], Self::map_detail)
            .optional()?;
        Ok(row)
    }

    /// List registros with joined display fields, newest first.
    pub fn list(conn: &Connection, opts: &ListRegistrosOptions<'_>) -> Result<Vec<RegistroDetail>> {
        use std::fmt::Write;
        let mut sql = format!("{DETAIL_SELECT} WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(id_moto) = opts.id_moto {
            let _ = write!(sql, " AND r.id_moto = ?{}", param_values.len() + 1);
            param_values.push(Box::new(id_moto));
        }
        if let Some(id_usuario) = opts.id_usuario {
            let _ = write!(sql, " AND r.id_usuario = ?{}", param_values.len() + 1);
            param_values.push(Box::new(id_usuario));
        }
        if let Some(tipo) = opts.tipo {
            let _ = write!(
                sql,
                " AND LOWER(r.tipo) = LOWER(?{})",
                param_values.len() + 1
            );
            param_values.push(Box::new(tipo.to_string()));
        }
        if let Some(modo) = opts.modo_registro {
            let _ = write!(
                sql,
                " AND LOWER(r.modo_registro) = LOWER(?{})",
                param_values.len() + 1
            );
            param_values.push(Box::new(modo.to_string()));
        }
        sql.push_str(" ORDER BY r.data_hora DESC, r.id_registro DESC");
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
            .query_map(params_refs.as_slice(), Self::map_detail)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Overwrite a registro row in place.
    pub fn update(conn: &Connection, row: &RegistroRow) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE registros SET id_moto = ?1, id_usuario = ?2, id_reconhecimento = ?3,
             data_hora = ?4, tipo = ?5, modo_registro = ?6
             WHERE id_registro = ?7",
            params![
                row.id_moto,
                row.id_usuario,
                row.id_reconhecimento,
                row.data_hora,
                row.tipo,
                row.modo_registro,
                row.id_registro
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a registro.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let changed = conn.execute("DELETE FROM registros WHERE id_registro = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Check if a registro exists.
    pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM registros WHERE id_registro = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Total number of registros.
    pub fn count(conn: &Connection) -> Result<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM registros", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Number of registros referencing a moto (delete guard input).
    pub fn count_by_moto(conn: &Connection, id_moto: i64) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM registros WHERE id_moto = ?1",
            params![id_moto],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Number of registros referencing a usuario (delete guard input).
    pub fn count_by_usuario(conn: &Connection, id_usuario: i64) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM registros WHERE id_usuario = ?1",
            params![id_usuario],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Number of registros referencing a reconhecimento (delete guard input).
    pub fn count_by_reconhecimento(conn: &Connection, id_reconhecimento: i64) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM registros WHERE id_reconhecimento = ?1",
            params![id_reconhecimento],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RegistroRow> {
        Ok(RegistroRow {
            id_registro: row.get("id_registro")?,
            id_moto: row.get("id_moto")?,
            id_usuario: row.get("id_usuario")?,
            id_reconhecimento: row.get("id_reconhecimento")?,
            data_hora: row.get("data_hora")?,
            tipo: row.get("tipo")?,
            modo_registro: row.get("modo_registro")?,
        })
    }

    fn map_detail(row: &rusqlite::Row<'_>) -> rusqlite::Result<RegistroDetail> {
        Ok(RegistroDetail {
            id_registro: row.get("id_registro")?,
            id_moto: row.get("id_moto")?,
            moto_placa: row.get("moto_placa")?,
            id_usuario: row.get("id_usuario")?,
            usuario_nome: row.get("usuario_nome")?,
            id_reconhecimento: row.get("id_reconhecimento")?,
            reconhecimento_camera_localizacao: row.get("reconhecimento_camera_localizacao")?,
            reconhecimento_precisao: row.get("reconhecimento_precisao")?,
            data_hora: row.get("data_hora")?,
            tipo: row.get("tipo")?,
            modo_registro: row.get("modo_registro")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
