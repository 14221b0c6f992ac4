//! Moto repository — vehicle rows, plate lookups, presence queries.
//!
//! Plates are stored upper-cased by the store layer; the unique index and
//! the lookups here compare case-insensitively regardless.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::sqlite::row_types::MotoRow;

/// Options for creating a moto.
pub struct CreateMotoOptions<'a> {
    /// License plate (unique, case-insensitive).
    pub placa: &'a str,
    /// Brand.
    pub marca: &'a str,
    /// Model.
    pub modelo: &'a str,
    /// Color.
    pub cor: &'a str,
    /// Presence flag; defaults to "Não" when `None`.
    pub presente: Option<&'a str>,
    /// Optional reference-image path.
    pub imagem_referencia: Option<&'a str>,
}

/// Options for listing motos.
#[derive(Default)]
pub struct ListMotosOptions<'a> {
    /// Filter by substring of the brand (case-insensitive).
    pub marca_contains: Option<&'a str>,
    /// Filter by substring of the model (case-insensitive).
    pub modelo_contains: Option<&'a str>,
    /// Filter by color (case-insensitive exact match).
    pub cor: Option<&'a str>,
    /// Filter by presence flag ("Sim"/"Não", case-insensitive).
    pub presente: Option<&'a str>,
    /// Skip results.
    pub skip: Option<i64>,
    /// Maximum results.
    pub take: Option<i64>,
}

/// Moto repository — stateless, every method takes `&Connection`.
pub struct MotoRepo;

impl MotoRepo {
    /// Insert a moto and return the stored row.
    pub fn create(conn: &Connection, opts: &CreateMotoOptions<'_>) -> Result<MotoRow> {
        let presente = opts.presente.unwrap_or("Não");
        let _ = conn.execute(
            "INSERT INTO motos (placa, marca, modelo, cor, presente, imagem_referencia)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                opts.placa,
                opts.marca,
                opts.modelo,
                opts.cor,
                presente,
                opts.imagem_referencia
            ],
        )?;
        Ok(MotoRow {
            id_moto: conn.last_insert_rowid(),
            placa: opts.placa.to_string(),
            marca: opts.marca.to_string(),
            modelo: opts.modelo.to_string(),
            cor: opts.cor.to_string(),
            presente: presente.to_string(),
            imagem_referencia: opts.imagem_referencia.map(String::from),
        })
    }

    /// Get moto by id.
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<MotoRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM motos WHERE id_moto = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Get moto by plate, case-insensitive.
    pub fn get_by_placa(conn: &Connection, placa: &str) -> Result<Option<MotoRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM motos WHERE LOWER(placa) = LOWER(?1)",
                params![placa],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// List motos with filtering, ordered by id.
    pub fn list(conn: &Connection, opts: &ListMotosOptions<'_>) -> Result<Vec<MotoRow>> {
        use std::fmt::Write;
        let mut sql = String::from("SELECT * FROM motos WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(marca) = opts.marca_contains {
            let _ = write!(
                sql,
                " AND LOWER(marca) LIKE '%' || LOWER(?{}) || '%'",
                param_values.len() + 1
            );
            param_values.push(Box::new(marca.to_string()));
        }
        if let Some(modelo) = opts.modelo_contains {
            let _ = write!(
                sql,
                " AND LOWER(modelo) LIKE '%' || LOWER(?{}) || '%'",
                param_values.len() + 1
            );
            param_values.push(Box::new(modelo.to_string()));
        }
        if let Some(cor) = opts.cor {
            let _ = write!(sql, " AND LOWER(cor) = LOWER(?{})", param_values.len() + 1);
            param_values.push(Box::new(cor.to_string()));
        }
        if let Some(presente) = opts.presente {
            let _ = write!(
                sql,
                " AND LOWER(presente) = LOWER(?{})",
                param_values.len() + 1
            );
            param_values.push(Box::new(presente.to_string()));
        }
        sql.push_str(" ORDER BY id_moto ASC");
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

    /// Overwrite a moto row in place.
    pub fn update(conn: &Connection, row: &MotoRow) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE motos SET placa = ?1, marca = ?2, modelo = ?3, cor = ?4,
             presente = ?5, imagem_referencia = ?6
             WHERE id_moto = ?7",
            params![
                row.placa,
                row.marca,
                row.modelo,
                row.cor,
                row.presente,
                row.imagem_referencia,
                row.id_moto
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a moto.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let changed = conn.execute("DELETE FROM motos WHERE id_moto = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Check if a moto exists.
    pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM motos WHERE id_moto = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Total number of motos.
    pub fn count(conn: &Connection) -> Result<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM motos", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Check whether a plate is already taken (case-insensitive), optionally
    /// ignoring one row (the row being updated).
    pub fn placa_taken(conn: &Connection, placa: &str, exclude_id: Option<i64>) -> Result<bool> {
        let taken: bool = conn.query_row(
            "SELECT EXISTS(
               SELECT 1 FROM motos
               WHERE LOWER(placa) = LOWER(?1)
                 AND (?2 IS NULL OR id_moto <> ?2)
             )",
            params![placa, exclude_id],
            |row| row.get(0),
        )?;
        Ok(taken)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MotoRow> {
        Ok(MotoRow {
            id_moto: row.get("id_moto")?,
            placa: row.get("placa")?,
            marca: row.get("marca")?,
            modelo: row.get("modelo")?,
            cor: row.get("cor")?,
            presente: row.get("presente")?,
            imagem_referencia: row.get("imagem_referencia")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
