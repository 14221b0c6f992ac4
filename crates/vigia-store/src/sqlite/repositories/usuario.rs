//! Usuario repository — user rows, email uniqueness, cargo joins.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::sqlite::row_types::{UsuarioDetail, UsuarioRow};

/// Options for creating a usuario.
pub struct CreateUsuarioOptions<'a> {
    /// Display name.
    pub nome: &'a str,
    /// Email (unique, case-insensitive).
    pub email: &'a str,
    /// Opaque credential, stored as given.
    pub senha: &'a str,
    /// Owning cargo id.
    pub id_cargo: i64,
    /// Active flag; defaults to "Sim" when `None`.
    pub ativo: Option<&'a str>,
}

/// Options for listing usuarios.
#[derive(Default)]
pub struct ListUsuariosOptions<'a> {
    /// Filter by substring of the name (case-insensitive).
    pub nome_contains: Option<&'a str>,
    /// Filter by cargo.
    pub id_cargo: Option<i64>,
    /// Filter by active flag ("Sim"/"Não", case-insensitive).
    pub ativo: Option<&'a str>,
    /// Skip results.
    pub skip: Option<i64>,
    /// Maximum results.
    pub take: Option<i64>,
}

/// Usuario repository — stateless, every method takes `&Connection`.
pub struct UsuarioRepo;

impl UsuarioRepo {
    /// Insert a usuario and return the stored row.
    pub fn create(conn: &Connection, opts: &CreateUsuarioOptions<'_>) -> Result<UsuarioRow> {
        let ativo = opts.ativo.unwrap_or("Sim");
        let _ = conn.execute(
            "INSERT INTO usuarios (nome, email, senha, id_cargo, ativo)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![opts.nome, opts.email, opts.senha, opts.id_cargo, ativo],
        )?;
        Ok(UsuarioRow {
            id_usuario: conn.last_insert_rowid(),
            nome: opts.nome.to_string(),
            email: opts.email.to_string(),
            senha: opts.senha.to_string(),
            id_cargo: opts.id_cargo,
            ativo: ativo.to_string(),
        })
    }

    /// Get usuario by id (raw row, includes senha).
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<UsuarioRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM usuarios WHERE id_usuario = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Get usuario by id with its cargo name, senha omitted.
    pub fn get_detail(conn: &Connection, id: i64) -> Result<Option<UsuarioDetail>> {
        let row = conn
            .query_row(
                "SELECT u.id_usuario, u.nome, u.email, u.id_cargo, c.nome AS cargo_nome, u.ativo
                 FROM usuarios u
                 JOIN cargos c ON c.id_cargo = u.id_cargo
                 WHERE u.id_usuario = ?1",
                params![id],
                Self::map_detail,
            )
            .optional()?;
        Ok(row)
    }

    /// List usuarios with their cargo names, ordered by id.
    pub fn list(conn: &Connection, opts: &ListUsuariosOptions<'_>) -> Result<Vec<UsuarioDetail>> {
        use std::fmt::Write;
        let mut sql = String::from(
            "SELECT u.id_usuario, u.nome, u.email, u.id_cargo, c.nome AS cargo_nome, u.ativo
             FROM usuarios u
             JOIN cargos c ON c.id_cargo = u.id_cargo
             WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(termo) = opts.nome_contains {
            let _ = write!(
                sql,
                " AND LOWER(u.nome) LIKE '%' || LOWER(?{}) || '%'",
                param_values.len() + 1
            );
            param_values.push(Box::new(termo.to_string()));
        }
        if let Some(id_cargo) = opts.id_cargo {
            let _ = write!(sql, " AND u.id_cargo = ?{}", param_values.len() + 1);
            param_values.push(Box::new(id_cargo));
        }
        if let Some(ativo) = opts.ativo {
            let _ = write!(
                sql,
                " AND LOWER(u.ativo) = LOWER(?{})",
                param_values.len() + 1
            );
            param_values.push(Box::new(ativo.to_string()));
        }
        sql.push_str(" ORDER BY u.id_usuario ASC");
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

    /// Overwrite a usuario row in place.
    pub fn update(conn: &Connection, row: &UsuarioRow) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE usuarios SET nome = ?1, email = ?2, senha = ?3, id_cargo = ?4, ativo = ?5
             WHERE id_usuario = ?6",
            params![
                row.nome,
                row.email,
                row.senha,
                row.id_cargo,
                row.ativo,
                row.id_usuario
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a usuario.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let changed = conn.execute("DELETE FROM usuarios WHERE id_usuario = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Check if a usuario exists.
    pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM usuarios WHERE id_usuario = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Total number of usuarios.
    pub fn count(conn: &Connection) -> Result<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM usuarios", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Number of usuarios attached to a cargo (delete guard input).
    pub fn count_by_cargo(conn: &Connection, id_cargo: i64) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM usuarios WHERE id_cargo = ?1",
            params![id_cargo],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Check whether an email is already taken (case-insensitive), optionally
    /// ignoring one row (the row being updated).
    pub fn email_taken(conn: &Connection, email: &str, exclude_id: Option<i64>) -> Result<bool> {
        let taken: bool = conn.query_row(
            "SELECT EXISTS(
               SELECT 1 FROM usuarios
               WHERE LOWER(email) = LOWER(?1)
                 AND (?2 IS NULL OR id_usuario <> ?2)
             )",
            params![email, exclude_id],
            |row| row.get(0),
        )?;
        Ok(taken)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UsuarioRow> {
        Ok(UsuarioRow {
            id_usuario: row.get("id_usuario")?,
            nome: row.get("nome")?,
            email: row.get("email")?,
            senha: row.get("senha")?,
            id_cargo: row.get("id_cargo")?,
            ativo: row.get("ativo")?,
        })
    }

    fn map_detail(row: &rusqlite::Row<'_>) -> rusqlite::Result<UsuarioDetail> {
        Ok(UsuarioDetail {
            id_usuario: row.get("id_usuario")?,
            nome: row.get("nome")?,
            email: row.get("email")?,
            id_cargo: row.get("id_cargo")?,
            cargo_nome: row.get("cargo_nome")?,
            ativo: row.get("ativo")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
