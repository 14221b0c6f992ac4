//! Cargo repository — role rows and their uniqueness probe.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::sqlite::row_types::CargoRow;

/// Options for creating a cargo.
pub struct CreateCargoOptions<'a> {
    /// Role name (unique, case-insensitive).
    pub nome: &'a str,
    /// Permission level, 1–5.
    pub nivel_permissao: i64,
    /// Opaque serialized permission list.
    pub permissoes: &'a str,
}

/// Options for listing cargos.
#[derive(Default)]
pub struct ListCargosOptions<'a> {
    /// Filter by exact permission level.
    pub nivel: Option<i64>,
    /// Filter by substring of the name (case-insensitive).
    pub nome_contains: Option<&'a str>,
    /// Skip results.
    pub skip: Option<i64>,
    /// Maximum results.
    pub take: Option<i64>,
}

/// Cargo repository — stateless, every method takes `&Connection`.
pub struct CargoRepo;

impl CargoRepo {
    /// Insert a cargo and return the stored row.
    pub fn create(conn: &Connection, opts: &CreateCargoOptions<'_>) -> Result<CargoRow> {
        let now = chrono::Utc::now().to_rfc3339();
        let _ = conn.execute(
            "INSERT INTO cargos (nome, nivel_permissao, permissoes, data_cadastro)
             VALUES (?1, ?2, ?3, ?4)",
            params![opts.nome, opts.nivel_permissao, opts.permissoes, now],
        )?;
        Ok(CargoRow {
            id_cargo: conn.last_insert_rowid(),
            nome: opts.nome.to_string(),
            nivel_permissao: opts.nivel_permissao,
            permissoes: opts.permissoes.to_string(),
            data_cadastro: now,
        })
    }

    /// Get cargo by id.
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<CargoRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM cargos WHERE id_cargo = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// List cargos with filtering, ordered by id.
    pub fn list(conn: &Connection, opts: &ListCargosOptions<'_>) -> Result<Vec<CargoRow>> {
        use std::fmt::Write;
        let mut sql = String::from("SELECT * FROM cargos WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(nivel) = opts.nivel {
            let _ = write!(sql, " AND nivel_permissao = ?{}", param_values.len() + 1);
            param_values.push(Box::new(nivel));
        }
        if let Some(termo) = opts.nome_contains {
            let _ = write!(
                sql,
                " AND LOWER(nome) LIKE '%' || LOWER(?{}) || '%'",
                param_values.len() + 1
            );
            param_values.push(Box::new(termo.to_string()));
        }
        sql.push_str(" ORDER BY id_cargo ASC");
        if opts.skip.is_some() || opts.take.is_some() {
            // LIMIT -1 means unbounded; SQLite requires LIMIT before OFFSET.
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

    /// Overwrite a cargo row in place.
    pub fn update(conn: &Connection, row: &CargoRow) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE cargos SET nome = ?1, nivel_permissao = ?2, permissoes = ?3
             WHERE id_cargo = ?4",
            params![row.nome, row.nivel_permissao, row.permissoes, row.id_cargo],
        )?;
        Ok(changed > 0)
    }

    /// Delete a cargo.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let changed = conn.execute("DELETE FROM cargos WHERE id_cargo = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Check if a cargo exists.
    pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM cargos WHERE id_cargo = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Total number of cargos.
    pub fn count(conn: &Connection) -> Result<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM cargos", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Check whether a name is already taken (case-insensitive), optionally
    /// ignoring one row (the row being updated).
    pub fn nome_taken(conn: &Connection, nome: &str, exclude_id: Option<i64>) -> Result<bool> {
        let taken: bool = conn.query_row(
            "SELECT EXISTS(
               SELECT 1 FROM cargos
               WHERE LOWER(nome) = LOWER(?1)
                 AND (?2 IS NULL OR id_cargo <> ?2)
             )",
            params![nome, exclude_id],
            |row| row.get(0),
        )?;
        Ok(taken)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CargoRow> {
        Ok(CargoRow {
            id_cargo: row.get("id_cargo")?,
            nome: row.get("nome")?,
            nivel_permissao: row.get("nivel_permissao")?,
            permissoes: row.get("permissoes")?,
            data_cadastro: row.get("data_cadastro")?,
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

    fn create(conn: &Connection, nome: &str, nivel: i64) -> CargoRow {
        CargoRepo::create(
            conn,
            &CreateCargoOptions {
                nome,
                nivel_permissao: nivel,
                permissoes: "[\"ler\"]",
            },
        )
        .unwrap()
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let conn = setup();
        let a = create(&conn, "Administrador", 5);
        let b = create(&conn, "Operador", 2);
        assert_eq!(a.id_cargo, 1);
        assert_eq!(b.id_cargo, 2);
        assert!(!a.data_cadastro.is_empty());
    }

    #[test]
    fn get_by_id_roundtrip() {
        let conn = setup();
        let cargo = create(&conn, "Administrador", 5);
        let found = CargoRepo::get_by_id(&conn, cargo.id_cargo).unwrap().unwrap();
        assert_eq!(found.nome, "Administrador");
        assert_eq!(found.nivel_permissao, 5);
    }

    #[test]
    fn get_by_id_not_found() {
        let conn = setup();
        assert!(CargoRepo::get_by_id(&conn, 42).unwrap().is_none());
    }

    #[test]
    fn list_ordered_by_id() {
        let conn = setup();
        create(&conn, "Operador", 2);
        create(&conn, "Administrador", 5);
        let all = CargoRepo::list(&conn, &ListCargosOptions::default()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].nome, "Operador");
        assert_eq!(all[1].nome, "Administrador");
    }

    #[test]
    fn list_filter_by_nivel() {
        let conn = setup();
        create(&conn, "Operador", 2);
        create(&conn, "Administrador", 5);
        let found = CargoRepo::list(
            &conn,
            &ListCargosOptions {
                nivel: Some(5),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].nome, "Administrador");
    }

    #[test]
    fn list_filter_by_name_substring_case_insensitive() {
        let conn = setup();
        create(&conn, "Administrador", 5);
        create(&conn, "Operador", 2);
        let found = CargoRepo::list(
            &conn,
            &ListCargosOptions {
                nome_contains: Some("ADMIN"),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].nome, "Administrador");
    }

    #[test]
    fn list_skip_take() {
        let conn = setup();
        for i in 1..=5 {
            create(&conn, &format!("Cargo {i}"), 1);
        }
        let page = CargoRepo::list(
            &conn,
            &ListCargosOptions {
                skip: Some(2),
                take: Some(2),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].nome, "Cargo 3");
        assert_eq!(page[1].nome, "Cargo 4");
    }

    #[test]
    fn list_skip_without_take() {
        let conn = setup();
        for i in 1..=4 {
            create(&conn, &format!("Cargo {i}"), 1);
        }
        let rest = CargoRepo::list(
            &conn,
            &ListCargosOptions {
                skip: Some(3),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].nome, "Cargo 4");
    }

    #[test]
    fn update_overwrites_fields() {
        let conn = setup();
        let mut cargo = create(&conn, "Operador", 2);
        cargo.nome = "Supervisor".to_string();
        cargo.nivel_permissao = 3;
        assert!(CargoRepo::update(&conn, &cargo).unwrap());

        let found = CargoRepo::get_by_id(&conn, cargo.id_cargo).unwrap().unwrap();
        assert_eq!(found.nome, "Supervisor");
        assert_eq!(found.nivel_permissao, 3);
    }

    #[test]
    fn delete_and_exists() {
        let conn = setup();
        let cargo = create(&conn, "Operador", 2);
        assert!(CargoRepo::exists(&conn, cargo.id_cargo).unwrap());
        assert!(CargoRepo::delete(&conn, cargo.id_cargo).unwrap());
        assert!(!CargoRepo::exists(&conn, cargo.id_cargo).unwrap());
        assert!(!CargoRepo::delete(&conn, cargo.id_cargo).unwrap());
    }

    #[test]
    fn nome_taken_is_case_insensitive() {
        let conn = setup();
        let cargo = create(&conn, "Administrador", 5);
        assert!(CargoRepo::nome_taken(&conn, "ADMINISTRADOR", None).unwrap());
        assert!(!CargoRepo::nome_taken(&conn, "Operador", None).unwrap());
        // Same row excluded: its own name is not a conflict.
        assert!(!CargoRepo::nome_taken(&conn, "administrador", Some(cargo.id_cargo)).unwrap());
    }

    #[test]
    fn count_cargos() {
        let conn = setup();
        assert_eq!(CargoRepo::count(&conn).unwrap(), 0);
        create(&conn, "Operador", 2);
        assert_eq!(CargoRepo::count(&conn).unwrap(), 1);
    }
}
