//! Log repository — append-only change-audit trail.
//!
//! Rows are only ever inserted and read; there is no update or delete here.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::sqlite::row_types::LogAlteracaoRow;

/// Options for appending a log entry.
pub struct CreateLogOptions<'a> {
    /// Acting usuario.
    pub id_usuario: i64,
    /// Affected moto.
    pub id_moto: i64,
    /// Action-type code.
    pub tipo_acao: &'a str,
    /// Name of the changed field.
    pub campo_alterado: &'a str,
    /// Previous value, if any.
    pub valor_antigo: Option<&'a str>,
    /// New value, if any.
    pub valor_novo: Option<&'a str>,
    /// Change timestamp; defaults to now when `None`.
    pub data_hora: Option<&'a str>,
}

/// Options for listing log entries.
#[derive(Default)]
pub struct ListLogsOptions<'a> {
    /// Filter by acting usuario.
    pub id_usuario: Option<i64>,
    /// Filter by affected moto.
    pub id_moto: Option<i64>,
    /// Filter by action-type code.
    pub tipo_acao: Option<&'a str>,
    /// Skip results.
    pub skip: Option<i64>,
    /// Maximum results.
    pub take: Option<i64>,
}

/// Log repository — stateless, every method takes `&Connection`.
pub struct LogAlteracaoRepo;

impl LogAlteracaoRepo {
    /// Append a log entry and return the stored row.
    pub fn create(conn: &Connection, opts: &CreateLogOptions<'_>) -> Result<LogAlteracaoRow> {
        let data_hora = opts
            .data_hora
            .map_or_else(|| chrono::Utc::now().to_rfc3339(), String::from);
        let _ = conn.execute(
            "INSERT INTO log_alteracoes
             (id_usuario, id_moto, data_hora, tipo_acao, campo_alterado, valor_antigo, valor_novo)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                opts.id_usuario,
                opts.id_moto,
                data_hora,
                opts.tipo_acao,
                opts.campo_alterado,
                opts.valor_antigo,
                opts.valor_novo
            ],
        )?;
        Ok(LogAlteracaoRow {
            id_log: conn.last_insert_rowid(),
            id_usuario: opts.id_usuario,
            id_moto: opts.id_moto,
            data_hora,
            tipo_acao: opts.tipo_acao.to_string(),
            campo_alterado: opts.campo_alterado.to_string(),
            valor_antigo: opts.valor_antigo.map(String::from),
            valor_novo: opts.valor_novo.map(String::from),
        })
    }

    /// Get log entry by id.
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<LogAlteracaoRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM log_alteracoes WHERE id_log = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// List log entries with filtering, newest first.
    pub fn list(conn: &Connection, opts: &ListLogsOptions<'_>) -> Result<Vec<LogAlteracaoRow>> {
        use std::fmt::Write;
        let mut sql = String::from("SELECT * FROM log_alteracoes WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(id_usuario) = opts.id_usuario {
            let _ = write!(sql, " AND id_usuario = ?{}", param_values.len() + 1);
            param_values.push(Box::new(id_usuario));
        }
        if let Some(id_moto) = opts.id_moto {
            let _ = write!(sql, " AND id_moto = ?{}", param_values.len() + 1);
            param_values.push(Box::new(id_moto));
        }
        if let Some(tipo_acao) = opts.tipo_acao {
            let _ = write!(
                sql,
                " AND LOWER(tipo_acao) = LOWER(?{})",
                param_values.len() + 1
            );
            param_values.push(Box::new(tipo_acao.to_string()));
        }
        sql.push_str(" ORDER BY data_hora DESC, id_log DESC");
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

    /// Total number of log entries.
    pub fn count(conn: &Connection) -> Result<i64> {
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM log_alteracoes", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Number of entries naming a moto (delete guard input).
    pub fn count_by_moto(conn: &Connection, id_moto: i64) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM log_alteracoes WHERE id_moto = ?1",
            params![id_moto],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Number of entries naming a usuario (delete guard input).
    pub fn count_by_usuario(conn: &Connection, id_usuario: i64) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM log_alteracoes WHERE id_usuario = ?1",
            params![id_usuario],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LogAlteracaoRow> {
        Ok(LogAlteracaoRow {
            id_log: row.get("id_log")?,
            id_usuario: row.get("id_usuario")?,
            id_moto: row.get("id_moto")?,
            data_hora: row.get("data_hora")?,
            tipo_acao: row.get("tipo_acao")?,
            campo_alterado: row.get("campo_alterado")?,
            valor_antigo: row.get("valor_antigo")?,
            valor_novo: row.get("valor_novo")?,
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
    use crate::sqlite::repositories::cargo::{CargoRepo, CreateCargoOptions};
    use crate::sqlite::repositories::moto::{CreateMotoOptions, MotoRepo};
    use crate::sqlite::repositories::usuario::{CreateUsuarioOptions, UsuarioRepo};

    fn setup() -> (Connection, i64, i64) {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();

        let cargo = CargoRepo::create(
            &conn,
            &CreateCargoOptions {
                nome: "Operador",
                nivel_permissao: 2,
                permissoes: "[]",
            },
        )
        .unwrap();
        let usuario = UsuarioRepo::create(
            &conn,
            &CreateUsuarioOptions {
                nome: "Maria",
                email: "maria@ex.com",
                senha: "hash",
                id_cargo: cargo.id_cargo,
                ativo: None,
            },
        )
        .unwrap();
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
        (conn, usuario.id_usuario, moto.id_moto)
    }

    fn append(
        conn: &Connection,
        id_usuario: i64,
        id_moto: i64,
        tipo_acao: &str,
        data_hora: &str,
    ) -> LogAlteracaoRow {
        LogAlteracaoRepo::create(
            conn,
            &CreateLogOptions {
                id_usuario,
                id_moto,
                tipo_acao,
                campo_alterado: "presente",
                valor_antigo: Some("Não"),
                valor_novo: Some("Sim"),
                data_hora: Some(data_hora),
            },
        )
        .unwrap()
    }

    #[test]
    fn append_and_get() {
        let (conn, id_usuario, id_moto) = setup();
        let log = append(&conn, id_usuario, id_moto, "atualizacao", "2025-06-01T10:00:00Z");

        let found = LogAlteracaoRepo::get_by_id(&conn, log.id_log).unwrap().unwrap();
        assert_eq!(found.campo_alterado, "presente");
        assert_eq!(found.valor_antigo.as_deref(), Some("Não"));
        assert_eq!(found.valor_novo.as_deref(), Some("Sim"));
    }

    #[test]
    fn list_newest_first_with_filters() {
        let (conn, id_usuario, id_moto) = setup();
        append(&conn, id_usuario, id_moto, "criacao", "2025-06-01T10:00:00Z");
        append(&conn, id_usuario, id_moto, "atualizacao", "2025-06-02T10:00:00Z");

        let all = LogAlteracaoRepo::list(&conn, &ListLogsOptions::default()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].tipo_acao, "atualizacao");

        let criacoes = LogAlteracaoRepo::list(
            &conn,
            &ListLogsOptions {
                tipo_acao: Some("criacao"),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(criacoes.len(), 1);

        let by_moto = LogAlteracaoRepo::list(
            &conn,
            &ListLogsOptions {
                id_moto: Some(id_moto),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(by_moto.len(), 2);

        let none = LogAlteracaoRepo::list(
            &conn,
            &ListLogsOptions {
                id_usuario: Some(999),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn list_skip_take() {
        let (conn, id_usuario, id_moto) = setup();
        for i in 1..=5 {
            append(
                &conn,
                id_usuario,
                id_moto,
                "atualizacao",
                &format!("2025-06-0{i}T10:00:00Z"),
            );
        }
        let page = LogAlteracaoRepo::list(
            &conn,
            &ListLogsOptions {
                skip: Some(1),
                take: Some(3),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].data_hora, "2025-06-04T10:00:00Z");
    }

    #[test]
    fn dependent_counts() {
        let (conn, id_usuario, id_moto) = setup();
        append(&conn, id_usuario, id_moto, "criacao", "2025-06-01T10:00:00Z");
        assert_eq!(LogAlteracaoRepo::count_by_moto(&conn, id_moto).unwrap(), 1);
        assert_eq!(
            LogAlteracaoRepo::count_by_usuario(&conn, id_usuario).unwrap(),
            1
        );
        assert_eq!(LogAlteracaoRepo::count(&conn).unwrap(), 1);
    }
}
