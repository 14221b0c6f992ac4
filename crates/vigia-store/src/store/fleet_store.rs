//! High-level transactional `FleetStore` API.
//!
//! Composes the per-entity repositories into validated, atomic operations.
//! Every write runs check-then-write inside a single `SQLite` transaction on
//! a pooled connection — callers never observe partial state. Write
//! transactions open `BEGIN IMMEDIATE`, so the uniqueness and guard
//! pre-checks run behind the write lock: a racing writer blocks until the
//! winner commits and its pre-check then sees the committed row. The unique
//! indexes in storage stay the final authority: a constraint violation that
//! slips past a pre-check is remapped to [`StoreError::Conflict`] with the
//! same message the pre-check would have produced.

use rusqlite::TransactionBehavior;
use serde::Deserialize;

use crate::errors::{Result, StoreError, map_unique_violation};
use crate::sqlite::connection::{ConnectionPool, PooledConnection};
use crate::sqlite::repositories::camera::{CameraRepo, CreateCameraOptions, ListCamerasOptions};
use crate::sqlite::repositories::cargo::{CargoRepo, CreateCargoOptions, ListCargosOptions};
use crate::sqlite::repositories::log_alteracao::{
    CreateLogOptions, ListLogsOptions, LogAlteracaoRepo,
};
use crate::sqlite::repositories::moto::{CreateMotoOptions, ListMotosOptions, MotoRepo};
use crate::sqlite::repositories::reconhecimento::{
    CreateReconhecimentoOptions, ListReconhecimentosOptions, ReconhecimentoRepo,
};
use crate::sqlite::repositories::registro::{
    CreateRegistroOptions, ListRegistrosOptions, RegistroRepo,
};
use crate::sqlite::repositories::usuario::{
    CreateUsuarioOptions, ListUsuariosOptions, UsuarioRepo,
};
use crate::sqlite::row_types::{
    CameraRow, CargoRow, LogAlteracaoRow, MotoRow, ReconhecimentoRow, RegistroDetail,
    UsuarioDetail,
};
use crate::validate;

// ─────────────────────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Input for creating a cargo.
#[derive(Clone, Debug, Deserialize)]
pub struct NewCargo {
    /// Role name (unique, case-insensitive).
    pub nome: String,
    /// Permission level, 1–5.
    pub nivel_permissao: i64,
    /// Opaque serialized permission list.
    pub permissoes: String,
}

/// Partial update for a cargo. `None` leaves the stored value.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CargoPatch {
    pub nome: Option<String>,
    pub nivel_permissao: Option<i64>,
    pub permissoes: Option<String>,
}

/// Input for creating a usuario.
#[derive(Clone, Debug, Deserialize)]
pub struct NewUsuario {
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub id_cargo: i64,
    /// Defaults to "Sim".
    pub ativo: Option<String>,
}

/// Partial update for a usuario. The senha is changed only when supplied
/// non-blank.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UsuarioPatch {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
    pub id_cargo: Option<i64>,
    pub ativo: Option<String>,
}

/// Input for creating a moto.
#[derive(Clone, Debug, Deserialize)]
pub struct NewMoto {
    /// License plate; stored upper-cased.
    pub placa: String,
    pub marca: String,
    pub modelo: String,
    pub cor: String,
    /// Defaults to "Não".
    pub presente: Option<String>,
    pub imagem_referencia: Option<String>,
}

/// Partial update for a moto.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MotoPatch {
    pub placa: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub cor: Option<String>,
    pub presente: Option<String>,
    pub imagem_referencia: Option<String>,
}

/// Input for creating a camera.
#[derive(Clone, Debug, Deserialize)]
pub struct NewCamera {
    pub localizacao: String,
    /// Defaults to "ativo".
    pub status: Option<String>,
}

/// Partial update for a camera.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CameraPatch {
    pub localizacao: Option<String>,
    pub status: Option<String>,
}

/// Input for creating a reconhecimento.
#[derive(Clone, Debug, Deserialize)]
pub struct NewReconhecimento {
    pub id_moto: i64,
    pub id_camera: i64,
    /// Precision score in [0,1].
    pub precisao: f64,
    pub imagem_capturada: String,
    /// Minimum-confidence threshold in [0,1].
    pub confianca_minima: f64,
    /// Defaults to now.
    pub data_hora: Option<String>,
}

/// Partial update for a reconhecimento.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReconhecimentoPatch {
    pub id_moto: Option<i64>,
    pub id_camera: Option<i64>,
    pub precisao: Option<f64>,
    pub imagem_capturada: Option<String>,
    pub confianca_minima: Option<f64>,
}

/// Input for creating a registro.
#[derive(Clone, Debug, Deserialize)]
pub struct NewRegistro {
    pub id_moto: i64,
    pub id_usuario: i64,
    /// None for manual registrations.
    pub id_reconhecimento: Option<i64>,
    /// "entrada" or "saida".
    pub tipo: String,
    /// "automatico" or "manual".
    pub modo_registro: String,
    /// Defaults to now.
    pub data_hora: Option<String>,
}

/// Partial update for a registro.
///
/// `id_reconhecimento` is doubly optional: a missing field leaves the stored
/// value, an explicit null (`Some(None)`) disassociates the reconhecimento.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RegistroPatch {
    pub id_moto: Option<i64>,
    pub id_usuario: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub id_reconhecimento: Option<Option<i64>>,
    pub tipo: Option<String>,
    pub modo_registro: Option<String>,
}

/// Deserialize a present-but-null field as `Some(None)`; a missing field
/// falls back to the `default` attribute's outer `None`.
fn double_option<'de, D>(deserializer: D) -> std::result::Result<Option<Option<i64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

/// Input for appending a change-log entry. The trail is append-only.
#[derive(Clone, Debug, Deserialize)]
pub struct NewLogAlteracao {
    pub id_usuario: i64,
    pub id_moto: i64,
    pub tipo_acao: String,
    pub campo_alterado: String,
    pub valor_antigo: Option<String>,
    pub valor_novo: Option<String>,
    /// Defaults to now.
    pub data_hora: Option<String>,
}

/// Remap a storage-level unique violation to a domain conflict.
fn remap_conflict<T>(result: Result<T>, message: impl Into<String>) -> Result<T> {
    match result {
        Err(StoreError::Sqlite(err)) => Err(map_unique_violation(err, message)),
        other => other,
    }
}

/// High-level store wrapping a connection pool and all repositories.
pub struct FleetStore {
    pool: ConnectionPool,
}

impl FleetStore {
    /// Create a new `FleetStore` with the given connection pool.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool.
    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cargos
    // ─────────────────────────────────────────────────────────────────────

    /// Create a cargo.
    pub fn create_cargo(&self, input: &NewCargo) -> Result<CargoRow> {
        validate::require("nome", &input.nome)?;
        validate::max_len("nome", &input.nome, 50)?;
        validate::int_range("nivel_permissao", input.nivel_permissao, 1, 5)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if CargoRepo::nome_taken(&tx, &input.nome, None)? {
            return Err(StoreError::Conflict(format!(
                "Cargo com nome '{}' já existe.",
                input.nome
            )));
        }
        let row = remap_conflict(
            CargoRepo::create(
                &tx,
                &CreateCargoOptions {
                    nome: &input.nome,
                    nivel_permissao: input.nivel_permissao,
                    permissoes: &input.permissoes,
                },
            ),
            format!("Cargo com nome '{}' já existe.", input.nome),
        )?;
        tx.commit()?;
        Ok(row)
    }

    /// Get a cargo by id.
    pub fn get_cargo(&self, id: i64) -> Result<CargoRow> {
        let conn = self.conn()?;
        CargoRepo::get_by_id(&conn, id)?.ok_or(StoreError::NotFound {
            entity: "Cargo",
            id,
        })
    }

    /// List cargos.
    pub fn list_cargos(&self, opts: &ListCargosOptions<'_>) -> Result<Vec<CargoRow>> {
        let conn = self.conn()?;
        CargoRepo::list(&conn, opts)
    }

    /// Apply a partial update to a cargo.
    pub fn update_cargo(&self, id: i64, patch: &CargoPatch) -> Result<CargoRow> {
        if let Some(nome) = &patch.nome {
            validate::require("nome", nome)?;
            validate::max_len("nome", nome, 50)?;
        }
        if let Some(nivel) = patch.nivel_permissao {
            validate::int_range("nivel_permissao", nivel, 1, 5)?;
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut row = CargoRepo::get_by_id(&tx, id)?.ok_or(StoreError::NotFound {
            entity: "Cargo",
            id,
        })?;

        if let Some(nome) = &patch.nome {
            if CargoRepo::nome_taken(&tx, nome, Some(id))? {
                return Err(StoreError::Conflict(format!(
                    "Outro cargo com nome '{nome}' já existe."
                )));
            }
            row.nome = nome.clone();
        }
        if let Some(nivel) = patch.nivel_permissao {
            row.nivel_permissao = nivel;
        }
        if let Some(permissoes) = &patch.permissoes {
            row.permissoes = permissoes.clone();
        }

        let _ = remap_conflict(
            CargoRepo::update(&tx, &row),
            format!("Outro cargo com nome '{}' já existe.", row.nome),
        )?;
        tx.commit()?;
        Ok(row)
    }

    /// Delete a cargo. Blocked while any usuario references it.
    pub fn delete_cargo(&self, id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !CargoRepo::exists(&tx, id)? {
            return Err(StoreError::NotFound {
                entity: "Cargo",
                id,
            });
        }
        if UsuarioRepo::count_by_cargo(&tx, id)? > 0 {
            return Err(StoreError::Conflict(format!(
                "Cargo com ID {id} está em uso e não pode ser excluído."
            )));
        }
        let _ = CargoRepo::delete(&tx, id)?;
        tx.commit()?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Usuarios
    // ─────────────────────────────────────────────────────────────────────

    /// Create a usuario.
    pub fn create_usuario(&self, input: &NewUsuario) -> Result<UsuarioDetail> {
        validate::require("nome", &input.nome)?;
        validate::max_len("nome", &input.nome, 100)?;
        validate::email("email", &input.email)?;
        validate::max_len("email", &input.email, 100)?;
        validate::require("senha", &input.senha)?;
        validate::max_len("senha", &input.senha, 60)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if UsuarioRepo::email_taken(&tx, &input.email, None)? {
            return Err(StoreError::Conflict(format!(
                "Usuário com email '{}' já existe.",
                input.email
            )));
        }
        if !CargoRepo::exists(&tx, input.id_cargo)? {
            return Err(StoreError::ReferenceNotFound {
                entity: "Cargo",
                id: input.id_cargo,
            });
        }
        let row = remap_conflict(
            UsuarioRepo::create(
                &tx,
                &CreateUsuarioOptions {
                    nome: &input.nome,
                    email: &input.email,
                    senha: &input.senha,
                    id_cargo: input.id_cargo,
                    ativo: input.ativo.as_deref(),
                },
            ),
            format!("Usuário com email '{}' já existe.", input.email),
        )?;
        let detail =
            UsuarioRepo::get_detail(&tx, row.id_usuario)?.ok_or(StoreError::NotFound {
                entity: "Usuário",
                id: row.id_usuario,
            })?;
        tx.commit()?;
        Ok(detail)
    }

    /// Get a usuario by id, with its cargo name.
    pub fn get_usuario(&self, id: i64) -> Result<UsuarioDetail> {
        let conn = self.conn()?;
        UsuarioRepo::get_detail(&conn, id)?.ok_or(StoreError::NotFound {
            entity: "Usuário",
            id,
        })
    }

    /// List usuarios.
    pub fn list_usuarios(&self, opts: &ListUsuariosOptions<'_>) -> Result<Vec<UsuarioDetail>> {
        let conn = self.conn()?;
        UsuarioRepo::list(&conn, opts)
    }

    /// Apply a partial update to a usuario. The senha changes only when the
    /// patch supplies it non-blank.
    pub fn update_usuario(&self, id: i64, patch: &UsuarioPatch) -> Result<UsuarioDetail> {
        if let Some(nome) = &patch.nome {
            validate::require("nome", nome)?;
            validate::max_len("nome", nome, 100)?;
        }
        if let Some(email) = &patch.email {
            validate::email("email", email)?;
            validate::max_len("email", email, 100)?;
        }
        if let Some(senha) = &patch.senha {
            validate::max_len("senha", senha, 60)?;
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut row = UsuarioRepo::get_by_id(&tx, id)?.ok_or(StoreError::NotFound {
            entity: "Usuário",
            id,
        })?;

        if let Some(email) = &patch.email {
            if UsuarioRepo::email_taken(&tx, email, Some(id))? {
                return Err(StoreError::Conflict(format!(
                    "Outro usuário com email '{email}' já existe."
                )));
            }
            row.email = email.clone();
        }
        if let Some(id_cargo) = patch.id_cargo {
            if !CargoRepo::exists(&tx, id_cargo)? {
                return Err(StoreError::ReferenceNotFound {
                    entity: "Cargo",
                    id: id_cargo,
                });
            }
            row.id_cargo = id_cargo;
        }
        if let Some(nome) = &patch.nome {
            row.nome = nome.clone();
        }
        if let Some(senha) = &patch.senha {
            if !senha.trim().is_empty() {
                row.senha = senha.clone();
            }
        }
        if let Some(ativo) = &patch.ativo {
            row.ativo = ativo.clone();
        }

        let _ = remap_conflict(
            UsuarioRepo::update(&tx, &row),
            format!("Outro usuário com email '{}' já existe.", row.email),
        )?;
        let detail = UsuarioRepo::get_detail(&tx, id)?.ok_or(StoreError::NotFound {
            entity: "Usuário",
            id,
        })?;
        tx.commit()?;
        Ok(detail)
    }

    /// Delete a usuario. Blocked while any registro or log entry references it.
    pub fn delete_usuario(&self, id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !UsuarioRepo::exists(&tx, id)? {
            return Err(StoreError::NotFound {
                entity: "Usuário",
                id,
            });
        }
        let dependents =
            RegistroRepo::count_by_usuario(&tx, id)? + LogAlteracaoRepo::count_by_usuario(&tx, id)?;
        if dependents > 0 {
            return Err(StoreError::Conflict(format!(
                "Usuário com ID {id} possui registros associados e não pode ser excluído. \
                 Considere inativá-lo ('Ativo: Não')."
            )));
        }
        let _ = UsuarioRepo::delete(&tx, id)?;
        tx.commit()?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Motos
    // ─────────────────────────────────────────────────────────────────────

    /// Create a moto. The plate is stored upper-cased.
    pub fn create_moto(&self, input: &NewMoto) -> Result<MotoRow> {
        validate::require("placa", &input.placa)?;
        let placa = input.placa.trim().to_uppercase();
        validate::exact_len("placa", &placa, 7)?;
        validate::require("marca", &input.marca)?;
        validate::max_len("marca", &input.marca, 50)?;
        validate::require("modelo", &input.modelo)?;
        validate::max_len("modelo", &input.modelo, 50)?;
        validate::require("cor", &input.cor)?;
        validate::max_len("cor", &input.cor, 20)?;
        if let Some(imagem) = &input.imagem_referencia {
            validate::max_len("imagem_referencia", imagem, 255)?;
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if MotoRepo::placa_taken(&tx, &placa, None)? {
            return Err(StoreError::Conflict(format!(
                "Moto com placa '{placa}' já existe."
            )));
        }
        let row = remap_conflict(
            MotoRepo::create(
                &tx,
                &CreateMotoOptions {
                    placa: &placa,
                    marca: &input.marca,
                    modelo: &input.modelo,
                    cor: &input.cor,
                    presente: input.presente.as_deref(),
                    imagem_referencia: input.imagem_referencia.as_deref(),
                },
            ),
            format!("Moto com placa '{placa}' já existe."),
        )?;
        tx.commit()?;
        Ok(row)
    }

    /// Get a moto by id.
    pub fn get_moto(&self, id: i64) -> Result<MotoRow> {
        let conn = self.conn()?;
        MotoRepo::get_by_id(&conn, id)?.ok_or(StoreError::NotFound {
            entity: "Moto",
            id,
        })
    }

    /// Look up a moto by plate, case-insensitive. `None` when unknown.
    pub fn get_moto_by_placa(&self, placa: &str) -> Result<Option<MotoRow>> {
        validate::require("placa", placa)?;
        let conn = self.conn()?;
        MotoRepo::get_by_placa(&conn, placa)
    }

    /// List motos.
    pub fn list_motos(&self, opts: &ListMotosOptions<'_>) -> Result<Vec<MotoRow>> {
        let conn = self.conn()?;
        MotoRepo::list(&conn, opts)
    }

    /// Apply a partial update to a moto.
    pub fn update_moto(&self, id: i64, patch: &MotoPatch) -> Result<MotoRow> {
        let placa = match &patch.placa {
            Some(placa) => {
                validate::require("placa", placa)?;
                let placa = placa.trim().to_uppercase();
                validate::exact_len("placa", &placa, 7)?;
                Some(placa)
            }
            None => None,
        };
        if let Some(marca) = &patch.marca {
            validate::max_len("marca", marca, 50)?;
        }
        if let Some(modelo) = &patch.modelo {
            validate::max_len("modelo", modelo, 50)?;
        }
        if let Some(cor) = &patch.cor {
            validate::max_len("cor", cor, 20)?;
        }
        if let Some(imagem) = &patch.imagem_referencia {
            validate::max_len("imagem_referencia", imagem, 255)?;
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut row = MotoRepo::get_by_id(&tx, id)?.ok_or(StoreError::NotFound {
            entity: "Moto",
            id,
        })?;

        if let Some(placa) = placa {
            if MotoRepo::placa_taken(&tx, &placa, Some(id))? {
                return Err(StoreError::Conflict(format!(
                    "Outra moto com placa '{placa}' já existe."
                )));
            }
            row.placa = placa;
        }
        if let Some(marca) = &patch.marca {
            row.marca = marca.clone();
        }
        if let Some(modelo) = &patch.modelo {
            row.modelo = modelo.clone();
        }
        if let Some(cor) = &patch.cor {
            row.cor = cor.clone();
        }
        if let Some(presente) = &patch.presente {
            row.presente = presente.clone();
        }
        if let Some(imagem) = &patch.imagem_referencia {
            row.imagem_referencia = Some(imagem.clone());
        }

        let _ = remap_conflict(
            MotoRepo::update(&tx, &row),
            format!("Outra moto com placa '{}' já existe.", row.placa),
        )?;
        tx.commit()?;
        Ok(row)
    }

    /// Delete a moto. Blocked while any registro, reconhecimento, or log
    /// entry references it.
    pub fn delete_moto(&self, id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !MotoRepo::exists(&tx, id)? {
            return Err(StoreError::NotFound {
                entity: "Moto",
                id,
            });
        }
        let dependents = RegistroRepo::count_by_moto(&tx, id)?
            + ReconhecimentoRepo::count_by_moto(&tx, id)?
            + LogAlteracaoRepo::count_by_moto(&tx, id)?;
        if dependents > 0 {
            return Err(StoreError::Conflict(format!(
                "Moto com ID {id} possui registros associados e não pode ser excluída. \
                 Considere inativá-la ou remover os registros dependentes primeiro."
            )));
        }
        let _ = MotoRepo::delete(&tx, id)?;
        tx.commit()?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cameras
    // ─────────────────────────────────────────────────────────────────────

    /// Create a camera.
    pub fn create_camera(&self, input: &NewCamera) -> Result<CameraRow> {
        validate::require("localizacao", &input.localizacao)?;
        validate::len_range("localizacao", &input.localizacao, 3, 100)?;
        if let Some(status) = &input.status {
            validate::len_range("status", status, 3, 20)?;
        }

        let conn = self.conn()?;
        CameraRepo::create(
            &conn,
            &CreateCameraOptions {
                localizacao: &input.localizacao,
                status: input.status.as_deref(),
            },
        )
    }

    /// Get a camera by id.
    pub fn get_camera(&self, id: i64) -> Result<CameraRow> {
        let conn = self.conn()?;
        CameraRepo::get_by_id(&conn, id)?.ok_or(StoreError::NotFound {
            entity: "Câmera",
            id,
        })
    }

    /// List cameras.
    pub fn list_cameras(&self, opts: &ListCamerasOptions<'_>) -> Result<Vec<CameraRow>> {
        let conn = self.conn()?;
        CameraRepo::list(&conn, opts)
    }

    /// Apply a partial update to a camera.
    ///
    /// `ultima_verificacao` refreshes only when localizacao or status
    /// actually change; a no-op patch performs no write at all.
    pub fn update_camera(&self, id: i64, patch: &CameraPatch) -> Result<CameraRow> {
        if let Some(localizacao) = &patch.localizacao {
            validate::len_range("localizacao", localizacao, 3, 100)?;
        }
        if let Some(status) = &patch.status {
            validate::len_range("status", status, 3, 20)?;
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut row = CameraRepo::get_by_id(&tx, id)?.ok_or(StoreError::NotFound {
            entity: "Câmera",
            id,
        })?;

        let mut changed = false;
        if let Some(localizacao) = &patch.localizacao {
            if *localizacao != row.localizacao {
                row.localizacao = localizacao.clone();
                changed = true;
            }
        }
        if let Some(status) = &patch.status {
            if *status != row.status {
                row.status = status.clone();
                changed = true;
            }
        }

        if changed {
            row.ultima_verificacao = chrono::Utc::now().to_rfc3339();
            let _ = CameraRepo::update(&tx, &row)?;
        }
        tx.commit()?;
        Ok(row)
    }

    /// Delete a camera. Blocked while any reconhecimento references it.
    pub fn delete_camera(&self, id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !CameraRepo::exists(&tx, id)? {
            return Err(StoreError::NotFound {
                entity: "Câmera",
                id,
            });
        }
        if ReconhecimentoRepo::count_by_camera(&tx, id)? > 0 {
            return Err(StoreError::Conflict(format!(
                "Câmera com ID {id} está em uso por Reconhecimentos e não pode ser excluída."
            )));
        }
        let _ = CameraRepo::delete(&tx, id)?;
        tx.commit()?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reconhecimentos
    // ─────────────────────────────────────────────────────────────────────

    /// Create a reconhecimento.
    pub fn create_reconhecimento(&self, input: &NewReconhecimento) -> Result<ReconhecimentoRow> {
        validate::unit_interval("precisao", input.precisao)?;
        validate::unit_interval("confianca_minima", input.confianca_minima)?;
        validate::require("imagem_capturada", &input.imagem_capturada)?;
        validate::max_len("imagem_capturada", &input.imagem_capturada, 255)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !MotoRepo::exists(&tx, input.id_moto)? {
            return Err(StoreError::ReferenceNotFound {
                entity: "Moto",
                id: input.id_moto,
            });
        }
        if !CameraRepo::exists(&tx, input.id_camera)? {
            return Err(StoreError::ReferenceNotFound {
                entity: "Câmera",
                id: input.id_camera,
            });
        }
        let row = ReconhecimentoRepo::create(
            &tx,
            &CreateReconhecimentoOptions {
                id_moto: input.id_moto,
                id_camera: input.id_camera,
                precisao: input.precisao,
                imagem_capturada: &input.imagem_capturada,
                confianca_minima: input.confianca_minima,
                data_hora: input.data_hora.as_deref(),
            },
        )?;
        tx.commit()?;
        Ok(row)
    }

    /// Get a reconhecimento by id.
    pub fn get_reconhecimento(&self, id: i64) -> Result<ReconhecimentoRow> {
        let conn = self.conn()?;
        ReconhecimentoRepo::get_by_id(&conn, id)?.ok_or(StoreError::NotFound {
            entity: "Reconhecimento",
            id,
        })
    }

    /// List reconhecimentos.
    pub fn list_reconhecimentos(
        &self,
        opts: &ListReconhecimentosOptions,
    ) -> Result<Vec<ReconhecimentoRow>> {
        let conn = self.conn()?;
        ReconhecimentoRepo::list(&conn, opts)
    }

    /// Apply a partial update to a reconhecimento.
    pub fn update_reconhecimento(
        &self,
        id: i64,
        patch: &ReconhecimentoPatch,
    ) -> Result<ReconhecimentoRow> {
        if let Some(precisao) = patch.precisao {
            validate::unit_interval("precisao", precisao)?;
        }
        if let Some(confianca) = patch.confianca_minima {
            validate::unit_interval("confianca_minima", confianca)?;
        }
        if let Some(imagem) = &patch.imagem_capturada {
            validate::require("imagem_capturada", imagem)?;
            validate::max_len("imagem_capturada", imagem, 255)?;
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut row = ReconhecimentoRepo::get_by_id(&tx, id)?.ok_or(StoreError::NotFound {
            entity: "Reconhecimento",
            id,
        })?;

        if let Some(id_moto) = patch.id_moto {
            if !MotoRepo::exists(&tx, id_moto)? {
                return Err(StoreError::ReferenceNotFound {
                    entity: "Moto",
                    id: id_moto,
                });
            }
            row.id_moto = id_moto;
        }
        if let Some(id_camera) = patch.id_camera {
            if !CameraRepo::exists(&tx, id_camera)? {
                return Err(StoreError::ReferenceNotFound {
                    entity: "Câmera",
                    id: id_camera,
                });
            }
            row.id_camera = id_camera;
        }
        if let Some(precisao) = patch.precisao {
            row.precisao = precisao;
        }
        if let Some(confianca) = patch.confianca_minima {
            row.confianca_minima = confianca;
        }
        if let Some(imagem) = &patch.imagem_capturada {
            row.imagem_capturada = imagem.clone();
        }

        let _ = ReconhecimentoRepo::update(&tx, &row)?;
        tx.commit()?;
        Ok(row)
    }

    /// Delete a reconhecimento. Blocked while any registro references it.
    pub fn delete_reconhecimento(&self, id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !ReconhecimentoRepo::exists(&tx, id)? {
            return Err(StoreError::NotFound {
                entity: "Reconhecimento",
                id,
            });
        }
        if RegistroRepo::count_by_reconhecimento(&tx, id)? > 0 {
            return Err(StoreError::Conflict(format!(
                "Reconhecimento com ID {id} está em uso por Registros. Remova os registros \
                 dependentes ou desassocie o reconhecimento primeiro (definindo \
                 id_reconhecimento como null no registro)."
            )));
        }
        let _ = ReconhecimentoRepo::delete(&tx, id)?;
        tx.commit()?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Registros
    // ─────────────────────────────────────────────────────────────────────

    /// Create a registro.
    pub fn create_registro(&self, input: &NewRegistro) -> Result<RegistroDetail> {
        validate::require("tipo", &input.tipo)?;
        validate::max_len("tipo", &input.tipo, 10)?;
        validate::require("modo_registro", &input.modo_registro)?;
        validate::max_len("modo_registro", &input.modo_registro, 10)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !MotoRepo::exists(&tx, input.id_moto)? {
            return Err(StoreError::ReferenceNotFound {
                entity: "Moto",
                id: input.id_moto,
            });
        }
        if !UsuarioRepo::exists(&tx, input.id_usuario)? {
            return Err(StoreError::ReferenceNotFound {
                entity: "Usuário",
                id: input.id_usuario,
            });
        }
        if let Some(id_rec) = input.id_reconhecimento {
            if !ReconhecimentoRepo::exists(&tx, id_rec)? {
                return Err(StoreError::ReferenceNotFound {
                    entity: "Reconhecimento",
                    id: id_rec,
                });
            }
        }
        let row = RegistroRepo::create(
            &tx,
            &CreateRegistroOptions {
                id_moto: input.id_moto,
                id_usuario: input.id_usuario,
                id_reconhecimento: input.id_reconhecimento,
                tipo: &input.tipo,
                modo_registro: &input.modo_registro,
                data_hora: input.data_hora.as_deref(),
            },
        )?;
        let detail =
            RegistroRepo::get_detail(&tx, row.id_registro)?.ok_or(StoreError::NotFound {
                entity: "Registro",
                id: row.id_registro,
            })?;
        tx.commit()?;
        Ok(detail)
    }

    /// Get a registro by id, with joined display fields.
    pub fn get_registro(&self, id: i64) -> Result<RegistroDetail> {
        let conn = self.conn()?;
        RegistroRepo::get_detail(&conn, id)?.ok_or(StoreError::NotFound {
            entity: "Registro",
            id,
        })
    }

    /// List registros.
    pub fn list_registros(&self, opts: &ListRegistrosOptions<'_>) -> Result<Vec<RegistroDetail>> {
        let conn = self.conn()?;
        RegistroRepo::list(&conn, opts)
    }

    /// Apply a partial update to a registro.
    pub fn update_registro(&self, id: i64, patch: &RegistroPatch) -> Result<RegistroDetail> {
        if let Some(tipo) = &patch.tipo {
            validate::require("tipo", tipo)?;
            validate::max_len("tipo", tipo, 10)?;
        }
        if let Some(modo) = &patch.modo_registro {
            validate::require("modo_registro", modo)?;
            validate::max_len("modo_registro", modo, 10)?;
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut row = RegistroRepo::get_by_id(&tx, id)?.ok_or(StoreError::NotFound {
            entity: "Registro",
            id,
        })?;

        if let Some(id_moto) = patch.id_moto {
            if !MotoRepo::exists(&tx, id_moto)? {
                return Err(StoreError::ReferenceNotFound {
                    entity: "Moto",
                    id: id_moto,
                });
            }
            row.id_moto = id_moto;
        }
        if let Some(id_usuario) = patch.id_usuario {
            if !UsuarioRepo::exists(&tx, id_usuario)? {
                return Err(StoreError::ReferenceNotFound {
                    entity: "Usuário",
                    id: id_usuario,
                });
            }
            row.id_usuario = id_usuario;
        }
        if let Some(id_reconhecimento) = patch.id_reconhecimento {
            if let Some(id_rec) = id_reconhecimento {
                if !ReconhecimentoRepo::exists(&tx, id_rec)? {
                    return Err(StoreError::ReferenceNotFound {
                        entity: "Reconhecimento",
                        id: id_rec,
                    });
                }
            }
            row.id_reconhecimento = id_reconhecimento;
        }
        if let Some(tipo) = &patch.tipo {
            row.tipo = tipo.clone();
        }
        if let Some(modo) = &patch.modo_registro {
            row.modo_registro = modo.clone();
        }

        let _ = RegistroRepo::update(&tx, &row)?;
        let detail = RegistroRepo::get_detail(&tx, id)?.ok_or(StoreError::NotFound {
            entity: "Registro",
            id,
        })?;
        tx.commit()?;
        Ok(detail)
    }

    /// Delete a registro. Nothing references registros, so no guard applies.
    pub fn delete_registro(&self, id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !RegistroRepo::delete(&tx, id)? {
            return Err(StoreError::NotFound {
                entity: "Registro",
                id,
            });
        }
        tx.commit()?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Log de alterações
    // ─────────────────────────────────────────────────────────────────────

    /// Append a change-log entry. The trail is append-only: no update or
    /// delete exists for logs.
    pub fn create_log(&self, input: &NewLogAlteracao) -> Result<LogAlteracaoRow> {
        validate::require("tipo_acao", &input.tipo_acao)?;
        validate::max_len("tipo_acao", &input.tipo_acao, 10)?;
        validate::require("campo_alterado", &input.campo_alterado)?;
        validate::max_len("campo_alterado", &input.campo_alterado, 50)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !UsuarioRepo::exists(&tx, input.id_usuario)? {
            return Err(StoreError::ReferenceNotFound {
                entity: "Usuário",
                id: input.id_usuario,
            });
        }
        if !MotoRepo::exists(&tx, input.id_moto)? {
            return Err(StoreError::ReferenceNotFound {
                entity: "Moto",
                id: input.id_moto,
            });
        }
        let row = LogAlteracaoRepo::create(
            &tx,
            &CreateLogOptions {
                id_usuario: input.id_usuario,
                id_moto: input.id_moto,
                tipo_acao: &input.tipo_acao,
                campo_alterado: &input.campo_alterado,
                valor_antigo: input.valor_antigo.as_deref(),
                valor_novo: input.valor_novo.as_deref(),
                data_hora: input.data_hora.as_deref(),
            },
        )?;
        tx.commit()?;
        Ok(row)
    }

    /// Get a log entry by id.
    pub fn get_log(&self, id: i64) -> Result<LogAlteracaoRow> {
        let conn = self.conn()?;
        LogAlteracaoRepo::get_by_id(&conn, id)?.ok_or(StoreError::NotFound {
            entity: "Log",
            id,
        })
    }

    /// List log entries.
    pub fn list_logs(&self, opts: &ListLogsOptions<'_>) -> Result<Vec<LogAlteracaoRow>> {
        let conn = self.conn()?;
        LogAlteracaoRepo::list(&conn, opts)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
