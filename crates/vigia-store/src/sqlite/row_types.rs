//! Database row types for mapping between `SQLite` rows and Rust structs.
//!
//! Plain row structs mirror one table each. The `*Detail` variants add the
//! denormalized one-hop display fields (e.g. a registro carrying its moto's
//! placa) built via joins in the repository layer — copied into the response,
//! never persisted redundantly.

use serde::{Deserialize, Serialize};

/// Raw cargo (role) row from the `cargos` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CargoRow {
    /// Cargo id.
    pub id_cargo: i64,
    /// Role name (unique, case-insensitive).
    pub nome: String,
    /// Permission level, 1–5.
    pub nivel_permissao: i64,
    /// Opaque serialized permission list.
    pub permissoes: String,
    /// Creation timestamp.
    pub data_cadastro: String,
}

/// Raw usuario row from the `usuarios` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UsuarioRow {
    /// Usuario id.
    pub id_usuario: i64,
    /// Display name.
    pub nome: String,
    /// Email (unique, case-insensitive).
    pub email: String,
    /// Opaque credential, stored as given.
    pub senha: String,
    /// Owning cargo id.
    pub id_cargo: i64,
    /// Active flag ("Sim"/"Não").
    pub ativo: String,
}

/// Usuario plus its cargo's display name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UsuarioDetail {
    /// Usuario id.
    pub id_usuario: i64,
    /// Display name.
    pub nome: String,
    /// Email.
    pub email: String,
    /// Owning cargo id.
    pub id_cargo: i64,
    /// Denormalized cargo name.
    pub cargo_nome: String,
    /// Active flag ("Sim"/"Não").
    pub ativo: String,
}

/// Raw moto (vehicle) row from the `motos` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MotoRow {
    /// Moto id.
    pub id_moto: i64,
    /// License plate (unique, 7 characters, stored upper-cased).
    pub placa: String,
    /// Brand.
    pub marca: String,
    /// Model.
    pub modelo: String,
    /// Color.
    pub cor: String,
    /// Presence flag ("Sim"/"Não").
    pub presente: String,
    /// Optional reference-image path.
    pub imagem_referencia: Option<String>,
}

/// Raw camera row from the `cameras` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CameraRow {
    /// Camera id.
    pub id_camera: i64,
    /// Location label.
    pub localizacao: String,
    /// Free-text status (default "ativo").
    pub status: String,
    /// Refreshed whenever status or localizacao changes.
    pub ultima_verificacao: String,
}

/// Raw reconhecimento (recognition event) row.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReconhecimentoRow {
    /// Reconhecimento id.
    pub id_reconhecimento: i64,
    /// Recognized moto.
    pub id_moto: i64,
    /// Capturing camera.
    pub id_camera: i64,
    /// Event timestamp.
    pub data_hora: String,
    /// Precision score in [0,1].
    pub precisao: f64,
    /// Captured-image path.
    pub imagem_capturada: String,
    /// Minimum-confidence threshold in [0,1].
    pub confianca_minima: f64,
}

/// Raw registro (entry/exit registration) row.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistroRow {
    /// Registro id.
    pub id_registro: i64,
    /// Registered moto.
    pub id_moto: i64,
    /// Registering usuario.
    pub id_usuario: i64,
    /// Associated reconhecimento (null for manual registrations).
    pub id_reconhecimento: Option<i64>,
    /// Registration timestamp.
    pub data_hora: String,
    /// "entrada" or "saida".
    pub tipo: String,
    /// "automatico" or "manual".
    pub modo_registro: String,
}

/// Registro plus one-hop display fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistroDetail {
    /// Registro id.
    pub id_registro: i64,
    /// Registered moto.
    pub id_moto: i64,
    /// Denormalized moto plate.
    pub moto_placa: String,
    /// Registering usuario.
    pub id_usuario: i64,
    /// Denormalized usuario name.
    pub usuario_nome: String,
    /// Associated reconhecimento, if any.
    pub id_reconhecimento: Option<i64>,
    /// Location of the reconhecimento's camera, if any.
    pub reconhecimento_camera_localizacao: Option<String>,
    /// Precision of the associated reconhecimento, if any.
    pub reconhecimento_precisao: Option<f64>,
    /// Registration timestamp.
    pub data_hora: String,
    /// "entrada" or "saida".
    pub tipo: String,
    /// "automatico" or "manual".
    pub modo_registro: String,
}

/// Raw log row from the `log_alteracoes` audit trail.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogAlteracaoRow {
    /// Log id.
    pub id_log: i64,
    /// Acting usuario.
    pub id_usuario: i64,
    /// Affected moto.
    pub id_moto: i64,
    /// Change timestamp.
    pub data_hora: String,
    /// Action-type code.
    pub tipo_acao: String,
    /// Name of the changed field.
    pub campo_alterado: String,
    /// Previous value, if any.
    pub valor_antigo: Option<String>,
    /// New value, if any.
    pub valor_novo: Option<String>,
}
