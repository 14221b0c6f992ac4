//! Baseline dataset seeding.
//!
//! Inserts five records per entity type through the public [`FleetStore`]
//! operations — no privileged writes, so seeded data passes the same
//! validation and integrity checks as any caller's. Each entity type is
//! guarded by an "any rows exist" check, which makes the seeder idempotent
//! and safe to run on every startup.

use chrono::{Duration, Utc};
use tracing::info;

use crate::errors::Result;
use crate::sqlite::repositories::camera::ListCamerasOptions;
use crate::sqlite::repositories::cargo::ListCargosOptions;
use crate::sqlite::repositories::log_alteracao::ListLogsOptions;
use crate::sqlite::repositories::reconhecimento::ListReconhecimentosOptions;
use crate::sqlite::repositories::registro::ListRegistrosOptions;
use crate::sqlite::repositories::usuario::ListUsuariosOptions;
use crate::store::fleet_store::{
    FleetStore, NewCamera, NewCargo, NewLogAlteracao, NewMoto, NewRegistro, NewReconhecimento,
    NewUsuario,
};

/// Seed the baseline dataset. Entity types that already hold rows are left
/// untouched.
pub fn seed_baseline(store: &FleetStore) -> Result<()> {
    seed_cargos(store)?;
    seed_usuarios(store)?;
    seed_motos(store)?;
    seed_cameras(store)?;
    seed_reconhecimentos(store)?;
    seed_registros(store)?;
    seed_logs(store)?;
    Ok(())
}

fn ago(duration: Duration) -> String {
    (Utc::now() - duration).to_rfc3339()
}

fn seed_cargos(store: &FleetStore) -> Result<()> {
    let probe = ListCargosOptions {
        take: Some(1),
        ..Default::default()
    };
    if !store.list_cargos(&probe)?.is_empty() {
        return Ok(());
    }
    let cargos = [
        ("ADMIN", 5, r#"["create","read","update","delete"]"#),
        ("OPERADOR", 3, r#"["read","update"]"#),
        ("MANUTENCAO", 2, r#"["read","update_status"]"#),
        ("VISITANTE", 1, r#"["read"]"#),
        ("AUDITOR", 4, r#"["read","create_log","read_log"]"#),
    ];
    for (nome, nivel_permissao, permissoes) in cargos {
        let _ = store.create_cargo(&NewCargo {
            nome: nome.to_string(),
            nivel_permissao,
            permissoes: permissoes.to_string(),
        })?;
    }
    info!(count = cargos.len(), "seeded cargos");
    Ok(())
}

fn cargo_id_by_nome(store: &FleetStore, nome: &str) -> Result<Option<i64>> {
    let found = store.list_cargos(&ListCargosOptions {
        nome_contains: Some(nome),
        ..Default::default()
    })?;
    Ok(found
        .into_iter()
        .find(|c| c.nome.eq_ignore_ascii_case(nome))
        .map(|c| c.id_cargo))
}

fn seed_usuarios(store: &FleetStore) -> Result<()> {
    let probe = ListUsuariosOptions {
        take: Some(1),
        ..Default::default()
    };
    if !store.list_usuarios(&probe)?.is_empty() {
        return Ok(());
    }
    let usuarios = [
        ("João Silva", "joao@ex.com", "$2y$12$hash1...", "ADMIN"),
        ("Maria Souza", "maria@ex.com", "$2y$12$hash2...", "OPERADOR"),
        ("Paulo Costa", "paulo@ex.com", "$2y$12$hash3...", "MANUTENCAO"),
        ("Ana Pereira", "ana@ex.com", "$2y$12$hash4...", "VISITANTE"),
        ("Carlos Lima", "carlos@ex.com", "$2y$12$hash5...", "AUDITOR"),
    ];
    for (nome, email, senha, cargo) in usuarios {
        let Some(id_cargo) = cargo_id_by_nome(store, cargo)? else {
            continue;
        };
        let _ = store.create_usuario(&NewUsuario {
            nome: nome.to_string(),
            email: email.to_string(),
            senha: senha.to_string(),
            id_cargo,
            ativo: Some("Sim".to_string()),
        })?;
    }
    info!(count = usuarios.len(), "seeded usuarios");
    Ok(())
}

fn seed_motos(store: &FleetStore) -> Result<()> {
    let probe = crate::sqlite::repositories::moto::ListMotosOptions {
        take: Some(1),
        ..Default::default()
    };
    if !store.list_motos(&probe)?.is_empty() {
        return Ok(());
    }
    let motos = [
        ("ABC1234", "Honda", "CB 500", "Preta", "Sim", "ref1.jpg"),
        ("DEF5678", "Yamaha", "YBR 125", "Vermelha", "Não", "ref2.jpg"),
        ("GHI9012", "Suzuki", "GSR 750", "Azul", "Sim", "ref3.jpg"),
        ("JKL3456", "Kawasaki", "Ninja 400", "Verde", "Sim", "ref4.jpg"),
        ("MNO7890", "Ducati", "Monster", "Branca", "Não", "ref5.jpg"),
    ];
    for (placa, marca, modelo, cor, presente, imagem) in motos {
        let _ = store.create_moto(&NewMoto {
            placa: placa.to_string(),
            marca: marca.to_string(),
            modelo: modelo.to_string(),
            cor: cor.to_string(),
            presente: Some(presente.to_string()),
            imagem_referencia: Some(imagem.to_string()),
        })?;
    }
    info!(count = motos.len(), "seeded motos");
    Ok(())
}

fn seed_cameras(store: &FleetStore) -> Result<()> {
    let probe = ListCamerasOptions {
        take: Some(1),
        ..Default::default()
    };
    if !store.list_cameras(&probe)?.is_empty() {
        return Ok(());
    }
    let cameras = [
        ("Portão de Entrada", "ativo"),
        ("Área Interna 1", "manutencao"),
        ("Garagem Norte", "ativo"),
        ("Garagem Sul", "inativo"),
        ("Saída", "ativo"),
    ];
    for (localizacao, status) in cameras {
        let _ = store.create_camera(&NewCamera {
            localizacao: localizacao.to_string(),
            status: Some(status.to_string()),
        })?;
    }
    info!(count = cameras.len(), "seeded cameras");
    Ok(())
}

fn camera_id_by_localizacao(store: &FleetStore, localizacao: &str) -> Result<Option<i64>> {
    let cameras = store.list_cameras(&ListCamerasOptions::default())?;
    Ok(cameras
        .into_iter()
        .find(|c| c.localizacao == localizacao)
        .map(|c| c.id_camera))
}

fn moto_id_by_placa(store: &FleetStore, placa: &str) -> Result<Option<i64>> {
    Ok(store.get_moto_by_placa(placa)?.map(|m| m.id_moto))
}

fn usuario_id_by_email(store: &FleetStore, email: &str) -> Result<Option<i64>> {
    let usuarios = store.list_usuarios(&ListUsuariosOptions::default())?;
    Ok(usuarios
        .into_iter()
        .find(|u| u.email.eq_ignore_ascii_case(email))
        .map(|u| u.id_usuario))
}

fn reconhecimento_id_by_moto(store: &FleetStore, id_moto: i64) -> Result<Option<i64>> {
    let recs = store.list_reconhecimentos(&ListReconhecimentosOptions {
        id_moto: Some(id_moto),
        take: Some(1),
        ..Default::default()
    })?;
    Ok(recs.first().map(|r| r.id_reconhecimento))
}

fn seed_reconhecimentos(store: &FleetStore) -> Result<()> {
    let probe = ListReconhecimentosOptions {
        take: Some(1),
        ..Default::default()
    };
    if !store.list_reconhecimentos(&probe)?.is_empty() {
        return Ok(());
    }
    let eventos = [
        ("ABC1234", "Portão de Entrada", 0.9523, 0.8, "rec1.jpg", 1i64),
        ("DEF5678", "Garagem Norte", 0.8734, 0.85, "rec2.jpg", 2),
        ("GHI9012", "Portão de Entrada", 0.9101, 0.9, "rec3.jpg", 3),
        ("JKL3456", "Saída", 0.7822, 0.75, "rec4.jpg", 4),
        ("MNO7890", "Área Interna 1", 0.9955, 0.95, "rec5.jpg", 5),
    ];
    for (placa, localizacao, precisao, confianca_minima, imagem, horas) in eventos {
        let (Some(id_moto), Some(id_camera)) = (
            moto_id_by_placa(store, placa)?,
            camera_id_by_localizacao(store, localizacao)?,
        ) else {
            continue;
        };
        let _ = store.create_reconhecimento(&NewReconhecimento {
            id_moto,
            id_camera,
            precisao,
            imagem_capturada: imagem.to_string(),
            confianca_minima,
            data_hora: Some(ago(Duration::hours(horas))),
        })?;
    }
    info!(count = eventos.len(), "seeded reconhecimentos");
    Ok(())
}

fn seed_registros(store: &FleetStore) -> Result<()> {
    let probe = ListRegistrosOptions {
        take: Some(1),
        ..Default::default()
    };
    if !store.list_registros(&probe)?.is_empty() {
        return Ok(());
    }
    // (placa, email, with_reconhecimento, tipo, modo, minutes ago)
    let registros = [
        ("ABC1234", "maria@ex.com", true, "entrada", "automatico", 10i64),
        ("ABC1234", "paulo@ex.com", false, "saida", "manual", 5),
        ("DEF5678", "maria@ex.com", true, "entrada", "automatico", 15),
        ("GHI9012", "carlos@ex.com", true, "entrada", "automatico", 20),
        ("JKL3456", "joao@ex.com", true, "saida", "automatico", 25),
    ];
    for (placa, email, with_rec, tipo, modo, minutos) in registros {
        let (Some(id_moto), Some(id_usuario)) = (
            moto_id_by_placa(store, placa)?,
            usuario_id_by_email(store, email)?,
        ) else {
            continue;
        };
        let id_reconhecimento = if with_rec {
            reconhecimento_id_by_moto(store, id_moto)?
        } else {
            None
        };
        let _ = store.create_registro(&NewRegistro {
            id_moto,
            id_usuario,
            id_reconhecimento,
            tipo: tipo.to_string(),
            modo_registro: modo.to_string(),
            data_hora: Some(ago(Duration::minutes(minutos))),
        })?;
    }
    info!(count = registros.len(), "seeded registros");
    Ok(())
}

fn seed_logs(store: &FleetStore) -> Result<()> {
    let probe = ListLogsOptions {
        take: Some(1),
        ..Default::default()
    };
    if !store.list_logs(&probe)?.is_empty() {
        return Ok(());
    }
    let logs = [
        (
            "joao@ex.com",
            "ABC1234",
            "edicao",
            "cor",
            Some("Preta"),
            Some("Azul"),
            30i64,
        ),
        (
            "maria@ex.com",
            "DEF5678",
            "edicao",
            "modelo",
            Some("YBR 125"),
            Some("YBR 150"),
            35,
        ),
        (
            "paulo@ex.com",
            "GHI9012",
            "edicao",
            "imagem_referencia",
            Some("ref3.jpg"),
            Some("ref3_updated.jpg"),
            40,
        ),
        (
            "carlos@ex.com",
            "JKL3456",
            "insercao",
            "presente",
            None,
            Some("Sim"),
            45,
        ),
        (
            "joao@ex.com",
            "MNO7890",
            "exclusao",
            "imagem_referencia",
            Some("ref5.jpg"),
            None,
            50,
        ),
    ];
    for (email, placa, tipo_acao, campo, antigo, novo, segundos) in logs {
        let (Some(id_usuario), Some(id_moto)) = (
            usuario_id_by_email(store, email)?,
            moto_id_by_placa(store, placa)?,
        ) else {
            continue;
        };
        let _ = store.create_log(&NewLogAlteracao {
            id_usuario,
            id_moto,
            tipo_acao: tipo_acao.to_string(),
            campo_alterado: campo.to_string(),
            valor_antigo: antigo.map(String::from),
            valor_novo: novo.map(String::from),
            data_hora: Some(ago(Duration::seconds(segundos))),
        })?;
    }
    info!(count = logs.len(), "seeded logs");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
