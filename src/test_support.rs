//! Shared fixtures for storage-backed tests.

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::auth::{generate_access_token, hash_access_token, hash_password};
use crate::models::*;
use crate::repository::{Repository, SqliteRepository};

/// Fresh, migrated in-memory database.
pub async fn memory_repo() -> SqliteRepository {
    SqliteRepository::in_memory()
        .await
        .expect("in-memory sqlite should open and migrate")
}

pub async fn seed_patient(repo: &dyn Repository, first_name: &str) -> PatientRow {
    repo.create_patient(&CreatePatientRequest {
        first_name: first_name.to_string(),
        last_name: "Test".to_string(),
        email: None,
        phone: None,
        birth_date: None,
        notes: None,
    })
    .await
    .expect("seed patient")
}

pub async fn seed_dentist(repo: &dyn Repository, name: &str) -> DentistRow {
    repo.create_dentist(&CreateDentistRequest {
        name: name.to_string(),
        clinic_name: None,
        email: None,
        phone: None,
        specialty: None,
    })
    .await
    .expect("seed dentist")
}

pub async fn seed_procedure(
    repo: &dyn Repository,
    patient_id: Uuid,
    dentist_id: Option<Uuid>,
    procedure_type: &str,
    value: f64,
    on: NaiveDate,
) -> ProcedureRow {
    repo.create_procedure(&CreateProcedureRequest {
        patient_id,
        dentist_id,
        procedure_type: procedure_type.to_string(),
        tooth_number: None,
        value,
        procedure_date: on,
        payment_status: None,
        notes: None,
    })
    .await
    .expect("seed procedure")
}

pub async fn seed_material(
    repo: &dyn Repository,
    name: &str,
    unit_price: f64,
    stock_quantity: i64,
    minimum_stock: Option<i64>,
) -> MaterialRow {
    repo.create_material(&CreateMaterialRequest {
        name: name.to_string(),
        category: None,
        unit: "unit".to_string(),
        unit_price,
        stock_quantity,
        minimum_stock,
        supplier: None,
    })
    .await
    .expect("seed material")
}

pub async fn seed_achievement(repo: &dyn Repository, name: &str, points: i64) -> AchievementRow {
    repo.create_achievement(&CreateAchievementRequest {
        name: name.to_string(),
        description: None,
        point_value: points,
        achievement_type: "MILESTONE".to_string(),
        image_url: None,
    })
    .await
    .expect("seed achievement")
}

/// Creates an account with a live session and returns its bearer token.
pub async fn seed_session(repo: &dyn Repository, username: &str, is_admin: bool) -> String {
    let hash = hash_password("password").expect("hash");
    let user = repo
        .create_user(username, username, &hash, is_admin)
        .await
        .expect("seed user");
    let token = generate_access_token();
    repo.create_session(user.user_id, &hash_access_token(&token), Utc::now() + Duration::hours(1))
        .await
        .expect("seed session");
    token
}
