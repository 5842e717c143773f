//! 存储层测试辅助：内存 SQLite + 真实迁移

use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database};

use super::SeaOrmStorage;
use crate::models::{
    classes::{entities::Class, requests::CreateClassRequest},
    subjects::{entities::Subject, requests::CreateSubjectRequest},
    users::{
        entities::{User, UserRole},
        requests::CreateUserRequest,
    },
};

/// 单连接的内存数据库，事务内只能使用事务连接
pub(crate) async fn memory_storage() -> SeaOrmStorage {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    SeaOrmStorage::from_connection(db)
}

pub(crate) async fn create_user(storage: &SeaOrmStorage, email: &str, role: UserRole) -> User {
    storage
        .create_user_impl(CreateUserRequest {
            email: email.to_string(),
            password: "not-a-real-hash".to_string(),
            full_name: email.split('@').next().unwrap_or(email).to_string(),
            phone: None,
            role,
        })
        .await
        .unwrap()
}

pub(crate) async fn create_class(storage: &SeaOrmStorage, name: &str) -> Class {
    storage
        .create_class_impl(CreateClassRequest {
            name: name.to_string(),
            description: None,
            grade_level: Some("5".to_string()),
            academic_year: Some("2024-2025".to_string()),
        })
        .await
        .unwrap()
}

pub(crate) async fn create_subject(storage: &SeaOrmStorage, name: &str) -> Subject {
    storage
        .create_subject_impl(CreateSubjectRequest {
            name: name.to_string(),
            code: None,
            description: None,
        })
        .await
        .unwrap()
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
