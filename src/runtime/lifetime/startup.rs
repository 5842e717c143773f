use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::users::entities::UserRole;
use crate::models::users::requests::CreateUserRequest;
use crate::storage::Storage;
use crate::utils::password::hash_password;

/// 首次启动时创建的管理员邮箱
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@eduportal.local";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
}

/// 生成随机密码，保证满足密码策略（含大小写字母与数字）
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    let body: String = (0..length.saturating_sub(3))
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect();
    format!(
        "{}{}{}{body}",
        (b'A' + rng.random_range(0..26)) as char,
        (b'a' + rng.random_range(0..26)) as char,
        (b'0' + rng.random_range(0..10)) as char,
    )
}

/// 用户表为空时创建默认管理员
pub async fn seed_admin(storage: &Arc<dyn Storage>) {
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!(
                "Database already has {} user(s), skipping admin seed",
                count
            );
            return;
        }
        Ok(_) => {
            info!("No users found in database, creating default admin account...");
        }
        Err(e) => {
            warn!("Failed to count users: {}, skipping admin seed", e);
            return;
        }
    }

    // 优先使用环境变量中的密码
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password: {}, skipping admin seed", e);
            return;
        }
    };

    let admin_request = CreateUserRequest {
        email: DEFAULT_ADMIN_EMAIL.to_string(),
        password: password_hash,
        full_name: "Administrator".to_string(),
        phone: None,
        role: UserRole::Admin,
    };

    match storage.create_user(admin_request).await {
        Ok(user) => {
            info!(
                "Default admin account created (ID: {}, email: {})",
                user.id, user.email
            );
        }
        Err(e) => {
            warn!("Failed to create admin account: {}", e);
        }
    }
}

/// 准备服务器启动的上下文：加密提供者、存储与迁移、默认管理员
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    seed_admin(&storage).await;

    StartupContext { storage }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::memory_storage;
    use crate::utils::validate::validate_password;

    #[test]
    fn test_generated_password_satisfies_policy() {
        for _ in 0..20 {
            let pwd = generate_random_password(16);
            assert_eq!(pwd.chars().count(), 16);
            assert!(validate_password(&pwd).is_ok());
        }
    }

    #[tokio::test]
    async fn test_seed_admin_only_when_empty() {
        let storage: Arc<dyn Storage> = Arc::new(memory_storage().await);
        seed_admin(&storage).await;
        assert_eq!(storage.count_users_by_role(UserRole::Admin).await.unwrap(), 1);

        // 已有用户时不再创建
        seed_admin(&storage).await;
        assert_eq!(storage.count_users().await.unwrap(), 1);

        let admin = storage
            .get_user_by_email(DEFAULT_ADMIN_EMAIL)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.full_name, "Administrator");
    }
}
