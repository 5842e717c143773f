//! 仪表盘统计

use super::SeaOrmStorage;
use crate::errors::Result;
use crate::models::dashboard::DashboardStats;
use crate::models::users::entities::UserRole;

impl SeaOrmStorage {
    pub async fn get_dashboard_stats_impl(&self) -> Result<DashboardStats> {
        let total_students = self.count_users_by_role_impl(UserRole::Student).await?;
        let total_teachers = self.count_users_by_role_impl(UserRole::Teacher).await?;
        let total_classes = self.count_classes_impl().await?;
        let total_subjects = self.count_subjects_impl().await?;

        Ok(DashboardStats {
            total_students: total_students as i64,
            total_teachers: total_teachers as i64,
            total_classes: total_classes as i64,
            total_subjects: total_subjects as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_class, create_subject, create_user, memory_storage};
    use crate::models::users::entities::UserRole;

    #[tokio::test]
    async fn test_dashboard_counts() {
        let storage = memory_storage().await;
        create_user(&storage, "admin@school.test", UserRole::Admin).await;
        create_user(&storage, "t@school.test", UserRole::Teacher).await;
        create_user(&storage, "s1@school.test", UserRole::Student).await;
        create_user(&storage, "s2@school.test", UserRole::Student).await;
        create_class(&storage, "5A").await;
        create_subject(&storage, "Math").await;

        let stats = storage.get_dashboard_stats_impl().await.unwrap();
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.total_teachers, 1);
        assert_eq!(stats.total_classes, 1);
        assert_eq!(stats.total_subjects, 1);
    }
}
