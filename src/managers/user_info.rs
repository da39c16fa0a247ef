use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::cache::{Cache, CacheOptions, keys};
use crate::database::{NewUserInfo, UserInfo, UserInfoRepository};
use crate::error::AppError;

/// 新增/更新用户信息的请求体，两个字段都必填
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddOrUpdateUserInfoRequest {
    pub name: String,
    pub address: String,
}

impl AddOrUpdateUserInfoRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::InvalidRequest("The Name field is required.".into()));
        }
        if self.address.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "The Address field is required.".into(),
            ));
        }
        Ok(())
    }

    fn to_new_user_info(&self) -> NewUserInfo {
        NewUserInfo {
            name: self.name.clone(),
            address: self.address.clone(),
        }
    }
}

/// 用户信息管理器
///
/// 列表读取走读穿缓存；写操作在同一把互斥锁内完成
/// 校验、持久化和缓存失效，防止并发写竞态通过唯一性检查。
pub struct UserInfoManager {
    repository: Arc<dyn UserInfoRepository>,
    cache: Arc<dyn Cache<Vec<UserInfo>>>,
    cache_options: CacheOptions,
    write_lock: Mutex<()>,
}

impl UserInfoManager {
    pub fn new(
        repository: Arc<dyn UserInfoRepository>,
        cache: Arc<dyn Cache<Vec<UserInfo>>>,
        cache_options: CacheOptions,
    ) -> Self {
        Self {
            repository,
            cache,
            cache_options,
            write_lock: Mutex::new(()),
        }
    }

    /// 获取全部用户信息，优先返回缓存的列表
    pub async fn get_user_info(&self) -> Result<Vec<UserInfo>, AppError> {
        if let Some(cached) = self.cache.get(keys::USERINFO_LIST).await? {
            tracing::debug!("Returning user info list from cache");
            return Ok(cached);
        }

        let user_infos = self.repository.list_all().await?;

        // 空列表不缓存
        if !user_infos.is_empty() {
            self.cache
                .set(keys::USERINFO_LIST, user_infos.clone(), self.cache_options)
                .await?;
            tracing::debug!("Cached {} user info records", user_infos.len());
        }

        Ok(user_infos)
    }

    /// 新增用户信息，返回数据库分配的 Id
    pub async fn add_user_info(&self, request: AddOrUpdateUserInfoRequest) -> Result<i32, AppError> {
        request.validate()?;

        let _guard = self.write_lock.lock().await;

        if self.repository.exists_by_name(&request.name).await? {
            return Err(AppError::DuplicateName);
        }

        let id = self.repository.insert(request.to_new_user_info()).await?;
        self.cache.remove(keys::USERINFO_LIST).await?;

        Ok(id)
    }

    /// 更新指定 Id 的用户信息
    pub async fn update_user_info(
        &self,
        request: AddOrUpdateUserInfoRequest,
        id: i32,
    ) -> Result<(), AppError> {
        request.validate()?;

        let _guard = self.write_lock.lock().await;

        if !self.repository.exists_by_id(id).await? {
            return Err(AppError::NotFound);
        }

        // 名字没变时跳过唯一性检查，避免和自身记录误判冲突
        let current_name = self.repository.name_by_id(id).await?;
        if current_name != request.name && self.repository.exists_by_name(&request.name).await? {
            return Err(AppError::DuplicateName);
        }

        self.repository
            .update_by_id(id, request.to_new_user_info())
            .await?;
        self.cache.remove(keys::USERINFO_LIST).await?;

        Ok(())
    }

    /// 删除指定 Id 的用户信息
    pub async fn delete_user_info(&self, id: i32) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        if !self.repository.exists_by_id(id).await? {
            return Err(AppError::NotFound);
        }

        self.repository.delete_by_id(id).await?;
        self.cache.remove(keys::USERINFO_LIST).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::cache::MemoryCache;

    struct MockRepository {
        user_infos: StdMutex<Vec<UserInfo>>,
        next_id: AtomicI32,
        list_calls: AtomicUsize,
        name_checks: AtomicUsize,
        insert_calls: AtomicUsize,
        update_calls: AtomicUsize,
        delete_calls: AtomicUsize,
    }

    impl MockRepository {
        fn new(user_infos: Vec<UserInfo>) -> Self {
            let next_id = user_infos.iter().map(|u| u.id).max().unwrap_or(0) + 1;
            Self {
                user_infos: StdMutex::new(user_infos),
                next_id: AtomicI32::new(next_id),
                list_calls: AtomicUsize::new(0),
                name_checks: AtomicUsize::new(0),
                insert_calls: AtomicUsize::new(0),
                update_calls: AtomicUsize::new(0),
                delete_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl UserInfoRepository for MockRepository {
        async fn list_all(&self) -> Result<Vec<UserInfo>, sqlx::Error> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.user_infos.lock().unwrap().clone())
        }

        async fn exists_by_id(&self, id: i32) -> Result<bool, sqlx::Error> {
            Ok(self.user_infos.lock().unwrap().iter().any(|u| u.id == id))
        }

        async fn exists_by_name(&self, name: &str) -> Result<bool, sqlx::Error> {
            self.name_checks.fetch_add(1, Ordering::SeqCst);
            Ok(self.user_infos.lock().unwrap().iter().any(|u| u.name == name))
        }

        async fn name_by_id(&self, id: i32) -> Result<String, sqlx::Error> {
            self.user_infos
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == id)
                .map(|u| u.name.clone())
                .ok_or(sqlx::Error::RowNotFound)
        }

        async fn insert(&self, user_info: NewUserInfo) -> Result<i32, sqlx::Error> {
            self.insert_calls.fetch_add(1, Ordering::SeqCst);
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.user_infos.lock().unwrap().push(UserInfo {
                id,
                name: user_info.name,
                address: user_info.address,
            });
            Ok(id)
        }

        async fn update_by_id(&self, id: i32, user_info: NewUserInfo) -> Result<(), sqlx::Error> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            let mut user_infos = self.user_infos.lock().unwrap();
            let record = user_infos
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or(sqlx::Error::RowNotFound)?;
            record.name = user_info.name;
            record.address = user_info.address;
            Ok(())
        }

        async fn delete_by_id(&self, id: i32) -> Result<(), sqlx::Error> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            self.user_infos.lock().unwrap().retain(|u| u.id != id);
            Ok(())
        }
    }

    fn sample_user_infos() -> Vec<UserInfo> {
        vec![
            UserInfo {
                id: 1,
                name: "ABC Company".to_string(),
                address: "12 Cambrige St".to_string(),
            },
            UserInfo {
                id: 2,
                name: "gtp LTD".to_string(),
                address: "789 Olive St".to_string(),
            },
        ]
    }

    fn request(name: &str, address: &str) -> AddOrUpdateUserInfoRequest {
        AddOrUpdateUserInfoRequest {
            name: name.to_string(),
            address: address.to_string(),
        }
    }

    fn setup(
        user_infos: Vec<UserInfo>,
    ) -> (
        Arc<MockRepository>,
        Arc<MemoryCache<Vec<UserInfo>>>,
        UserInfoManager,
    ) {
        let repository = Arc::new(MockRepository::new(user_infos));
        let cache = Arc::new(MemoryCache::new());
        let manager = UserInfoManager::new(
            repository.clone(),
            cache.clone(),
            CacheOptions::default(),
        );
        (repository, cache, manager)
    }

    #[tokio::test]
    async fn get_user_info_on_cache_miss_returns_records_in_storage_order() {
        let (_, _, manager) = setup(sample_user_infos());

        let actual = manager.get_user_info().await.unwrap();

        assert_eq!(actual, sample_user_infos());
    }

    #[tokio::test]
    async fn get_user_info_calls_repository_once_and_serves_second_call_from_cache() {
        let (repository, _, manager) = setup(sample_user_infos());

        let first = manager.get_user_info().await.unwrap();
        let second = manager.get_user_info().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(repository.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_user_info_with_populated_cache_never_calls_repository() {
        let (repository, cache, manager) = setup(vec![]);
        cache
            .set(keys::USERINFO_LIST, sample_user_infos(), CacheOptions::default())
            .await
            .unwrap();

        let actual = manager.get_user_info().await.unwrap();

        assert_eq!(actual, sample_user_infos());
        assert_eq!(repository.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn get_user_info_does_not_cache_empty_result() {
        let (repository, cache, manager) = setup(vec![]);

        let actual = manager.get_user_info().await.unwrap();

        assert!(actual.is_empty());
        assert_eq!(cache.get(keys::USERINFO_LIST).await.unwrap(), None);
        // 第二次读取仍然落到存储库
        manager.get_user_info().await.unwrap();
        assert_eq!(repository.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn add_user_info_with_existing_name_fails_and_never_inserts() {
        let (repository, _, manager) = setup(sample_user_infos());

        let err = manager
            .add_user_info(request("ABC Company", "1 Main St"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DuplicateName));
        assert_eq!(repository.insert_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn add_user_info_with_new_name_inserts_evicts_cache_and_returns_id() {
        let (repository, cache, manager) = setup(sample_user_infos());
        manager.get_user_info().await.unwrap();
        assert!(cache.get(keys::USERINFO_LIST).await.unwrap().is_some());

        let id = manager
            .add_user_info(request("Omega Solutions", "21 Fitzgibson St"))
            .await
            .unwrap();

        assert_eq!(id, 3);
        assert_eq!(repository.insert_calls.load(Ordering::SeqCst), 1);
        let stored = repository.user_infos.lock().unwrap().clone();
        assert!(
            stored
                .iter()
                .any(|u| u.name == "Omega Solutions" && u.address == "21 Fitzgibson St")
        );
        assert_eq!(cache.get(keys::USERINFO_LIST).await.unwrap(), None);
    }

    #[tokio::test]
    async fn add_user_info_with_empty_name_is_rejected() {
        let (repository, _, manager) = setup(vec![]);

        let err = manager.add_user_info(request("", "21 Fitzgibson St")).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert_eq!(repository.insert_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn update_user_info_on_nonexistent_id_fails_and_performs_no_writes() {
        let (repository, _, manager) = setup(sample_user_infos());

        let err = manager
            .update_user_info(request("Omega Solutions", "21 Fitzgibson St"), 99)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound));
        assert_eq!(repository.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn update_user_info_with_unchanged_name_skips_uniqueness_check_and_persists() {
        let (repository, _, manager) = setup(sample_user_infos());

        manager
            .update_user_info(request("ABC Company", "55 New Address Ave"), 1)
            .await
            .unwrap();

        assert_eq!(repository.name_checks.load(Ordering::SeqCst), 0);
        assert_eq!(repository.update_calls.load(Ordering::SeqCst), 1);
        let stored = repository.user_infos.lock().unwrap().clone();
        assert_eq!(stored[0].address, "55 New Address Ave");
    }

    #[tokio::test]
    async fn update_user_info_with_colliding_name_fails() {
        let (repository, _, manager) = setup(sample_user_infos());

        let err = manager
            .update_user_info(request("gtp LTD", "12 Cambrige St"), 1)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DuplicateName));
        assert_eq!(repository.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn update_user_info_with_new_unique_name_persists_and_evicts_cache() {
        let (repository, cache, manager) = setup(sample_user_infos());
        manager.get_user_info().await.unwrap();

        manager
            .update_user_info(request("Omega Solutions", "21 Fitzgibson St"), 1)
            .await
            .unwrap();

        assert_eq!(repository.update_calls.load(Ordering::SeqCst), 1);
        let stored = repository.user_infos.lock().unwrap().clone();
        assert_eq!(stored[0].name, "Omega Solutions");
        assert_eq!(cache.get(keys::USERINFO_LIST).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_user_info_on_nonexistent_id_fails() {
        let (repository, _, manager) = setup(sample_user_infos());

        let err = manager.delete_user_info(99).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound));
        assert_eq!(repository.delete_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delete_user_info_deletes_record_and_evicts_cache() {
        let (repository, cache, manager) = setup(sample_user_infos());
        manager.get_user_info().await.unwrap();

        manager.delete_user_info(1).await.unwrap();

        assert_eq!(repository.delete_calls.load(Ordering::SeqCst), 1);
        let stored = repository.user_infos.lock().unwrap().clone();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, 2);
        assert_eq!(cache.get(keys::USERINFO_LIST).await.unwrap(), None);
    }
}
