use uuid::Uuid;

use agora_domain::access::{Method, ResourceKind};
use agora_domain::actor::Actor;
use agora_domain::pagination::PageRequest;

use crate::domain::repository::CategoryRepository;
use crate::domain::types::Category;
use crate::error::MarketServiceError;
use crate::usecase::ensure_allowed;

// Categories are world-readable; only admins mutate them.

pub struct ListCategoriesUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> ListCategoriesUseCase<C> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<Category>, MarketServiceError> {
        self.categories.list(page).await
    }
}

pub struct GetCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> GetCategoryUseCase<C> {
    pub async fn execute(&self, id: Uuid) -> Result<Category, MarketServiceError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or(MarketServiceError::CategoryNotFound)
    }
}

pub struct CreateCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> CreateCategoryUseCase<C> {
    pub async fn execute(
        &self,
        actor: &Actor,
        name: String,
        description: Option<String>,
    ) -> Result<Category, MarketServiceError> {
        ensure_allowed(actor, Method::Post, ResourceKind::Categories)?;
        if name.trim().is_empty() {
            return Err(MarketServiceError::MissingData);
        }
        let category = Category {
            id: Uuid::now_v7(),
            name,
            description,
        };
        self.categories.create(&category).await?;
        Ok(category)
    }
}

pub struct UpdateCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> UpdateCategoryUseCase<C> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Category, MarketServiceError> {
        ensure_allowed(actor, Method::Patch, ResourceKind::Categories)?;
        if name.is_none() && description.is_none() {
            return Err(MarketServiceError::MissingData);
        }
        if self.categories.find_by_id(id).await?.is_none() {
            return Err(MarketServiceError::CategoryNotFound);
        }
        self.categories.update(id, name, description).await?;
        self.categories
            .find_by_id(id)
            .await?
            .ok_or(MarketServiceError::CategoryNotFound)
    }
}

pub struct DeleteCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> DeleteCategoryUseCase<C> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> Result<(), MarketServiceError> {
        ensure_allowed(actor, Method::Delete, ResourceKind::Categories)?;
        if !self.categories.delete(id).await? {
            return Err(MarketServiceError::CategoryNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use agora_domain::role::Role;

    struct MockCategoryRepo {
        category: Option<Category>,
        created: Mutex<Option<Category>>,
        deleted: bool,
    }

    impl MockCategoryRepo {
        fn new(category: Option<Category>) -> Self {
            Self {
                category,
                created: Mutex::new(None),
                deleted: true,
            }
        }
    }

    impl CategoryRepository for MockCategoryRepo {
        async fn list(&self, _page: PageRequest) -> Result<Vec<Category>, MarketServiceError> {
            Ok(self.category.clone().into_iter().collect())
        }
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Category>, MarketServiceError> {
            Ok(self.category.clone())
        }
        async fn create(&self, category: &Category) -> Result<(), MarketServiceError> {
            *self.created.lock().unwrap() = Some(category.clone());
            Ok(())
        }
        async fn update(
            &self,
            _id: Uuid,
            _name: Option<&str>,
            _description: Option<&str>,
        ) -> Result<(), MarketServiceError> {
            Ok(())
        }
        async fn delete(&self, _id: Uuid) -> Result<bool, MarketServiceError> {
            Ok(self.deleted)
        }
    }

    #[tokio::test]
    async fn should_create_category_as_admin() {
        let usecase = CreateCategoryUseCase {
            categories: MockCategoryRepo::new(None),
        };
        let admin = Actor::known(Uuid::new_v4(), Role::Admin, true);
        let category = usecase
            .execute(&admin, "Electronics".to_owned(), None)
            .await
            .unwrap();
        assert_eq!(category.name, "Electronics");
        assert!(usecase.categories.created.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn should_forbid_category_creation_to_verified_wholesaler() {
        let usecase = CreateCategoryUseCase {
            categories: MockCategoryRepo::new(None),
        };
        let wholesaler = Actor::known(Uuid::new_v4(), Role::Wholesaler, true);
        let err = usecase
            .execute(&wholesaler, "Electronics".to_owned(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketServiceError::Forbidden));
    }

    #[tokio::test]
    async fn should_reject_empty_update() {
        let usecase = UpdateCategoryUseCase {
            categories: MockCategoryRepo::new(None),
        };
        let admin = Actor::known(Uuid::new_v4(), Role::Admin, true);
        let err = usecase
            .execute(&admin, Uuid::new_v4(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketServiceError::MissingData));
    }

    #[tokio::test]
    async fn should_report_missing_category_on_delete() {
        let mut repo = MockCategoryRepo::new(None);
        repo.deleted = false;
        let usecase = DeleteCategoryUseCase { categories: repo };
        let admin = Actor::known(Uuid::new_v4(), Role::Admin, true);
        let err = usecase.execute(&admin, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, MarketServiceError::CategoryNotFound));
    }
}
