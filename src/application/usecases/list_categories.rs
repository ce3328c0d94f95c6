use std::sync::Arc;

use crate::domain::{models::Category, repositories::CategoryRepository};

pub struct ListCategoriesUseCase {
    repo: Arc<dyn CategoryRepository>,
}

impl ListCategoriesUseCase {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self) -> anyhow::Result<Vec<Category>> {
        self.repo.list_active().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::in_memory::InMemoryCategoryRepository;

    #[tokio::test]
    async fn inactive_categories_are_hidden() {
        let repo = Arc::new(InMemoryCategoryRepository::new());
        let mut retired = Category::active("Pagers", "Legacy devices", None);
        retired.is_active = false;
        repo.insert_many(&[Category::active("Laptops", "Laptops and notebooks", None), retired])
            .await
            .unwrap();

        let categories = ListCategoriesUseCase::new(repo).execute().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Laptops");
    }
}
