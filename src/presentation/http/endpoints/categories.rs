use std::sync::Arc;

use poem::Result as PoemResult;
use poem_openapi::{OpenApi, payload::Json};

use crate::presentation::http::{
    endpoints::root::{ApiState, EndpointsTags},
    errors::internal_error,
    mappers::map_category,
    responses::CategoryDto,
};

#[derive(Clone)]
pub struct CategoryEndpoints {
    state: Arc<ApiState>,
}

impl CategoryEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl CategoryEndpoints {
    /// Active product categories as a flat list; `parent_id` links the tree.
    #[oai(path = "/categories", method = "get", tag = EndpointsTags::Categories)]
    pub async fn list(&self) -> PoemResult<Json<Vec<CategoryDto>>> {
        let categories = self
            .state
            .list_categories_usecase
            .execute()
            .await
            .map_err(internal_error)?;
        Ok(Json(categories.iter().map(map_category).collect()))
    }
}
