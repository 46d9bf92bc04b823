use std::sync::Arc;

use crate::comic::{to_category, Category};
use crate::error::Result;
use crate::json;
use crate::transport::{ApiRequest, Transport};

/// Genre category API client
#[derive(Clone)]
pub struct CategoryApi {
    transport: Arc<dyn Transport>,
}

impl CategoryApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn get_all(&self) -> Result<Vec<Category>> {
        let response = self.transport.send(ApiRequest::get("/the-loai")).await?;
        Ok(json::array(json::data(&response), "items")
            .iter()
            .map(to_category)
            .filter(|category| !category.slug.is_empty())
            .collect())
    }
}
