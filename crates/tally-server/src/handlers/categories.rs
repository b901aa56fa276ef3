//! Category handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use tally_core::models::{Category, NewCategory, TransactionType};

use super::{core_error, non_blank};
use crate::{AppError, AppState};

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub category_type: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryCreatedResponse {
    pub message: String,
    pub category: Category,
}

fn parse_category_type(s: &str) -> Result<TransactionType, AppError> {
    s.parse()
        .map_err(|_| AppError::bad_request("Category type must be income or expense"))
}

/// GET /api/categories - All categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let categories = state.db.list_categories()?;
    Ok(Json(CategoriesResponse { categories }))
}

/// GET /api/categories/:type - Categories of one type (income or expense)
pub async fn list_categories_by_type(
    State(state): State<AppState>,
    Path(category_type): Path<String>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let category_type = parse_category_type(&category_type)?;
    let categories = state.db.list_categories_by_type(category_type)?;
    Ok(Json(CategoriesResponse { categories }))
}

/// POST /api/categories - Create a category
pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryCreatedResponse>), AppError> {
    let (Some(name), Some(category_type)) = (non_blank(&req.name), non_blank(&req.category_type))
    else {
        return Err(AppError::bad_request("Name and type are required"));
    };
    let category_type = parse_category_type(category_type)?;

    let new_category =
        NewCategory::new(name, category_type, req.color.as_deref()).map_err(core_error)?;
    let category = state.db.create_category(&new_category).map_err(core_error)?;

    info!(category = %category.name, "Category created");

    Ok((
        StatusCode::CREATED,
        Json(CategoryCreatedResponse {
            message: "Category created successfully".to_string(),
            category,
        }),
    ))
}
