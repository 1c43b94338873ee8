//! # 多言語リソースハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /resource` - 作成
//! - `PUT /resource/{id}` - 値の更新
//! - `DELETE /resource/{id}` - 論理削除
//! - `GET /resource/{id}` - ID で取得
//! - `GET /resource?key&lang_code` - キーと言語コードで取得
//! - `GET /resource/lang/{lang_code}` - 言語コードで一覧
//! - `GET /resources?page&size` - 一覧（ページング）

use std::sync::Arc;

use axum::{
   Json,
   extract::{
      Path,
      Query,
      State,
      rejection::{JsonRejection, PathRejection, QueryRejection},
   },
   http::StatusCode,
   response::IntoResponse,
};
use mailhub_domain::resource::{Resource, ResourceId};
use mailhub_shared::{ApiResponse, MessageResponse, PaginatedResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PageQuery;
use crate::{
   error::ApiError,
   usecase::{CreateResourceInput, ResourceUseCaseImpl},
};

/// リソース API の共有状態
pub struct ResourceState {
   pub usecase: ResourceUseCaseImpl,
}

/// リソース作成リクエスト
///
/// 欠けたフィールドは空文字として扱い、必須チェックはドメイン側で行う。
#[derive(Debug, Deserialize)]
pub struct CreateResourceRequest {
   #[serde(default)]
   pub key:       String,
   #[serde(default)]
   pub value:     String,
   #[serde(default)]
   pub lang_code: String,
}

/// リソース更新リクエスト
#[derive(Debug, Deserialize)]
pub struct UpdateResourceRequest {
   #[serde(default)]
   pub value: String,
}

/// キーと言語コードによる検索条件
#[derive(Debug, Deserialize)]
pub struct KeyLangQuery {
   pub key:       Option<String>,
   pub lang_code: Option<String>,
}

/// リソース DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceDto {
   pub id:         Uuid,
   pub key:        String,
   pub value:      String,
   pub lang_code:  String,
   pub created_at: String,
   pub updated_at: String,
}

impl From<&Resource> for ResourceDto {
   fn from(resource: &Resource) -> Self {
      Self {
         id:         *resource.id().as_uuid(),
         key:        resource.key().to_string(),
         value:      resource.value().as_str().to_string(),
         lang_code:  resource.lang_code().to_string(),
         created_at: resource.created_at().to_rfc3339(),
         updated_at: resource.updated_at().to_rfc3339(),
      }
   }
}

fn resource_id(path: Result<Path<Uuid>, PathRejection>) -> Result<ResourceId, ApiError> {
   let Path(id) = path?;
   Ok(ResourceId::from_uuid(id))
}

/// POST /resource
///
/// ## レスポンス
///
/// - `201 Created`: 作成したリソース
/// - `400 Bad Request`: ボディ不正、必須項目の欠落
/// - `409 Conflict`: 同じ (key, lang_code) の有効なリソースがある
pub async fn create_resource(
   State(state): State<Arc<ResourceState>>,
   payload: Result<Json<CreateResourceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
   let Json(req) = payload?;

   let resource = state
      .usecase
      .create_resource(CreateResourceInput {
         key:       req.key,
         value:     req.value,
         lang_code: req.lang_code,
      })
      .await?;

   let response =
      MessageResponse::with_data("Resource created successfully", ResourceDto::from(&resource));
   Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /resource/{id}
///
/// ## レスポンス
///
/// - `200 OK`: 更新後のリソース
/// - `400 Bad Request`: ID の書式不正、ボディ不正、値が空
/// - `404 Not Found`: リソースが見つからない
pub async fn update_resource(
   State(state): State<Arc<ResourceState>>,
   path: Result<Path<Uuid>, PathRejection>,
   payload: Result<Json<UpdateResourceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
   let id = resource_id(path)?;
   let Json(req) = payload?;

   let resource = state.usecase.update_resource(id, req.value).await?;

   let response =
      MessageResponse::with_data("Resource updated successfully", ResourceDto::from(&resource));
   Ok((StatusCode::OK, Json(response)))
}

/// DELETE /resource/{id}
pub async fn delete_resource(
   State(state): State<Arc<ResourceState>>,
   path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
   let id = resource_id(path)?;

   state.usecase.delete_resource(id).await?;

   Ok((
      StatusCode::OK,
      Json(MessageResponse::message("Resource deleted successfully")),
   ))
}

/// GET /resource/{id}
pub async fn get_resource(
   State(state): State<Arc<ResourceState>>,
   path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
   let id = resource_id(path)?;

   let resource = state.usecase.get_resource_by_id(id).await?;

   Ok((StatusCode::OK, Json(ApiResponse::new(ResourceDto::from(&resource)))))
}

/// GET /resource?key&lang_code
pub async fn get_resource_by_key_and_lang(
   State(state): State<Arc<ResourceState>>,
   query: Result<Query<KeyLangQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
   let Query(query) = query?;
   let (Some(key), Some(lang_code)) = (
      query.key.filter(|k| !k.trim().is_empty()),
      query.lang_code.filter(|l| !l.trim().is_empty()),
   ) else {
      return Err(ApiError::BadRequest(
         "Key and lang_code are required".to_string(),
      ));
   };

   let resource = state
      .usecase
      .get_resource_by_key_and_lang(&key, &lang_code)
      .await?;

   Ok((StatusCode::OK, Json(ApiResponse::new(ResourceDto::from(&resource)))))
}

/// GET /resource/lang/{lang_code}
pub async fn list_resources_by_lang(
   State(state): State<Arc<ResourceState>>,
   Path(lang_code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
   if lang_code.trim().is_empty() {
      return Err(ApiError::BadRequest(
         "Language code is required".to_string(),
      ));
   }

   let resources = state.usecase.get_all_resources_by_lang(&lang_code).await?;

   let items: Vec<ResourceDto> = resources.iter().map(ResourceDto::from).collect();
   Ok((StatusCode::OK, Json(ApiResponse::new(items))))
}

/// GET /resources?page&size
pub async fn list_resources(
   State(state): State<Arc<ResourceState>>,
   query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
   let Query(query) = query?;
   let request = query.into_page_request();

   let page = state.usecase.get_all_resources(request).await?;

   let response = PaginatedResponse::new(
      page.items.iter().map(ResourceDto::from).collect(),
      page.total,
      request.page(),
      request.size(),
   );
   Ok((StatusCode::OK, Json(response)))
}
