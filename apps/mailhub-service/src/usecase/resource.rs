//! 多言語リソースユースケース

use std::sync::Arc;

use mailhub_domain::{
   DomainError,
   clock::Clock,
   pagination::{Page, PageRequest},
   resource::{LangCode, Resource, ResourceId, ResourceKey, ResourceValue},
};
use mailhub_infra::{InfraError, repository::ResourceRepository};

use crate::error::ApiError;

/// (key, lang_code) が有効なリソースと重複した場合のメッセージ
pub const DUPLICATE_RESOURCE_MESSAGE: &str =
   "Resource with this key and language code already exists";

/// リソース作成の入力
pub struct CreateResourceInput {
   pub key:       String,
   pub value:     String,
   pub lang_code: String,
}

/// 多言語リソースユースケース
pub struct ResourceUseCaseImpl {
   resource_repository: Arc<dyn ResourceRepository>,
   clock:               Arc<dyn Clock>,
}

impl ResourceUseCaseImpl {
   pub fn new(resource_repository: Arc<dyn ResourceRepository>, clock: Arc<dyn Clock>) -> Self {
      Self {
         resource_repository,
         clock,
      }
   }

   /// リソースを作成する
   ///
   /// 同じ (key, lang_code) の有効なリソースがあれば Conflict。
   #[tracing::instrument(skip_all, fields(key = %input.key, lang_code = %input.lang_code))]
   pub async fn create_resource(&self, input: CreateResourceInput) -> Result<Resource, ApiError> {
      let key = ResourceKey::new(input.key)?;
      let lang_code = LangCode::new(input.lang_code)?;
      let value = ResourceValue::new(input.value)?;

      if self
         .resource_repository
         .find_active_by_key_and_lang(&key, &lang_code)
         .await?
         .is_some()
      {
         return Err(ApiError::Conflict(DUPLICATE_RESOURCE_MESSAGE.to_string()));
      }

      let resource = Resource::new(key, value, lang_code, self.clock.now());
      self
         .resource_repository
         .insert(&resource)
         .await
         .map_err(duplicate_on_conflict)?;

      tracing::info!(id = %resource.id(), "リソースを作成しました");
      Ok(resource)
   }

   /// リソースの値を更新する
   ///
   /// key / lang_code は変更しない。同時更新は後勝ち。
   #[tracing::instrument(skip_all, fields(%id))]
   pub async fn update_resource(&self, id: ResourceId, value: String) -> Result<Resource, ApiError> {
      let value = ResourceValue::new(value)?;

      let resource = self
         .resource_repository
         .find_active_by_id(&id)
         .await?
         .ok_or_else(|| resource_not_found(&id))?
         .with_value(value, self.clock.now());

      if !self.resource_repository.update(&resource).await? {
         return Err(resource_not_found(&id));
      }

      Ok(resource)
   }

   /// リソースを論理削除する
   #[tracing::instrument(skip_all, fields(%id))]
   pub async fn delete_resource(&self, id: ResourceId) -> Result<(), ApiError> {
      if !self
         .resource_repository
         .soft_delete(&id, self.clock.now())
         .await?
      {
         return Err(resource_not_found(&id));
      }

      tracing::info!("リソースを削除しました");
      Ok(())
   }

   #[tracing::instrument(skip_all, fields(%id))]
   pub async fn get_resource_by_id(&self, id: ResourceId) -> Result<Resource, ApiError> {
      self
         .resource_repository
         .find_active_by_id(&id)
         .await?
         .ok_or_else(|| resource_not_found(&id))
   }

   #[tracing::instrument(skip_all, fields(%key, %lang_code))]
   pub async fn get_resource_by_key_and_lang(
      &self,
      key: &str,
      lang_code: &str,
   ) -> Result<Resource, ApiError> {
      let key = ResourceKey::new(key)?;
      let lang_code = LangCode::new(lang_code)?;

      self
         .resource_repository
         .find_active_by_key_and_lang(&key, &lang_code)
         .await?
         .ok_or_else(|| {
            DomainError::NotFound {
               entity_type: "Resource",
               id:          format!("{key}/{lang_code}"),
            }
            .into()
         })
   }

   /// 言語コードに属するリソースをキー順に取得する
   #[tracing::instrument(skip_all, fields(%lang_code))]
   pub async fn get_all_resources_by_lang(&self, lang_code: &str) -> Result<Vec<Resource>, ApiError> {
      let lang_code = LangCode::new(lang_code)?;
      Ok(self.resource_repository.find_active_by_lang(&lang_code).await?)
   }

   /// 有効なリソースを新しい順にページ取得する
   #[tracing::instrument(skip_all, fields(page = request.page(), size = request.size()))]
   pub async fn get_all_resources(&self, request: PageRequest) -> Result<Page<Resource>, ApiError> {
      Ok(self.resource_repository.find_active_page(&request).await?)
   }
}

fn resource_not_found(id: &ResourceId) -> ApiError {
   DomainError::NotFound {
      entity_type: "Resource",
      id:          id.to_string(),
   }
   .into()
}

fn duplicate_on_conflict(err: InfraError) -> ApiError {
   if err.as_conflict().is_some() {
      ApiError::Conflict(DUPLICATE_RESOURCE_MESSAGE.to_string())
   } else {
      ApiError::Database(err)
   }
}
