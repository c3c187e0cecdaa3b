//! Budget and expense calls against the data backend.
//!
//! Both resources share one REST shape under `/api/<resource>`, and every
//! answer is wrapped in an [`ApiResponse`] envelope that is unwrapped here.

use super::http::{ApiClient, ApiError, ApiResponse, RequestOptions};
use crate::finance::{Budget, BudgetDraft, Expense, ExpenseDraft};
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt, marker::PhantomData};
use url::Url;

pub trait Resource {
    const PATH: &'static str;
    type Item: DeserializeOwned;
    type Draft: Serialize;
}

#[derive(Debug, Clone, Copy)]
pub struct Budgets;

impl Resource for Budgets {
    const PATH: &'static str = "/api/budget";
    type Item = Budget;
    type Draft = BudgetDraft;
}

#[derive(Debug, Clone, Copy)]
pub struct Expenses;

impl Resource for Expenses {
    const PATH: &'static str = "/api/expense";
    type Item = Expense;
    type Draft = ExpenseDraft;
}

pub type BudgetService = ResourceClient<Budgets>;
pub type ExpenseService = ResourceClient<Expenses>;

// update bodies repeat the id next to the draft fields
#[derive(Serialize)]
struct WithId<'a, D> {
    id: &'a str,
    #[serde(flatten)]
    draft: &'a D,
}

pub struct ResourceClient<R> {
    api: ApiClient,
    resource: PhantomData<R>,
}

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            resource: PhantomData,
        }
    }
}

impl<R: Resource> fmt::Debug for ResourceClient<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("path", &R::PATH)
            .field("api", &self.api)
            .finish()
    }
}

impl<R: Resource> ResourceClient<R> {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            resource: PhantomData,
        }
    }

    fn item_path(id: &str) -> Result<String, ApiError> {
        Ok(format!("{}/{}", R::PATH, path_segment(id)?))
    }

    /// # Errors
    /// Any [`ApiError`] from the backend call.
    pub async fn get_all(&self, options: RequestOptions<'_>) -> Result<Vec<R::Item>, ApiError> {
        let envelope: ApiResponse<Vec<R::Item>> = self.api.get(R::PATH, options).await?;
        Ok(envelope.data)
    }

    /// # Errors
    /// Any [`ApiError`] from the backend call.
    pub async fn get_by_id(
        &self,
        id: &str,
        options: RequestOptions<'_>,
    ) -> Result<R::Item, ApiError> {
        let envelope: ApiResponse<R::Item> = self.api.get(&Self::item_path(id)?, options).await?;
        Ok(envelope.data)
    }

    /// # Errors
    /// Any [`ApiError`] from the backend call.
    pub async fn create(
        &self,
        draft: &R::Draft,
        options: RequestOptions<'_>,
    ) -> Result<R::Item, ApiError> {
        let envelope: ApiResponse<R::Item> = self.api.post(R::PATH, draft, options).await?;
        Ok(envelope.data)
    }

    /// # Errors
    /// Any [`ApiError`] from the backend call.
    pub async fn update(
        &self,
        id: &str,
        draft: &R::Draft,
        options: RequestOptions<'_>,
    ) -> Result<R::Item, ApiError> {
        let body = WithId { id, draft };
        let envelope: ApiResponse<R::Item> =
            self.api.put(&Self::item_path(id)?, &body, options).await?;
        Ok(envelope.data)
    }

    /// # Errors
    /// Any [`ApiError`] from the backend call.
    pub async fn delete(&self, id: &str, options: RequestOptions<'_>) -> Result<bool, ApiError> {
        let envelope: ApiResponse<bool> = self.api.delete(&Self::item_path(id)?, options).await?;
        Ok(envelope.data)
    }

    /// # Errors
    /// Any [`ApiError`] from the backend call.
    pub async fn count(&self, options: RequestOptions<'_>) -> Result<u64, ApiError> {
        let envelope: ApiResponse<u64> =
            self.api.get(&format!("{}/count", R::PATH), options).await?;
        Ok(envelope.data)
    }

    /// # Errors
    /// Any [`ApiError`] from the backend call.
    pub async fn exists(&self, id: &str, options: RequestOptions<'_>) -> Result<bool, ApiError> {
        let envelope: ApiResponse<bool> = self
            .api
            .get(&format!("{}/exists/{}", R::PATH, path_segment(id)?), options)
            .await?;
        Ok(envelope.data)
    }
}

/// Percent-encode `id` as exactly one path segment. Dot segments and empty
/// ids are refused since no encoding keeps them from being normalized away.
fn path_segment(id: &str) -> Result<String, ApiError> {
    if matches!(id, "" | "." | "..") {
        return Err(ApiError::InvalidId);
    }
    let mut url = Url::parse("http://segment.invalid/")
        .map_err(|err| ApiError::Request(err.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidId)?
        .pop_if_empty()
        .push(id);
    Ok(url.path().trim_start_matches('/').to_string())
}
