use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::store::error::StoreError;
use crate::store::filter::{DeviceToken, FilterValue, TokenFilter};

/// Raw read access to the token table.
///
/// Implementations return the token column of every matching row, `None` for
/// SQL nulls; the repository takes care of filtering and error policy.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn select_tokens(&self, filter: &TokenFilter) -> Result<Vec<Option<String>>, StoreError>;
}

/// Token lookups with the relay's error policy applied.
#[derive(Clone)]
pub struct TokenRepository {
    store: Arc<dyn TokenStore>,
    filter_columns: Vec<String>,
    role_column: String,
}

impl TokenRepository {
    pub fn new(
        store: Arc<dyn TokenStore>,
        filter_columns: Vec<String>,
        role_column: impl Into<String>,
    ) -> Self {
        Self {
            store,
            filter_columns,
            role_column: role_column.into(),
        }
    }

    /// Returns the non-empty tokens matching `filter`.
    ///
    /// Store failures and unknown columns are logged and reported as an empty
    /// list, so callers cannot tell them apart from "no matching tokens".
    pub async fn fetch_tokens(&self, filter: &TokenFilter) -> Vec<DeviceToken> {
        match self.try_fetch(filter).await {
            Ok(tokens) => {
                debug!(filter = %filter, count = tokens.len(), "Fetched device tokens");
                tokens
            }
            Err(err) => {
                error!(filter = %filter, error = %err, "Failed to fetch device tokens");
                Vec::new()
            }
        }
    }

    pub async fn fetch_role_tokens(&self, role: impl Into<FilterValue>) -> Vec<DeviceToken> {
        let filter = TokenFilter::by_role(&self.role_column, role);
        self.fetch_tokens(&filter).await
    }

    async fn try_fetch(&self, filter: &TokenFilter) -> Result<Vec<DeviceToken>, StoreError> {
        if !self.filter_columns.iter().any(|column| column == &filter.field) {
            return Err(StoreError::UnknownColumn {
                column: filter.field.clone(),
            });
        }

        let rows = self.store.select_tokens(filter).await?;
        Ok(rows
            .into_iter()
            .flatten()
            .filter(|token| !token.trim().is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeStore {
        rows: Result<Vec<Option<String>>, ()>,
        calls: AtomicUsize,
        seen: Mutex<Vec<TokenFilter>>,
    }

    impl FakeStore {
        fn with_rows(rows: Vec<Option<&str>>) -> Arc<Self> {
            Arc::new(Self {
                rows: Ok(rows.into_iter().map(|row| row.map(str::to_string)).collect()),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                rows: Err(()),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TokenStore for FakeStore {
        async fn select_tokens(
            &self,
            filter: &TokenFilter,
        ) -> Result<Vec<Option<String>>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(filter.clone());
            self.rows.clone().map_err(|_| StoreError::Request {
                message: "connection refused".to_string(),
            })
        }
    }

    fn repository(store: Arc<FakeStore>) -> TokenRepository {
        TokenRepository::new(
            store,
            vec!["user_id".to_string(), "role".to_string()],
            "role",
        )
    }

    #[tokio::test]
    async fn drops_null_and_empty_tokens() {
        let store = FakeStore::with_rows(vec![Some("a"), None, Some(""), Some("  "), Some("b")]);
        let tokens = repository(Arc::clone(&store))
            .fetch_tokens(&TokenFilter::by_user(3))
            .await;
        assert_eq!(tokens, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn store_failure_reads_as_empty() {
        let store = FakeStore::failing();
        let tokens = repository(Arc::clone(&store))
            .fetch_tokens(&TokenFilter::by_user(3))
            .await;
        assert!(tokens.is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_column_never_reaches_store() {
        let store = FakeStore::with_rows(vec![Some("a")]);
        let tokens = repository(Arc::clone(&store))
            .fetch_tokens(&TokenFilter::new("email", "x@y.z"))
            .await;
        assert!(tokens.is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn role_lookup_uses_configured_column() {
        let store = FakeStore::with_rows(vec![Some("t1")]);
        let tokens = repository(Arc::clone(&store)).fetch_role_tokens("mozo").await;
        assert_eq!(tokens, vec!["t1".to_string()]);
        let seen = store.seen.lock().unwrap();
        assert_eq!(seen[0], TokenFilter::new("role", "mozo"));
    }
}
