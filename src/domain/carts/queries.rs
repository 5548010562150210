//! Cart queries.
//!
//! Every query runs the same pipeline: intersect index sets to select
//! candidate codes, resolve each code to its stored record and keep those
//! matching the query's predicate, then order (and, for saved carts, page)
//! the survivors in memory. Codes whose primary record has gone, or no longer
//! decodes, are dropped silently; the write path is not atomic, so such
//! entries are expected.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;

use crate::{
    domain::carts::{
        errors::CartsServiceError,
        records::{CartRecord, CartStatus},
        repositories::{StoreCartIndexesRepository, StoreCartsRepository},
        sorting::SortCode,
    },
    keys,
    pagination::{PageMetadata, PageableData, SearchPage, paginate},
    store::RecordStore,
};

/// Selection for the active-cart removal sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalFilter {
    pub site_id: String,

    /// Restrict the sweep to one user's carts.
    pub user_id: Option<String>,

    /// Carts last modified at or before this instant are candidates.
    pub modified_before: Timestamp,
}

/// Selection for saved-cart listings and counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCartsFilter {
    pub user_id: String,

    /// Restrict to one site; all sites when absent.
    pub site_id: Option<String>,

    /// Accepted statuses; any status when empty.
    pub statuses: Vec<CartStatus>,
}

impl SavedCartsFilter {
    fn index_keys(&self) -> Vec<Option<String>> {
        let mut index_keys = vec![keys::user_index_key(&self.user_id)];

        if let Some(site_id) = &self.site_id {
            index_keys.push(keys::site_index_key(site_id));
        }

        index_keys
    }

    fn matches(&self, cart: &CartRecord) -> bool {
        cart.is_saved()
            && (self.statuses.is_empty()
                || cart
                    .status
                    .is_some_and(|status| self.statuses.contains(&status)))
    }
}

/// Sort newest first by modification time. The candidates arrive ordered by
/// code and the sort is stable, so equal timestamps keep code order.
fn newest_first(carts: &mut [CartRecord]) {
    SortCode::ByDateModified.sort(carts);
}

fn latest(mut carts: Vec<CartRecord>) -> Option<CartRecord> {
    newest_first(&mut carts);

    carts.into_iter().next()
}

#[derive(Clone)]
pub struct StoreCartQueries {
    store: Arc<dyn RecordStore>,
    carts_repository: StoreCartsRepository,
    indexes_repository: StoreCartIndexesRepository,
}

impl StoreCartQueries {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            carts_repository: StoreCartsRepository::new(),
            indexes_repository: StoreCartIndexesRepository::new(),
        }
    }

    /// Candidate selection plus resolution: the carts present in every index
    /// set named by `index_keys` that satisfy `predicate`, ordered by code.
    async fn select<P>(
        &self,
        index_keys: &[Option<String>],
        predicate: P,
    ) -> Result<Vec<CartRecord>, CartsServiceError>
    where
        P: Fn(&CartRecord) -> bool + Send,
    {
        let store = &*self.store;

        let codes = self.indexes_repository.candidates(store, index_keys).await?;

        let mut carts = self.carts_repository.resolve_carts(store, &codes).await?;

        carts.retain(|cart| predicate(cart));

        Ok(carts)
    }
}

impl Debug for StoreCartQueries {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("StoreCartQueries").finish_non_exhaustive()
    }
}

#[async_trait]
impl CartQueries for StoreCartQueries {
    async fn cart_for_code(&self, code: &str) -> Result<Option<CartRecord>, CartsServiceError> {
        Ok(self.carts_repository.get_cart(&*self.store, code).await?)
    }

    #[tracing::instrument(name = "carts.queries.cart_for_guid_site_and_user", skip(self), err)]
    async fn cart_for_guid_site_and_user(
        &self,
        guid: &str,
        site_id: &str,
        user_id: &str,
    ) -> Result<Option<CartRecord>, CartsServiceError> {
        if guid.trim().is_empty() {
            return self.cart_for_site_and_user(site_id, user_id).await;
        }

        let carts = self
            .select(
                &[
                    keys::guid_index_key(guid),
                    keys::user_index_key(user_id),
                    keys::site_index_key(site_id),
                ],
                |_| true,
            )
            .await?;

        Ok(latest(carts))
    }

    #[tracing::instrument(name = "carts.queries.cart_for_guid_and_site", skip(self), err)]
    async fn cart_for_guid_and_site(
        &self,
        guid: &str,
        site_id: &str,
    ) -> Result<Option<CartRecord>, CartsServiceError> {
        let carts = self
            .select(
                &[keys::guid_index_key(guid), keys::site_index_key(site_id)],
                |_| true,
            )
            .await?;

        Ok(latest(carts))
    }

    #[tracing::instrument(name = "carts.queries.cart_for_code_and_user", skip(self), err)]
    async fn cart_for_code_and_user(
        &self,
        code: &str,
        user_id: &str,
    ) -> Result<Option<CartRecord>, CartsServiceError> {
        let carts = self
            .select(
                &[keys::code_index_key(code), keys::user_index_key(user_id)],
                |_| true,
            )
            .await?;

        Ok(latest(carts))
    }

    #[tracing::instrument(name = "carts.queries.cart_for_site_and_user", skip(self), err)]
    async fn cart_for_site_and_user(
        &self,
        site_id: &str,
        user_id: &str,
    ) -> Result<Option<CartRecord>, CartsServiceError> {
        Ok(latest(self.carts_for_site_and_user(site_id, user_id).await?))
    }

    #[tracing::instrument(name = "carts.queries.carts_for_site_and_user", skip(self), err)]
    async fn carts_for_site_and_user(
        &self,
        site_id: &str,
        user_id: &str,
    ) -> Result<Vec<CartRecord>, CartsServiceError> {
        let mut carts = self
            .select(
                &[keys::user_index_key(user_id), keys::site_index_key(site_id)],
                |cart| !cart.is_saved(),
            )
            .await?;

        newest_first(&mut carts);

        Ok(carts)
    }

    #[tracing::instrument(name = "carts.queries.carts_for_removal", skip(self), err)]
    async fn carts_for_removal(
        &self,
        filter: &RemovalFilter,
    ) -> Result<Vec<CartRecord>, CartsServiceError> {
        let mut index_keys = Vec::with_capacity(2);

        if let Some(user_id) = &filter.user_id {
            index_keys.push(keys::user_index_key(user_id));
        }
        index_keys.push(keys::site_index_key(&filter.site_id));

        let cutoff = filter.modified_before;

        let mut carts = self
            .select(&index_keys, |cart| {
                !cart.is_saved() && cart.modified_at <= cutoff
            })
            .await?;

        newest_first(&mut carts);

        Ok(carts)
    }

    #[tracing::instrument(name = "carts.queries.saved_carts_for_removal", skip(self), err)]
    async fn saved_carts_for_removal(
        &self,
        site_id: &str,
        now: Timestamp,
    ) -> Result<Vec<CartRecord>, CartsServiceError> {
        let mut carts = self
            .select(&[keys::site_index_key(site_id)], |cart| {
                cart.is_expired_at(now)
            })
            .await?;

        newest_first(&mut carts);

        Ok(carts)
    }

    #[tracing::instrument(
        name = "carts.queries.saved_carts_for_site_and_user",
        skip(self),
        fields(result_count = tracing::field::Empty),
        err
    )]
    async fn saved_carts_for_site_and_user(
        &self,
        filter: &SavedCartsFilter,
        pageable: &PageableData,
    ) -> Result<SearchPage<CartRecord>, CartsServiceError> {
        let mut carts = self
            .select(&filter.index_keys(), |cart| filter.matches(cart))
            .await?;

        SortCode::parse(pageable.sort.as_deref()).sort(&mut carts);

        let results = paginate(&carts, pageable.current_page, pageable.page_size).to_vec();

        tracing::Span::current().record("result_count", results.len());

        Ok(SearchPage {
            results,
            pagination: PageMetadata::new(pageable, carts.len()),
        })
    }

    #[tracing::instrument(
        name = "carts.queries.saved_carts_count_for_site_and_user",
        skip(self),
        err
    )]
    async fn saved_carts_count_for_site_and_user(
        &self,
        filter: &SavedCartsFilter,
    ) -> Result<usize, CartsServiceError> {
        let carts = self
            .select(&filter.index_keys(), |cart| filter.matches(cart))
            .await?;

        Ok(carts.len())
    }
}

#[automock]
#[async_trait]
pub trait CartQueries: Send + Sync {
    /// Direct lookup of a cart by its code.
    async fn cart_for_code(&self, code: &str) -> Result<Option<CartRecord>, CartsServiceError>;

    /// Most recently modified cart carrying `guid` for the site and user.
    /// Falls back to [`CartQueries::cart_for_site_and_user`] when `guid` is
    /// blank.
    async fn cart_for_guid_site_and_user(
        &self,
        guid: &str,
        site_id: &str,
        user_id: &str,
    ) -> Result<Option<CartRecord>, CartsServiceError>;

    /// Most recently modified cart carrying `guid` on the site.
    async fn cart_for_guid_and_site(
        &self,
        guid: &str,
        site_id: &str,
    ) -> Result<Option<CartRecord>, CartsServiceError>;

    /// The cart with `code` if it belongs to the user.
    async fn cart_for_code_and_user(
        &self,
        code: &str,
        user_id: &str,
    ) -> Result<Option<CartRecord>, CartsServiceError>;

    /// The user's current active cart on the site.
    async fn cart_for_site_and_user(
        &self,
        site_id: &str,
        user_id: &str,
    ) -> Result<Option<CartRecord>, CartsServiceError>;

    /// All of the user's active carts on the site, newest first.
    async fn carts_for_site_and_user(
        &self,
        site_id: &str,
        user_id: &str,
    ) -> Result<Vec<CartRecord>, CartsServiceError>;

    /// Active carts untouched since the filter's cutoff, newest first.
    async fn carts_for_removal(
        &self,
        filter: &RemovalFilter,
    ) -> Result<Vec<CartRecord>, CartsServiceError>;

    /// Saved carts on the site that expired at or before `now`, newest first.
    async fn saved_carts_for_removal(
        &self,
        site_id: &str,
        now: Timestamp,
    ) -> Result<Vec<CartRecord>, CartsServiceError>;

    /// One page of the user's saved carts, ordered by the requested sort code.
    async fn saved_carts_for_site_and_user(
        &self,
        filter: &SavedCartsFilter,
        pageable: &PageableData,
    ) -> Result<SearchPage<CartRecord>, CartsServiceError>;

    /// Number of saved carts matching the filter's user and site.
    ///
    /// Statuses in the filter are honoured too.
    async fn saved_carts_count_for_site_and_user(
        &self,
        filter: &SavedCartsFilter,
    ) -> Result<usize, CartsServiceError>;
}
