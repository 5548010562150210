//! Hook Registry

use std::{
    fmt::{self, Debug, Display, Formatter},
    sync::Arc,
};

use async_trait::async_trait;
use mockall::automock;
use tracing::debug;

use crate::domain::{
    carts::records::CartRecord, hooks::errors::HooksError,
    promotions::records::PromotionResultRecord,
};

/// The closed set of record kinds with save and remove hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Cart,
    PromotionResult,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::PromotionResult => "promotion result",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record handed to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Cart(CartRecord),
    PromotionResult(PromotionResultRecord),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Cart(_) => RecordKind::Cart,
            Self::PromotionResult(_) => RecordKind::PromotionResult,
        }
    }
}

impl From<CartRecord> for Record {
    fn from(cart: CartRecord) -> Self {
        Self::Cart(cart)
    }
}

impl From<PromotionResultRecord> for Record {
    fn from(result: PromotionResultRecord) -> Self {
        Self::PromotionResult(result)
    }
}

/// Per-kind persistence plus optional work around it.
#[automock]
#[async_trait]
pub trait RecordHooks: Send + Sync {
    async fn before_save(&self, _record: &Record) -> Result<(), HooksError> {
        Ok(())
    }

    async fn save(&self, record: &Record) -> Result<(), HooksError>;

    async fn after_save(&self, _record: &Record) -> Result<(), HooksError> {
        Ok(())
    }

    async fn before_remove(&self, _record: &Record) -> Result<(), HooksError> {
        Ok(())
    }

    async fn remove(&self, record: &Record) -> Result<(), HooksError>;

    async fn after_remove(&self, _record: &Record) -> Result<(), HooksError> {
        Ok(())
    }
}

/// One optional handler per [`RecordKind`], registered explicitly.
#[derive(Clone, Default)]
pub struct HookRegistry {
    cart: Option<Arc<dyn RecordHooks>>,
    promotion_result: Option<Arc<dyn RecordHooks>>,
}

impl HookRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, kind: RecordKind) -> &mut Option<Arc<dyn RecordHooks>> {
        match kind {
            RecordKind::Cart => &mut self.cart,
            RecordKind::PromotionResult => &mut self.promotion_result,
        }
    }

    /// Register `hooks` for `kind`, returning the handler it replaces.
    pub fn register(
        &mut self,
        kind: RecordKind,
        hooks: Arc<dyn RecordHooks>,
    ) -> Option<Arc<dyn RecordHooks>> {
        self.slot_mut(kind).replace(hooks)
    }

    #[must_use]
    pub fn with(mut self, kind: RecordKind, hooks: Arc<dyn RecordHooks>) -> Self {
        self.register(kind, hooks);
        self
    }

    pub fn hooks_for(&self, kind: RecordKind) -> Option<&Arc<dyn RecordHooks>> {
        match kind {
            RecordKind::Cart => self.cart.as_ref(),
            RecordKind::PromotionResult => self.promotion_result.as_ref(),
        }
    }
}

impl Debug for HookRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("cart", &self.cart.is_some())
            .field("promotion_result", &self.promotion_result.is_some())
            .finish()
    }
}

/// Batch save and remove through the registered hooks.
///
/// Every record's `before_*` hook runs first, then each record is persisted,
/// then every `after_*` hook runs. Records whose kind has no handler are
/// skipped. The first error stops the batch; earlier steps are not undone.
#[derive(Debug, Clone, Default)]
pub struct Records {
    registry: HookRegistry,
}

impl Records {
    #[must_use]
    pub fn new(registry: HookRegistry) -> Self {
        Self { registry }
    }

    fn handled<'a>(
        &'a self,
        records: &'a [Record],
    ) -> Vec<(&'a Record, &'a Arc<dyn RecordHooks>)> {
        records
            .iter()
            .filter_map(|record| match self.registry.hooks_for(record.kind()) {
                Some(hooks) => Some((record, hooks)),
                None => {
                    debug!(kind = %record.kind(), "no hooks registered, skipping record");

                    None
                }
            })
            .collect()
    }

    /// Save `records`, returning how many had a handler.
    #[tracing::instrument(
        name = "hooks.records.save_all",
        skip(self, records),
        fields(record_count = records.len()),
        err
    )]
    pub async fn save_all(&self, records: &[Record]) -> Result<usize, HooksError> {
        let handled = self.handled(records);

        for (record, hooks) in &handled {
            hooks.before_save(record).await?;
        }

        for (record, hooks) in &handled {
            hooks.save(record).await?;
        }

        for (record, hooks) in &handled {
            hooks.after_save(record).await?;
        }

        Ok(handled.len())
    }

    /// Remove `records`, returning how many had a handler.
    #[tracing::instrument(
        name = "hooks.records.remove_all",
        skip(self, records),
        fields(record_count = records.len()),
        err
    )]
    pub async fn remove_all(&self, records: &[Record]) -> Result<usize, HooksError> {
        let handled = self.handled(records);

        for (record, hooks) in &handled {
            hooks.before_remove(record).await?;
        }

        for (record, hooks) in &handled {
            hooks.remove(record).await?;
        }

        for (record, hooks) in &handled {
            hooks.after_remove(record).await?;
        }

        Ok(handled.len())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use mockall::Sequence;
    use testresult::TestResult;

    use super::*;

    fn cart() -> Record {
        Record::Cart(CartRecord::new("C1", "U1", "S1", Timestamp::UNIX_EPOCH))
    }

    #[test]
    fn register_replaces_previous_handler() {
        let mut registry = HookRegistry::new();

        assert!(
            registry
                .register(RecordKind::Cart, Arc::new(MockRecordHooks::new()))
                .is_none()
        );
        assert!(
            registry
                .register(RecordKind::Cart, Arc::new(MockRecordHooks::new()))
                .is_some()
        );
        assert!(registry.hooks_for(RecordKind::PromotionResult).is_none());
    }

    #[tokio::test]
    async fn save_runs_before_then_save_then_after() -> TestResult {
        let mut hooks = MockRecordHooks::new();
        let mut sequence = Sequence::new();

        hooks
            .expect_before_save()
            .times(2)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));
        hooks
            .expect_save()
            .times(2)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));
        hooks
            .expect_after_save()
            .times(2)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));

        let records = Records::new(HookRegistry::new().with(RecordKind::Cart, Arc::new(hooks)));

        let saved = records.save_all(&[cart(), cart()]).await?;

        assert_eq!(saved, 2);

        Ok(())
    }

    #[tokio::test]
    async fn records_without_handler_are_skipped() -> TestResult {
        let mut hooks = MockRecordHooks::new();

        hooks.expect_before_remove().once().returning(|_| Ok(()));
        hooks.expect_remove().once().returning(|_| Ok(()));
        hooks.expect_after_remove().once().returning(|_| Ok(()));

        let records = Records::new(HookRegistry::new().with(RecordKind::Cart, Arc::new(hooks)));

        let result = Record::PromotionResult(PromotionResultRecord::new("C1", "P1"));

        assert_eq!(records.remove_all(&[cart(), result]).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn failing_before_hook_stops_the_batch() {
        let mut hooks = MockRecordHooks::new();

        hooks.expect_before_save().returning(|record| {
            Err(HooksError::KindMismatch {
                expected: RecordKind::PromotionResult,
                found: record.kind(),
            })
        });
        hooks.expect_save().never();

        let records = Records::new(HookRegistry::new().with(RecordKind::Cart, Arc::new(hooks)));

        assert!(matches!(
            records.save_all(&[cart()]).await,
            Err(HooksError::KindMismatch { .. })
        ));
    }
}
