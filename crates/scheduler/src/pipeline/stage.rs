use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use erpsync_core::{EntityId, SyncError};
use serde::{Deserialize, Serialize};

/// One category of data moved for an entity. Declaration order is pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SyncStage {
    Partners,
    Sellers,
    NegotiationTypes,
    OperationTypes,
    Products,
    Stock,
    PriceTables,
    PriceExceptions,
    InvoiceHeaders,
    Financial,
}

impl SyncStage {
    /// All stages in the order the pipeline runs them.
    pub const ALL: [SyncStage; 10] = [
        SyncStage::Partners,
        SyncStage::Sellers,
        SyncStage::NegotiationTypes,
        SyncStage::OperationTypes,
        SyncStage::Products,
        SyncStage::Stock,
        SyncStage::PriceTables,
        SyncStage::PriceExceptions,
        SyncStage::InvoiceHeaders,
        SyncStage::Financial,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SyncStage::Partners => "Partners",
            SyncStage::Sellers => "Sellers",
            SyncStage::NegotiationTypes => "NegotiationTypes",
            SyncStage::OperationTypes => "OperationTypes",
            SyncStage::Products => "Products",
            SyncStage::Stock => "Stock",
            SyncStage::PriceTables => "PriceTables",
            SyncStage::PriceExceptions => "PriceExceptions",
            SyncStage::InvoiceHeaders => "InvoiceHeaders",
            SyncStage::Financial => "Financial",
        }
    }
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A domain synchronizer transferring one category of data for one entity.
#[async_trait]
pub trait SubSynchronizer: Send + Sync {
    async fn sync(&self, entity_id: EntityId) -> Result<(), SyncError>;
}

/// Adapts an async closure into a [`SubSynchronizer`].
pub struct FnSynchronizer<F> {
    f: F,
}

impl<F> FnSynchronizer<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> SubSynchronizer for FnSynchronizer<F>
where
    F: Fn(EntityId) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), SyncError>> + Send,
{
    async fn sync(&self, entity_id: EntityId) -> Result<(), SyncError> {
        (self.f)(entity_id).await
    }
}
