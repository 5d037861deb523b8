use async_trait::async_trait;
use dashmap::DashMap;
use ulid::Ulid;

use crate::model::{Block, NewBlock, NewReservation, PublicReservation, Reservation};

/// Backend read/write failure. Carries the technical detail for logs; user
/// messaging is the engine's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "store error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// Data-access interface over the hosted backend. Three collections:
/// `reservations`, `blocks`, and the read-only `public_reservations`
/// projection that exposes (date, time) without customer PII.
///
/// Every call is a suspension point. The store gives no transactional
/// isolation and no uniqueness constraint across callers; a read followed by
/// a write is not atomic.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn reservations(&self) -> Result<Vec<Reservation>, StoreError>;
    async fn public_reservations(&self) -> Result<Vec<PublicReservation>, StoreError>;
    async fn blocks(&self) -> Result<Vec<Block>, StoreError>;

    async fn insert_reservation(&self, row: NewReservation) -> Result<Reservation, StoreError>;
    /// Single or batch insert; a single block is a one-element batch.
    async fn insert_blocks(&self, rows: Vec<NewBlock>) -> Result<Vec<Block>, StoreError>;

    async fn delete_reservation(&self, id: Ulid) -> Result<(), StoreError>;
    async fn delete_block(&self, id: Ulid) -> Result<(), StoreError>;
}

/// In-memory store over concurrent maps. Multi-writer, append/delete-only,
/// intentionally without a (date, time) uniqueness constraint — it mirrors
/// what the hosted backend actually provides.
#[derive(Default)]
pub struct MemoryStore {
    reservations: DashMap<Ulid, Reservation>,
    blocks: DashMap<Ulid, Block>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reservation_count(&self) -> usize {
        self.reservations.len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn reservations(&self) -> Result<Vec<Reservation>, StoreError> {
        Ok(self.reservations.iter().map(|e| e.value().clone()).collect())
    }

    async fn public_reservations(&self) -> Result<Vec<PublicReservation>, StoreError> {
        Ok(self
            .reservations
            .iter()
            .map(|e| PublicReservation::from(e.value()))
            .collect())
    }

    async fn blocks(&self) -> Result<Vec<Block>, StoreError> {
        Ok(self.blocks.iter().map(|e| e.value().clone()).collect())
    }

    async fn insert_reservation(&self, row: NewReservation) -> Result<Reservation, StoreError> {
        let created = Reservation {
            id: Ulid::new(),
            name: row.name,
            email: row.email,
            phone: row.phone,
            service: row.service,
            date: row.date,
            time: row.time,
        };
        self.reservations.insert(created.id, created.clone());
        Ok(created)
    }

    async fn insert_blocks(&self, rows: Vec<NewBlock>) -> Result<Vec<Block>, StoreError> {
        let mut created = Vec::with_capacity(rows.len());
        for row in rows {
            let block = Block {
                id: Ulid::new(),
                date: row.date,
                time: row.time,
                reason: row.reason,
            };
            self.blocks.insert(block.id, block.clone());
            created.push(block);
        }
        Ok(created)
    }

    async fn delete_reservation(&self, id: Ulid) -> Result<(), StoreError> {
        self.reservations.remove(&id);
        Ok(())
    }

    async fn delete_block(&self, id: Ulid) -> Result<(), StoreError> {
        self.blocks.remove(&id);
        Ok(())
    }
}
