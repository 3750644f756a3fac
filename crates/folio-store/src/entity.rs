//! # Entity Trait
//!
//! Binds each domain type to the generic [`EntityStore`](crate::EntityStore).
//!
//! ## Lifecycle Hooks
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   What Each Store Does on Write                         │
//! │                                                                         │
//! │            on_create                        on_update                   │
//! │  Author    -                                -                           │
//! │  Book      stock >= 1 else Validation       -                           │
//! │  Customer  created_at = now                 keep stored created_at      │
//! │  Order     created_at = now, total          keep created_at, total      │
//! │                                                                         │
//! │  insert_direct (startup replay) runs NEITHER hook.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use folio_core::validation::{validate_stock, ValidationResult};
use folio_core::{Author, Book, Customer, EntityId, Order};

/// A record kept in an [`EntityStore`](crate::EntityStore).
pub trait Entity: Clone + Send + Sync + 'static {
    /// Name used in errors and logs.
    const KIND: &'static str;

    fn id(&self) -> EntityId;

    fn set_id(&mut self, id: EntityId);

    /// Runs before a freshly created record is inserted.
    fn on_create(&mut self, _now: DateTime<Utc>) -> ValidationResult<()> {
        Ok(())
    }

    /// Runs before `self` replaces `existing` on update.
    fn on_update(&mut self, _existing: &Self) {}
}

impl Entity for Author {
    const KIND: &'static str = "Author";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

impl Entity for Book {
    const KIND: &'static str = "Book";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn on_create(&mut self, _now: DateTime<Utc>) -> ValidationResult<()> {
        validate_stock(self.stock)
    }
}

impl Entity for Customer {
    const KIND: &'static str = "Customer";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn on_create(&mut self, now: DateTime<Utc>) -> ValidationResult<()> {
        self.created_at = now;
        Ok(())
    }

    fn on_update(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
    }
}

impl Entity for Order {
    const KIND: &'static str = "Order";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn on_create(&mut self, now: DateTime<Utc>) -> ValidationResult<()> {
        self.created_at = now;
        self.recompute_total();
        Ok(())
    }

    fn on_update(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
        self.recompute_total();
    }
}
