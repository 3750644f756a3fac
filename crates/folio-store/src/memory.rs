//! # In-Memory Entity Store
//!
//! A concurrency-safe, id-keyed collection for one entity kind.
//!
//! ## Locking Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    EntityStore<T> Internals                             │
//! │                                                                         │
//! │   EntityStore<T> (Clone = shared handle)                               │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   Arc<RwLock<StoreState<T>>>                                           │
//! │        │                                                                │
//! │        ├── records: HashMap<EntityId, T>                               │
//! │        └── next_id: EntityId   (starts at 1, only ever increases)      │
//! │                                                                         │
//! │   get / get_all / search ──► read lock  (many readers)                 │
//! │   create / update / delete ─► write lock (single writer)               │
//! │                                                                         │
//! │   RULES:                                                               │
//! │   • A lock is held only for the map operation itself                   │
//! │   • No method touches another store or the disk while locked           │
//! │   • Callers always receive clones, never references into the map      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use folio_core::search::Criteria;
use folio_core::{Author, Book, CoreResult, Customer, EntityId, Order};

use crate::entity::Entity;
use crate::error::{StoreError, StoreResult};

// =============================================================================
// Store State
// =============================================================================

#[derive(Debug)]
struct StoreState<T> {
    records: HashMap<EntityId, T>,
    next_id: EntityId,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        StoreState {
            records: HashMap::new(),
            next_id: 1,
        }
    }
}

// =============================================================================
// Entity Store
// =============================================================================

/// Keyed collection with CRUD and predicate search.
///
/// Cloning the store clones the handle; both clones see the same records.
///
/// ## Usage
/// ```rust
/// use folio_store::AuthorStore;
/// use folio_core::Author;
///
/// let store = AuthorStore::new();
/// let created = store.create(Author {
///     first_name: "Mary".into(),
///     last_name: "Shelley".into(),
///     ..Default::default()
/// }).unwrap();
/// assert_eq!(created.id, 1);
/// assert_eq!(store.get(1).unwrap().last_name, "Shelley");
/// ```
#[derive(Debug)]
pub struct EntityStore<T> {
    state: Arc<RwLock<StoreState<T>>>,
}

impl<T> Clone for EntityStore<T> {
    fn clone(&self) -> Self {
        EntityStore {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Entity> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> EntityStore<T> {
    /// Creates an empty store whose first id will be 1.
    pub fn new() -> Self {
        EntityStore {
            state: Arc::new(RwLock::new(StoreState::default())),
        }
    }

    // A writer that panicked mid-operation cannot leave the map half-updated:
    // every write is a single insert or remove.
    fn read(&self) -> RwLockReadGuard<'_, StoreState<T>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState<T>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts a new record under the next free id.
    ///
    /// ## Returns
    /// The stored copy, with its assigned id.
    ///
    /// ## Errors
    /// Validation errors from the entity's create hook. No id is consumed
    /// when the hook rejects the record.
    pub fn create(&self, mut entity: T) -> StoreResult<T> {
        entity.on_create(Utc::now())?;

        let mut state = self.write();
        let id = state.next_id;
        state.next_id += 1;
        entity.set_id(id);
        state.records.insert(id, entity.clone());
        drop(state);

        debug!(kind = T::KIND, id, "Created entity");
        Ok(entity)
    }

    /// Inserts a record under its own id, skipping every hook.
    ///
    /// Used when replaying snapshots at startup. Keeps `next_id` ahead of
    /// the largest id seen. A record with id 0 is given a fresh id.
    pub fn insert_direct(&self, mut entity: T) -> T {
        let mut state = self.write();
        if entity.id() == 0 {
            entity.set_id(state.next_id);
        }
        let id = entity.id();
        if id >= state.next_id {
            state.next_id = id + 1;
        }
        state.records.insert(id, entity.clone());
        entity
    }

    /// Fetches one record.
    pub fn get(&self, id: EntityId) -> StoreResult<T> {
        self.read()
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(T::KIND, id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.read().records.contains_key(&id)
    }

    /// Snapshot of every record. Order is unspecified.
    pub fn get_all(&self) -> Vec<T> {
        self.read().records.values().cloned().collect()
    }

    /// Replaces a record, forcing its id to `id`.
    pub fn update(&self, id: EntityId, mut value: T) -> StoreResult<T> {
        let mut state = self.write();
        let existing = state
            .records
            .get(&id)
            .ok_or_else(|| StoreError::not_found(T::KIND, id))?;

        value.set_id(id);
        value.on_update(existing);
        state.records.insert(id, value.clone());
        drop(state);

        debug!(kind = T::KIND, id, "Updated entity");
        Ok(value)
    }

    /// Read-modify-write of one record under a single write lock.
    ///
    /// The closure sees the stored value; if it returns an error the record
    /// is left exactly as it was.
    pub fn update_with<F>(&self, id: EntityId, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut T) -> CoreResult<()>,
    {
        let mut state = self.write();
        let current = state
            .records
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(T::KIND, id))?;

        let mut next = current.clone();
        f(&mut next)?;
        next.set_id(id);
        *current = next.clone();
        Ok(next)
    }

    /// Removes a record. Its id is never handed out again.
    pub fn delete(&self, id: EntityId) -> StoreResult<T> {
        let removed = self
            .write()
            .records
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(T::KIND, id))?;

        debug!(kind = T::KIND, id, "Deleted entity");
        Ok(removed)
    }

    /// Full scan with the given criteria.
    ///
    /// ## Errors
    /// Validation error when the criteria are self-contradictory.
    pub fn search<C>(&self, criteria: &C) -> StoreResult<Vec<T>>
    where
        C: Criteria<T> + ?Sized,
    {
        criteria.validate()?;
        Ok(self.filter(|entity| criteria.matches(entity)))
    }

    /// Clones every record satisfying `predicate`.
    pub fn filter<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        self.read()
            .records
            .values()
            .filter(|entity| predicate(entity))
            .cloned()
            .collect()
    }

    pub fn any<P>(&self, predicate: P) -> bool
    where
        P: Fn(&T) -> bool,
    {
        self.read().records.values().any(predicate)
    }

    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().records.is_empty()
    }

    /// The id the next `create` will assign.
    pub fn next_id(&self) -> EntityId {
        self.read().next_id
    }
}

// =============================================================================
// Per-Kind Stores
// =============================================================================

pub type AuthorStore = EntityStore<Author>;
pub type BookStore = EntityStore<Book>;
pub type CustomerStore = EntityStore<Customer>;
pub type OrderStore = EntityStore<Order>;

impl EntityStore<Author> {
    /// Finds a stored author with the same first name, last name and bio.
    pub fn find_by_identity(&self, author: &Author) -> Option<Author> {
        self.read()
            .records
            .values()
            .find(|stored| stored.same_identity(author))
            .cloned()
    }
}

impl EntityStore<Book> {
    /// Applies a signed stock change atomically.
    ///
    /// ## Errors
    /// - `NotFound` if the book is gone
    /// - `Rule(NegativeStock)` if the result would be below zero
    pub fn adjust_stock(&self, id: EntityId, delta: i64) -> StoreResult<Book> {
        let book = self.update_with(id, |book| book.apply_stock_delta(delta))?;
        debug!(book_id = id, delta, stock = book.stock, "Adjusted stock");
        Ok(book)
    }

    pub fn by_author(&self, author_id: EntityId) -> Vec<Book> {
        self.filter(|book| book.author.id == author_id)
    }
}

impl EntityStore<Customer> {
    pub fn find_by_email(&self, email: &str) -> Option<Customer> {
        self.read()
            .records
            .values()
            .find(|customer| customer.email == email)
            .cloned()
    }

    /// True when another customer already uses `email`.
    pub fn email_taken(&self, email: &str, except: Option<EntityId>) -> bool {
        self.any(|customer| customer.email == email && Some(customer.id) != except)
    }
}

impl EntityStore<Order> {
    /// Orders with `start <= created_at < end`.
    pub fn created_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Order> {
        self.filter(|order| order.created_at >= start && order.created_at < end)
    }

    pub fn references_book(&self, book_id: EntityId) -> bool {
        self.any(|order| order.references_book(book_id))
    }

    pub fn references_customer(&self, customer_id: EntityId) -> bool {
        self.any(|order| order.belongs_to(customer_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
