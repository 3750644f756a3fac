//! # Order Policy
//!
//! Stock-checked order create, update and delete.
//!
//! ## Planning
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Order Planning (no writes)                          │
//! │                                                                         │
//! │  StockSimulation                                                       │
//! │  ├── current:   book as stored      (first touch loads it)             │
//! │  └── simulated: book after the plan (restores + deductions)            │
//! │                                                                         │
//! │  update/delete: restore(existing items)  stock += qty (checked)        │
//! │  per line:     qty <= 0       → InvalidQuantity                        │
//! │                book missing   → BookNotFound                           │
//! │                deduct fails   → InsufficientStock                      │
//! │                otherwise      → accepted, snapshot = simulated book    │
//! │                                                                         │
//! │  deltas = simulated.stock - current.stock  (per touched book)          │
//! │  Two lines for the same book share one simulated stock.               │
//! │  The order total is checked before any delta is applied.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use folio_core::search::OrderCriteria;
use folio_core::{
    Book, Customer, CustomerRef, EntityId, Order, OrderDraft, OrderItem, OrderLine,
    ValidationError,
};
use folio_store::BookStore;

use super::Backoffice;
use crate::error::{ServiceError, ServiceResult};

// =============================================================================
// Outcome Types
// =============================================================================

/// Why an order line was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    BookNotFound,
    InsufficientStock,
    InvalidQuantity,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::BookNotFound => write!(f, "book not found"),
            RejectReason::InsufficientStock => write!(f, "insufficient stock"),
            RejectReason::InvalidQuantity => write!(f, "invalid quantity"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedItem {
    pub book_id: EntityId,
    pub quantity: i64,
    pub reason: RejectReason,
}

/// A stored order plus the submitted lines that did not make it in.
///
/// A non-empty `rejected` list is still a success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOutcome {
    pub order: Order,
    pub rejected: Vec<RejectedItem>,
}

impl OrderOutcome {
    pub fn is_partial(&self) -> bool {
        !self.rejected.is_empty()
    }
}

// =============================================================================
// Stock Simulation
// =============================================================================

struct StockSimulation<'a> {
    books: &'a BookStore,
    current: BTreeMap<EntityId, i64>,
    simulated: BTreeMap<EntityId, Book>,
}

struct ItemPlan {
    accepted: Vec<OrderItem>,
    rejected: Vec<RejectedItem>,
    deltas: Vec<(EntityId, i64)>,
}

impl<'a> StockSimulation<'a> {
    fn new(books: &'a BookStore) -> Self {
        StockSimulation {
            books,
            current: BTreeMap::new(),
            simulated: BTreeMap::new(),
        }
    }

    fn book(&mut self, id: EntityId) -> Option<&mut Book> {
        match self.simulated.entry(id) {
            Entry::Occupied(e) => Some(e.into_mut()),
            Entry::Vacant(e) => {
                let book = self.books.get(id).ok()?;
                self.current.insert(id, book.stock);
                Some(e.insert(book))
            }
        }
    }

    /// Puts an existing order's items back on the shelf.
    fn restore(&mut self, items: &[OrderItem]) -> ServiceResult<()> {
        for item in items {
            match self.book(item.book.id) {
                Some(book) => book.apply_stock_delta(item.quantity)?,
                None => warn!(
                    book_id = item.book.id,
                    quantity = item.quantity,
                    "Book missing while restoring stock, skipping"
                ),
            }
        }
        Ok(())
    }

    /// Net change per touched book, simulated minus stored.
    fn deltas(&self) -> Vec<(EntityId, i64)> {
        self.simulated
            .iter()
            .filter_map(|(id, book)| {
                let delta = book.stock - self.current.get(id).copied().unwrap_or(book.stock);
                (delta != 0).then_some((*id, delta))
            })
            .collect()
    }

    fn take(&mut self, line: OrderLine) -> Result<OrderItem, RejectReason> {
        if line.quantity <= 0 {
            return Err(RejectReason::InvalidQuantity);
        }
        let book = self.book(line.book_id).ok_or(RejectReason::BookNotFound)?;
        book.deduct(line.quantity)
            .map_err(|_| RejectReason::InsufficientStock)?;
        Ok(OrderItem {
            book: book.clone(),
            quantity: line.quantity,
        })
    }

    fn plan(mut self, lines: &[OrderLine]) -> ItemPlan {
        let mut accepted = Vec::with_capacity(lines.len());
        let mut rejected = Vec::new();

        for &line in lines {
            match self.take(line) {
                Ok(item) => accepted.push(item),
                Err(reason) => {
                    warn!(
                        book_id = line.book_id,
                        quantity = line.quantity,
                        %reason,
                        "Dropping order item"
                    );
                    rejected.push(RejectedItem {
                        book_id: line.book_id,
                        quantity: line.quantity,
                        reason,
                    });
                }
            }
        }

        let deltas = self.deltas();
        ItemPlan {
            accepted,
            rejected,
            deltas,
        }
    }
}

// =============================================================================
// Order Operations
// =============================================================================

impl Backoffice {
    /// Places an order, keeping only the lines that stock allows.
    ///
    /// ## Errors
    /// - `Validation(CustomerUnresolved)` when neither the customer id nor
    ///   the email matches
    /// - `Validation(NoValidItems)` when every line is dropped
    /// - `Validation(Overflow)` when the total does not fit in cents
    ///
    /// Nothing is mutated when an error is returned before the stock step.
    pub fn create_order(&self, draft: OrderDraft) -> ServiceResult<OrderOutcome> {
        let _guard = self.lock_inventory();

        let customer = self.resolve_customer(&draft.customer)?;
        let plan = StockSimulation::new(&self.catalog.books).plan(&draft.items);
        if plan.accepted.is_empty() {
            return Err(ValidationError::NoValidItems {
                action: "create".to_string(),
            }
            .into());
        }

        Order::checked_total(&plan.accepted)?;
        self.apply_deltas(&plan.deltas)?;

        let order = match self
            .catalog
            .orders
            .create(Order::new(customer, plan.accepted))
        {
            Ok(order) => order,
            Err(e) => {
                self.revert_deltas(&plan.deltas);
                return Err(e.into());
            }
        };

        info!(
            order_id = order.id,
            customer_id = order.customer.id,
            items = order.items.len(),
            rejected = plan.rejected.len(),
            total = %order.total_price,
            "Order created"
        );

        self.persist_books()?;
        self.persist_orders()?;

        Ok(OrderOutcome {
            order,
            rejected: plan.rejected,
        })
    }

    /// Replaces an order's customer and items.
    ///
    /// Stock moves by the net difference between the old and new items, so
    /// a rejected update leaves every book exactly as it was. `created_at`
    /// is kept.
    pub fn update_order(&self, id: EntityId, draft: OrderDraft) -> ServiceResult<OrderOutcome> {
        let _guard = self.lock_inventory();
        let existing = self.catalog.orders.get(id)?;
        let customer = self.resolve_customer(&draft.customer)?;

        let mut simulation = StockSimulation::new(&self.catalog.books);
        simulation.restore(&existing.items)?;
        let plan = simulation.plan(&draft.items);
        if plan.accepted.is_empty() {
            return Err(ValidationError::NoValidItems {
                action: "update".to_string(),
            }
            .into());
        }

        Order::checked_total(&plan.accepted)?;
        self.apply_deltas(&plan.deltas)?;

        let order = match self
            .catalog
            .orders
            .update(id, Order::new(customer, plan.accepted))
        {
            Ok(order) => order,
            Err(e) => {
                self.revert_deltas(&plan.deltas);
                return Err(e.into());
            }
        };

        info!(
            order_id = order.id,
            items = order.items.len(),
            rejected = plan.rejected.len(),
            total = %order.total_price,
            "Order updated"
        );

        self.persist_books()?;
        self.persist_orders()?;

        Ok(OrderOutcome {
            order,
            rejected: plan.rejected,
        })
    }

    /// Deletes an order and returns its items to stock.
    ///
    /// Stock is restored before the order is removed. Books that no longer
    /// exist are skipped. If the restore cannot be applied, the order and
    /// every book are left as they were.
    pub fn delete_order(&self, id: EntityId) -> ServiceResult<Order> {
        let _guard = self.lock_inventory();
        let existing = self.catalog.orders.get(id)?;

        let mut simulation = StockSimulation::new(&self.catalog.books);
        simulation.restore(&existing.items)?;
        let deltas = simulation.deltas();
        self.apply_deltas(&deltas)?;

        let order = match self.catalog.orders.delete(id) {
            Ok(order) => order,
            Err(e) => {
                self.revert_deltas(&deltas);
                return Err(e.into());
            }
        };

        info!(order_id = id, items = order.items.len(), "Order deleted");

        self.persist_books()?;
        self.persist_orders()?;
        Ok(order)
    }

    pub fn get_order(&self, id: EntityId) -> ServiceResult<Order> {
        Ok(self.catalog.orders.get(id)?)
    }

    pub fn list_orders(&self) -> Vec<Order> {
        self.catalog.orders.get_all()
    }

    pub fn search_orders(&self, criteria: &OrderCriteria) -> ServiceResult<Vec<Order>> {
        Ok(self.catalog.orders.search(criteria)?)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Id first, then email.
    fn resolve_customer(&self, reference: &CustomerRef) -> ServiceResult<Customer> {
        if let Ok(customer) = self.catalog.customers.get(reference.id) {
            return Ok(customer);
        }

        if !reference.email.is_empty() {
            if let Some(customer) = self.catalog.customers.find_by_email(&reference.email) {
                debug!(
                    customer_id = customer.id,
                    "Resolved order customer by email"
                );
                return Ok(customer);
            }
        }

        Err(ServiceError::Validation(ValidationError::CustomerUnresolved))
    }

    fn apply_deltas(&self, deltas: &[(EntityId, i64)]) -> ServiceResult<()> {
        for (applied, &(book_id, delta)) in deltas.iter().enumerate() {
            if let Err(e) = self.catalog.books.adjust_stock(book_id, delta) {
                self.revert_deltas(&deltas[..applied]);
                return Err(e.into());
            }
        }
        Ok(())
    }

    fn revert_deltas(&self, deltas: &[(EntityId, i64)]) {
        for &(book_id, delta) in deltas {
            if let Err(e) = self.catalog.books.adjust_stock(book_id, -delta) {
                warn!(book_id, delta, error = %e, "Failed to revert stock change");
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoffice::testing::{backoffice, book, customer};
    use crate::error::ErrorKind;

    fn line(book_id: EntityId, quantity: i64) -> OrderLine {
        OrderLine { book_id, quantity }
    }

    fn by_id(id: EntityId) -> CustomerRef {
        CustomerRef {
            id,
            email: String::new(),
        }
    }

    #[test]
    fn test_create_order_deducts_stock_and_snapshots_post_deduction() {
        let (office, sink) = backoffice();
        let b = office.create_book(book("Kindred", 1250, 5)).unwrap();
        let c = office.create_customer(customer("Ada", "ada@example.com")).unwrap();

        let outcome = office
            .create_order(OrderDraft::new(by_id(c.id), vec![line(b.id, 2)]))
            .unwrap();

        assert!(!outcome.is_partial());
        assert_eq!(outcome.order.total_price.cents(), 2500);
        assert_eq!(outcome.order.items[0].book.stock, 3);
        assert_eq!(office.get_book(b.id).unwrap().stock, 3);
        assert_eq!(sink.count("orders"), 1);
    }

    #[test]
    fn test_same_book_twice_sees_earlier_deduction() {
        let (office, _) = backoffice();
        let b = office.create_book(book("Dawn", 1000, 3)).unwrap();
        let c = office.create_customer(customer("Ada", "ada@example.com")).unwrap();

        let outcome = office
            .create_order(OrderDraft::new(
                by_id(c.id),
                vec![line(b.id, 2), line(b.id, 2), line(b.id, 1)],
            ))
            .unwrap();

        assert_eq!(outcome.order.items.len(), 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].reason, RejectReason::InsufficientStock);
        assert_eq!(office.get_book(b.id).unwrap().stock, 0);
    }

    #[test]
    fn test_all_lines_rejected_leaves_stock_untouched() {
        let (office, sink) = backoffice();
        let b = office.create_book(book("Wild Seed", 900, 1)).unwrap();
        let c = office.create_customer(customer("Ada", "ada@example.com")).unwrap();

        let err = office
            .create_order(OrderDraft::new(
                by_id(c.id),
                vec![line(b.id, 5), line(404, 1), line(b.id, 0)],
            ))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            err.to_string(),
            "Validation error: No valid books available to create the order"
        );
        assert_eq!(office.get_book(b.id).unwrap().stock, 1);
        assert!(office.list_orders().is_empty());
        assert_eq!(sink.count("orders"), 0);
    }

    #[test]
    fn test_unknown_customer_rejects_without_touching_stock() {
        let (office, _) = backoffice();
        let b = office.create_book(book("Fledgling", 900, 4)).unwrap();

        let err = office
            .create_order(OrderDraft::new(
                CustomerRef {
                    id: 77,
                    email: "ghost@example.com".to_string(),
                },
                vec![line(b.id, 1)],
            ))
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::CustomerUnresolved)
        ));
        assert_eq!(office.get_book(b.id).unwrap().stock, 4);
    }

    #[test]
    fn test_unknown_customer_wins_over_empty_lines() {
        let (office, _) = backoffice();

        let err = office
            .create_order(OrderDraft::new(by_id(77), vec![line(404, 1), line(405, 0)]))
            .unwrap_err();

        assert_eq!(err.to_string(), "Validation error: Customer does not exist");
    }

    #[test]
    fn test_overflowing_total_rejects_before_stock_moves() {
        let (office, sink) = backoffice();
        let b = office.create_book(book("Parable", 1000, i64::MAX / 2)).unwrap();
        let c = office.create_customer(customer("Ada", "ada@example.com")).unwrap();

        let err = office
            .create_order(OrderDraft::new(by_id(c.id), vec![line(b.id, i64::MAX / 4)]))
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::Overflow { .. })
        ));
        assert_eq!(office.get_book(b.id).unwrap().stock, i64::MAX / 2);
        assert!(office.list_orders().is_empty());
        assert_eq!(sink.count("orders"), 0);
    }

    #[test]
    fn test_overflowing_update_keeps_the_old_order() {
        let (office, _) = backoffice();
        let b = office.create_book(book("Talents", 1000, i64::MAX / 2)).unwrap();
        let c = office.create_customer(customer("Ada", "ada@example.com")).unwrap();
        let created = office
            .create_order(OrderDraft::new(by_id(c.id), vec![line(b.id, 1)]))
            .unwrap()
            .order;

        let err = office
            .update_order(
                created.id,
                OrderDraft::new(by_id(c.id), vec![line(b.id, i64::MAX / 4)]),
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(office.get_book(b.id).unwrap().stock, i64::MAX / 2 - 1);
        assert_eq!(office.get_order(created.id).unwrap(), created);
    }

    #[test]
    fn test_customer_falls_back_to_email() {
        let (office, _) = backoffice();
        let b = office.create_book(book("Imago", 700, 2)).unwrap();
        let c = office.create_customer(customer("Lin", "lin@example.com")).unwrap();

        let outcome = office
            .create_order(OrderDraft::new(
                CustomerRef {
                    id: 999,
                    email: "lin@example.com".to_string(),
                },
                vec![line(b.id, 1)],
            ))
            .unwrap();
        assert_eq!(outcome.order.customer.id, c.id);
    }

    #[test]
    fn test_update_moves_only_net_stock_and_keeps_created_at() {
        let (office, _) = backoffice();
        let a = office.create_book(book("A", 1000, 5)).unwrap();
        let b = office.create_book(book("B", 500, 2)).unwrap();
        let c = office.create_customer(customer("Ada", "ada@example.com")).unwrap();

        let created = office
            .create_order(OrderDraft::new(by_id(c.id), vec![line(a.id, 4)]))
            .unwrap()
            .order;
        assert_eq!(office.get_book(a.id).unwrap().stock, 1);

        // 4 copies come back first, so 5 are available for the new line.
        let updated = office
            .update_order(
                created.id,
                OrderDraft::new(by_id(c.id), vec![line(a.id, 5), line(b.id, 2)]),
            )
            .unwrap()
            .order;

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.total_price.cents(), 6000);
        assert_eq!(office.get_book(a.id).unwrap().stock, 0);
        assert_eq!(office.get_book(b.id).unwrap().stock, 0);
    }

    #[test]
    fn test_rejected_update_mutates_nothing() {
        let (office, _) = backoffice();
        let a = office.create_book(book("A", 1000, 3)).unwrap();
        let c = office.create_customer(customer("Ada", "ada@example.com")).unwrap();
        let created = office
            .create_order(OrderDraft::new(by_id(c.id), vec![line(a.id, 2)]))
            .unwrap()
            .order;

        let err = office
            .update_order(created.id, OrderDraft::new(by_id(c.id), vec![line(a.id, 9)]))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Validation error: No valid books available to update the order"
        );
        assert_eq!(office.get_book(a.id).unwrap().stock, 1);
        assert_eq!(office.get_order(created.id).unwrap(), created);
    }

    #[test]
    fn test_update_missing_order_is_not_found() {
        let (office, _) = backoffice();
        let err = office
            .update_order(3, OrderDraft::new(by_id(1), vec![line(1, 1)]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_delete_order_restores_stock_and_skips_missing_books() {
        let (office, _) = backoffice();
        let a = office.create_book(book("A", 1000, 3)).unwrap();
        let b = office.create_book(book("B", 1000, 3)).unwrap();
        let c = office.create_customer(customer("Ada", "ada@example.com")).unwrap();
        let order = office
            .create_order(OrderDraft::new(by_id(c.id), vec![line(a.id, 2), line(b.id, 1)]))
            .unwrap()
            .order;

        // Bypass the conflict guard to simulate a book vanishing.
        office.catalog().books.delete(b.id).unwrap();

        office.delete_order(order.id).unwrap();
        assert_eq!(office.get_book(a.id).unwrap().stock, 3);
        assert!(office.get_order(order.id).is_err());
    }

    #[test]
    fn test_failed_restore_keeps_order_and_stock() {
        let (office, _) = backoffice();
        let a = office.create_book(book("A", 1000, 3)).unwrap();
        let b = office.create_book(book("B", 1000, 1)).unwrap();
        let c = office.create_customer(customer("Ada", "ada@example.com")).unwrap();

        // A legacy snapshot line with a negative quantity cannot be restored.
        let legacy = office.catalog().orders.insert_direct(Order::new(
            c.clone(),
            vec![
                OrderItem {
                    book: a.clone(),
                    quantity: 2,
                },
                OrderItem {
                    book: b.clone(),
                    quantity: -5,
                },
            ],
        ));

        let err = office.delete_order(legacy.id).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(office.get_order(legacy.id).unwrap(), legacy);
        assert_eq!(office.get_book(a.id).unwrap().stock, 3);
        assert_eq!(office.get_book(b.id).unwrap().stock, 1);
    }

    #[test]
    fn test_plan_deltas_net_out_restores() {
        let (office, _) = backoffice();
        let a = office.create_book(book("A", 1000, 2)).unwrap();

        let mut simulation = StockSimulation::new(&office.catalog().books);
        simulation
            .restore(&[OrderItem {
                book: office.get_book(a.id).unwrap(),
                quantity: 3,
            }])
            .unwrap();
        let plan = simulation.plan(&[line(a.id, 3)]);

        assert_eq!(plan.accepted.len(), 1);
        assert!(plan.deltas.is_empty());
    }
}
