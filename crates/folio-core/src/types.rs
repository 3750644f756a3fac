//! # Domain Types
//!
//! Core domain types of the Folio back-office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Author      │◄──│      Book       │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  first_name     │   │  author (copy)  │   │  email (unique) │       │
//! │  │  last_name      │   │  price, stock   │   │  address        │       │
//! │  └─────────────────┘   └────────┬────────┘   └────────┬────────┘       │
//! │                                 │ snapshot            │ snapshot       │
//! │                        ┌────────▼─────────────────────▼────────┐       │
//! │                        │               Order                   │       │
//! │                        │  items: [OrderItem { book, qty }]     │       │
//! │                        │  total_price = Σ price × qty          │       │
//! │                        └───────────────────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! An order embeds *copies* of the customer and each book as they were when
//! the order was last mutated. Changing a book's price afterwards does not
//! touch historical orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

/// Store-assigned integer identity.
pub type EntityId = u64;

// =============================================================================
// Author
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
}

impl Author {
    /// True when both records describe the same person.
    ///
    /// Identity is the exact triple (first name, last name, bio); the id is
    /// ignored so an unsaved author can be matched against stored ones.
    pub fn same_identity(&self, other: &Author) -> bool {
        self.first_name == other.first_name
            && self.last_name == other.last_name
            && self.bio == other.bio
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Book
// =============================================================================

/// A title on the shelf.
///
/// ## Stock Invariant
/// `stock >= 0` after every committed mutation. Deductions go through
/// [`Book::deduct`], which refuses to cross zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub id: EntityId,
    pub title: String,
    pub author: Author,
    #[serde(default)]
    pub genres: Vec<String>,
    pub published_at: DateTime<Utc>,
    pub price: Money,
    pub stock: i64,
}

impl Book {
    /// Removes `qty` copies from stock.
    ///
    /// Fails when `qty` exceeds the stock or the shelf is empty. On error
    /// the book is left untouched.
    pub fn deduct(&mut self, qty: i64) -> CoreResult<()> {
        if self.stock == 0 || qty > self.stock {
            return Err(CoreError::InsufficientStock {
                book_id: self.id,
                available: self.stock,
                requested: qty,
            });
        }
        self.stock -= qty;
        Ok(())
    }

    /// Applies a signed stock change (positive restocks, negative sells).
    pub fn apply_stock_delta(&mut self, delta: i64) -> CoreResult<()> {
        let resulting = self
            .stock
            .checked_add(delta)
            .ok_or_else(|| ValidationError::Overflow {
                field: "stock".to_string(),
            })?;
        if resulting < 0 {
            return Err(CoreError::NegativeStock {
                book_id: self.id,
                resulting,
            });
        }
        self.stock = resulting;
        Ok(())
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

/// A registered buyer.
///
/// `created_at` is stamped by the store on insert and never changes after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub id: EntityId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// One line of an order: a frozen book copy plus the quantity bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub book: Book,
    pub quantity: i64,
}

impl OrderItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        self.book.price.multiply_quantity(self.quantity)
    }
}

/// A placed order.
///
/// ## Invariant
/// `total_price == Σ item.book.price × item.quantity` over `items`. Every
/// path that replaces `items` goes through [`Order::recompute_total`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub id: EntityId,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub total_price: Money,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Builds an order from accepted items, computing the total.
    pub fn new(customer: Customer, items: Vec<OrderItem>) -> Self {
        let mut order = Order {
            id: 0,
            customer,
            items,
            total_price: Money::zero(),
            created_at: DateTime::<Utc>::default(),
        };
        order.recompute_total();
        order
    }

    pub fn compute_total(items: &[OrderItem]) -> Money {
        items.iter().map(OrderItem::line_total).sum()
    }

    /// Like [`Order::compute_total`], but rejects a total that overflows
    /// instead of saturating.
    pub fn checked_total(items: &[OrderItem]) -> Result<Money, ValidationError> {
        items.iter().try_fold(Money::zero(), |total, item| {
            item.book
                .price
                .checked_multiply_quantity(item.quantity)
                .and_then(|line| total.checked_add(line))
                .ok_or_else(|| ValidationError::Overflow {
                    field: "total_price".to_string(),
                })
        })
    }

    pub fn recompute_total(&mut self) {
        self.total_price = Self::compute_total(&self.items);
    }

    pub fn references_book(&self, book_id: EntityId) -> bool {
        self.items.iter().any(|item| item.book.id == book_id)
    }

    pub fn belongs_to(&self, customer_id: EntityId) -> bool {
        self.customer.id == customer_id
    }
}

// =============================================================================
// Order Requests
// =============================================================================

/// How the caller identifies the buyer of an order.
///
/// The id is tried first; the email is the fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub email: String,
}

/// A requested order line, before stock validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub book_id: EntityId,
    pub quantity: i64,
}

/// An order as submitted by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub customer: CustomerRef,
    pub items: Vec<OrderLine>,
}

impl OrderDraft {
    pub fn new(customer: CustomerRef, items: Vec<OrderLine>) -> Self {
        OrderDraft { customer, items }
    }
}

// =============================================================================
// Sales Report
// =============================================================================

/// Quantity sold for one book within a report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSales {
    pub book: Book,
    pub quantity_sold: i64,
}

impl BookSales {
    /// Revenue attributed to this book: current price × quantity sold.
    pub fn revenue(&self) -> Money {
        self.book.price.multiply_quantity(self.quantity_sold)
    }
}

/// A point-in-time aggregate over the orders of one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    pub timestamp: DateTime<Utc>,
    pub total_revenue: Money,
    pub total_orders: u64,
    #[serde(default)]
    pub top_selling_books: Vec<BookSales>,
}

impl SalesReport {
    /// A report for a window that contained no orders.
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        SalesReport {
            timestamp,
            total_revenue: Money::zero(),
            total_orders: 0,
            top_selling_books: Vec::new(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: EntityId, price_cents: i64, stock: i64) -> Book {
        Book {
            id,
            title: format!("Book {id}"),
            author: Author::default(),
            genres: vec!["fiction".to_string()],
            published_at: DateTime::<Utc>::default(),
            price: Money::from_cents(price_cents),
            stock,
        }
    }

    fn customer() -> Customer {
        Customer {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            address: Address::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_deduct_within_stock() {
        let mut b = book(1, 1000, 5);
        b.deduct(3).unwrap();
        assert_eq!(b.stock, 2);
    }

    #[test]
    fn test_deduct_rejects_over_stock_and_empty_shelf() {
        let mut b = book(1, 1000, 2);
        assert!(matches!(
            b.deduct(3),
            Err(CoreError::InsufficientStock { available: 2, requested: 3, .. })
        ));
        assert_eq!(b.stock, 2);

        let mut empty = book(2, 1000, 0);
        assert!(empty.deduct(0).is_err());
    }

    #[test]
    fn test_apply_stock_delta_never_below_zero() {
        let mut b = book(1, 500, 1);
        b.apply_stock_delta(4).unwrap();
        assert_eq!(b.stock, 5);
        assert!(b.apply_stock_delta(-6).is_err());
        assert_eq!(b.stock, 5);
    }

    #[test]
    fn test_apply_stock_delta_rejects_overflow() {
        let mut b = book(1, 500, i64::MAX - 1);
        assert!(matches!(
            b.apply_stock_delta(2),
            Err(CoreError::Validation(ValidationError::Overflow { .. }))
        ));
        assert_eq!(b.stock, i64::MAX - 1);
    }

    #[test]
    fn test_checked_total_rejects_overflow() {
        let items = vec![OrderItem {
            book: book(1, 1000, 1),
            quantity: i64::MAX / 4,
        }];
        assert_eq!(
            Order::checked_total(&items),
            Err(ValidationError::Overflow {
                field: "total_price".to_string()
            })
        );

        let fits = vec![OrderItem {
            book: book(1, 1000, 1),
            quantity: 3,
        }];
        assert_eq!(Order::checked_total(&fits), Ok(Money::from_cents(3000)));
    }

    #[test]
    fn test_order_total_tracks_items() {
        let items = vec![
            OrderItem { book: book(1, 1250, 3), quantity: 2 },
            OrderItem { book: book(2, 499, 9), quantity: 1 },
        ];
        let mut order = Order::new(customer(), items);
        assert_eq!(order.total_price.cents(), 2999);

        order.items.pop();
        order.recompute_total();
        assert_eq!(order.total_price.cents(), 2500);
        assert!(order.references_book(1));
        assert!(!order.references_book(2));
    }

    #[test]
    fn test_author_identity_ignores_id() {
        let stored = Author {
            id: 4,
            first_name: "Ursula".to_string(),
            last_name: "Le Guin".to_string(),
            bio: "Earthsea".to_string(),
        };
        let incoming = Author { id: 0, ..stored.clone() };
        assert!(stored.same_identity(&incoming));

        let other = Author { bio: String::new(), ..incoming };
        assert!(!stored.same_identity(&other));
    }

    #[test]
    fn test_book_json_uses_snake_case_fields() {
        let json = serde_json::to_value(book(3, 1999, 4)).unwrap();
        assert_eq!(json["price"], 1999);
        assert!(json.get("published_at").is_some());
    }
}
