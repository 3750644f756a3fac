//! # Search Criteria
//!
//! Structured, all-optional filters for each entity kind.
//!
//! ## Matching Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      How Criteria Combine                               │
//! │                                                                         │
//! │  BookCriteria {                                                        │
//! │      ids:    [1, 2]          ──►  id == 1  OR  id == 2                 │
//! │      genres: ["sf", "horror"]──►  has "sf" OR has "horror"             │
//! │      min_price: 500          ──►  price >= 500                         │
//! │  }                                                                      │
//! │                                                                         │
//! │  Values inside one list are OR'd; separate fields are AND'd.           │
//! │                                                                         │
//! │  EMPTY means "no filter":                                              │
//! │  • empty list         → dimension ignored                              │
//! │  • None / 0 bound     → dimension ignored                              │
//! │  • Default::default() → matches every entity                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Numeric bounds (price, stock, quantity) only apply when positive, so a
//! bound of `0` reads the same as an absent one. Timestamp bounds are
//! inclusive at both ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Address, Author, Book, Customer, EntityId, Order, OrderItem};
use crate::validation::{validate_range, ValidationResult};

// =============================================================================
// Criteria Trait
// =============================================================================

/// A predicate over one entity kind.
pub trait Criteria<T> {
    /// True when `item` passes every active filter.
    fn matches(&self, item: &T) -> bool;

    /// Rejects self-contradictory criteria (e.g. an inverted range).
    fn validate(&self) -> ValidationResult<()> {
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Empty set matches anything; otherwise `value` must be a member.
fn in_set<T: PartialEq>(set: &[T], value: &T) -> bool {
    set.is_empty() || set.contains(value)
}

fn positive(bound: Option<i64>) -> Option<i64> {
    bound.filter(|b| *b > 0)
}

fn positive_money(bound: Option<Money>) -> Option<Money> {
    bound.filter(Money::is_positive)
}

fn within<T: PartialOrd>(value: &T, min: Option<&T>, max: Option<&T>) -> bool {
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

fn within_time(
    value: &DateTime<Utc>,
    min: Option<DateTime<Utc>>,
    max: Option<DateTime<Utc>>,
) -> bool {
    within(value, min.as_ref(), max.as_ref())
}

fn contains_ignore_case(field: &str, keyword: &str) -> bool {
    field.to_lowercase().contains(&keyword.to_lowercase())
}

// =============================================================================
// Author
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorCriteria {
    pub ids: Vec<EntityId>,
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
    /// Case-insensitive substring match against first name, last name or
    /// bio. Any single keyword hit is enough.
    pub keywords: Vec<String>,
}

impl Criteria<Author> for AuthorCriteria {
    fn matches(&self, author: &Author) -> bool {
        if !in_set(&self.ids, &author.id)
            || !in_set(&self.first_names, &author.first_name)
            || !in_set(&self.last_names, &author.last_name)
        {
            return false;
        }

        if self.keywords.is_empty() {
            return true;
        }

        self.keywords.iter().any(|keyword| {
            contains_ignore_case(&author.first_name, keyword)
                || contains_ignore_case(&author.last_name, keyword)
                || contains_ignore_case(&author.bio, keyword)
        })
    }
}

// =============================================================================
// Book
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookCriteria {
    pub ids: Vec<EntityId>,
    pub titles: Vec<String>,
    /// Book matches if it carries at least one of these genres.
    pub genres: Vec<String>,
    pub min_published_at: Option<DateTime<Utc>>,
    pub max_published_at: Option<DateTime<Utc>>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
    /// Applied to the author embedded in the book.
    pub author: AuthorCriteria,
}

impl Criteria<Book> for BookCriteria {
    fn matches(&self, book: &Book) -> bool {
        in_set(&self.ids, &book.id)
            && in_set(&self.titles, &book.title)
            && (self.genres.is_empty() || self.genres.iter().any(|g| book.has_genre(g)))
            && within_time(&book.published_at, self.min_published_at, self.max_published_at)
            && within(
                &book.price,
                positive_money(self.min_price).as_ref(),
                positive_money(self.max_price).as_ref(),
            )
            && within(
                &book.stock,
                positive(self.min_stock).as_ref(),
                positive(self.max_stock).as_ref(),
            )
            && self.author.matches(&book.author)
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_range(
            "published_at",
            self.min_published_at.as_ref(),
            self.max_published_at.as_ref(),
        )?;
        validate_range(
            "price",
            positive_money(self.min_price).as_ref(),
            positive_money(self.max_price).as_ref(),
        )?;
        validate_range(
            "stock",
            positive(self.min_stock).as_ref(),
            positive(self.max_stock).as_ref(),
        )
    }
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressCriteria {
    pub streets: Vec<String>,
    pub cities: Vec<String>,
    pub states: Vec<String>,
    pub postal_codes: Vec<String>,
    pub countries: Vec<String>,
}

impl Criteria<Address> for AddressCriteria {
    fn matches(&self, address: &Address) -> bool {
        in_set(&self.streets, &address.street)
            && in_set(&self.cities, &address.city)
            && in_set(&self.states, &address.state)
            && in_set(&self.postal_codes, &address.postal_code)
            && in_set(&self.countries, &address.country)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerCriteria {
    pub ids: Vec<EntityId>,
    pub names: Vec<String>,
    pub emails: Vec<String>,
    pub address: AddressCriteria,
    pub min_created_at: Option<DateTime<Utc>>,
    pub max_created_at: Option<DateTime<Utc>>,
}

impl Criteria<Customer> for CustomerCriteria {
    fn matches(&self, customer: &Customer) -> bool {
        in_set(&self.ids, &customer.id)
            && in_set(&self.names, &customer.name)
            && in_set(&self.emails, &customer.email)
            && self.address.matches(&customer.address)
            && within_time(&customer.created_at, self.min_created_at, self.max_created_at)
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_range(
            "created_at",
            self.min_created_at.as_ref(),
            self.max_created_at.as_ref(),
        )
    }
}

// =============================================================================
// Order
// =============================================================================

/// Filter applied to individual order lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderItemCriteria {
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
    pub book: BookCriteria,
}

impl OrderItemCriteria {
    pub fn is_empty(&self) -> bool {
        *self == OrderItemCriteria::default()
    }
}

impl Criteria<OrderItem> for OrderItemCriteria {
    fn matches(&self, item: &OrderItem) -> bool {
        within(
            &item.quantity,
            positive(self.min_quantity).as_ref(),
            positive(self.max_quantity).as_ref(),
        ) && self.book.matches(&item.book)
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_range(
            "quantity",
            positive(self.min_quantity).as_ref(),
            positive(self.max_quantity).as_ref(),
        )?;
        self.book.validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderCriteria {
    pub ids: Vec<EntityId>,
    pub customer_ids: Vec<EntityId>,
    pub min_total_price: Option<Money>,
    pub max_total_price: Option<Money>,
    pub min_created_at: Option<DateTime<Utc>>,
    pub max_created_at: Option<DateTime<Utc>>,
    /// An order matches when at least one of its lines passes.
    pub items: OrderItemCriteria,
}

impl Criteria<Order> for OrderCriteria {
    fn matches(&self, order: &Order) -> bool {
        in_set(&self.ids, &order.id)
            && in_set(&self.customer_ids, &order.customer.id)
            && within(
                &order.total_price,
                positive_money(self.min_total_price).as_ref(),
                positive_money(self.max_total_price).as_ref(),
            )
            && within_time(&order.created_at, self.min_created_at, self.max_created_at)
            && (self.items.is_empty() || order.items.iter().any(|i| self.items.matches(i)))
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_range(
            "total_price",
            positive_money(self.min_total_price).as_ref(),
            positive_money(self.max_total_price).as_ref(),
        )?;
        validate_range(
            "created_at",
            self.min_created_at.as_ref(),
            self.max_created_at.as_ref(),
        )?;
        self.items.validate()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn author(first: &str, last: &str, bio: &str) -> Author {
        Author {
            id: 1,
            first_name: first.to_string(),
            last_name: last.to_string(),
            bio: bio.to_string(),
        }
    }

    fn book(id: EntityId, genres: &[&str], price_cents: i64, stock: i64) -> Book {
        Book {
            id,
            title: format!("Title {id}"),
            author: author("Octavia", "Butler", "Wrote Kindred"),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            published_at: Utc.with_ymd_and_hms(1979, 6, 1, 0, 0, 0).unwrap(),
            price: Money::from_cents(price_cents),
            stock,
        }
    }

    fn order(id: EntityId, items: Vec<OrderItem>) -> Order {
        let customer = Customer {
            id: 9,
            name: "Lin".to_string(),
            email: "lin@example.com".to_string(),
            address: Address {
                city: "Lisbon".to_string(),
                ..Address::default()
            },
            created_at: Utc::now(),
        };
        let mut order = Order::new(customer, items);
        order.id = id;
        order
    }

    #[test]
    fn test_default_criteria_match_everything() {
        let b = book(1, &[], 0, 0);
        assert!(BookCriteria::default().matches(&b));
        assert!(AuthorCriteria::default().matches(&b.author));
        assert!(OrderCriteria::default().matches(&order(1, vec![])));
    }

    #[test]
    fn test_author_keywords_are_case_insensitive_and_any() {
        let a = author("Octavia", "Butler", "Wrote Kindred");
        let criteria = AuthorCriteria {
            keywords: vec!["nomatch".to_string(), "KINDRED".to_string()],
            ..Default::default()
        };
        assert!(criteria.matches(&a));

        let criteria = AuthorCriteria {
            keywords: vec!["tolkien".to_string()],
            ..Default::default()
        };
        assert!(!criteria.matches(&a));
    }

    #[test]
    fn test_author_name_sets_are_exact() {
        let a = author("Octavia", "Butler", "");
        let criteria = AuthorCriteria {
            first_names: vec!["octavia".to_string()],
            ..Default::default()
        };
        assert!(!criteria.matches(&a));
    }

    #[test]
    fn test_book_genre_any_and_fields_and() {
        let b = book(1, &["sf", "classic"], 1500, 4);
        let criteria = BookCriteria {
            genres: vec!["horror".to_string(), "sf".to_string()],
            min_price: Some(Money::from_cents(1000)),
            ..Default::default()
        };
        assert!(criteria.matches(&b));

        let criteria = BookCriteria {
            genres: vec!["sf".to_string()],
            max_stock: Some(3),
            ..Default::default()
        };
        assert!(!criteria.matches(&b));
    }

    #[test]
    fn test_zero_numeric_bounds_are_ignored() {
        let b = book(1, &[], 1500, 4);
        let criteria = BookCriteria {
            min_price: Some(Money::zero()),
            max_price: Some(Money::zero()),
            min_stock: Some(0),
            max_stock: Some(0),
            ..Default::default()
        };
        assert!(criteria.matches(&b));
    }

    #[test]
    fn test_book_published_range_is_inclusive() {
        let b = book(1, &[], 100, 1);
        let criteria = BookCriteria {
            min_published_at: Some(b.published_at),
            max_published_at: Some(b.published_at),
            ..Default::default()
        };
        assert!(criteria.matches(&b));

        let criteria = BookCriteria {
            min_published_at: Some(b.published_at + Duration::seconds(1)),
            ..Default::default()
        };
        assert!(!criteria.matches(&b));
    }

    #[test]
    fn test_nested_author_criteria_on_book() {
        let b = book(1, &[], 100, 1);
        let criteria = BookCriteria {
            author: AuthorCriteria {
                last_names: vec!["Butler".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(criteria.matches(&b));
    }

    #[test]
    fn test_customer_address_criteria() {
        let o = order(1, vec![]);
        let criteria = CustomerCriteria {
            address: AddressCriteria {
                cities: vec!["Porto".to_string(), "Lisbon".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(criteria.matches(&o.customer));

        let criteria = CustomerCriteria {
            address: AddressCriteria {
                countries: vec!["PT".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(!criteria.matches(&o.customer));
    }

    #[test]
    fn test_order_matches_if_any_item_matches() {
        let o = order(
            1,
            vec![
                OrderItem { book: book(1, &["sf"], 1000, 5), quantity: 1 },
                OrderItem { book: book(2, &["poetry"], 800, 5), quantity: 4 },
            ],
        );

        let criteria = OrderCriteria {
            items: OrderItemCriteria {
                min_quantity: Some(3),
                book: BookCriteria {
                    genres: vec!["poetry".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(criteria.matches(&o));

        // Both conditions must hold on the same line.
        let criteria = OrderCriteria {
            items: OrderItemCriteria {
                min_quantity: Some(3),
                book: BookCriteria {
                    genres: vec!["sf".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(!criteria.matches(&o));
    }

    #[test]
    fn test_order_total_and_customer_filters() {
        let o = order(3, vec![OrderItem { book: book(1, &[], 1000, 5), quantity: 2 }]);
        let criteria = OrderCriteria {
            customer_ids: vec![9],
            min_total_price: Some(Money::from_cents(2000)),
            max_total_price: Some(Money::from_cents(2000)),
            ..Default::default()
        };
        assert!(criteria.matches(&o));

        let criteria = OrderCriteria {
            customer_ids: vec![10],
            ..Default::default()
        };
        assert!(!criteria.matches(&o));
    }

    #[test]
    fn test_inverted_ranges_fail_validation() {
        let criteria = BookCriteria {
            min_stock: Some(10),
            max_stock: Some(2),
            ..Default::default()
        };
        assert!(criteria.validate().is_err());

        let criteria = OrderCriteria {
            items: OrderItemCriteria {
                min_quantity: Some(5),
                max_quantity: Some(1),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(criteria.validate().is_err());
    }

    #[test]
    fn test_criteria_deserialize_from_partial_json() {
        let criteria: BookCriteria =
            serde_json::from_str(r#"{ "genres": ["sf"], "min_price": 500 }"#).unwrap();
        assert_eq!(criteria.genres, vec!["sf".to_string()]);
        assert_eq!(criteria.min_price, Some(Money::from_cents(500)));
        assert!(criteria.ids.is_empty());
    }
}
