//! # Catalog
//!
//! The application-owned set of the four entity stores.
//!
//! Constructed explicitly and passed by reference; tests build a fresh
//! `Catalog` per case instead of sharing process-wide instances.

use tracing::{info, warn};

use folio_core::{Author, Book, Customer, Order};

use crate::error::StoreResult;
use crate::memory::{AuthorStore, BookStore, CustomerStore, OrderStore};
use crate::persistence::{
    JsonDirectory, SnapshotSink, AUTHORS_FILE, BOOKS_FILE, CUSTOMERS_FILE, ORDERS_FILE,
};

/// One store per entity kind.
///
/// Cloning shares the underlying stores.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub authors: AuthorStore,
    pub books: BookStore,
    pub customers: CustomerStore,
    pub orders: OrderStore,
}

/// Counts from a startup replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub authors: usize,
    pub books: usize,
    pub customers: usize,
    pub orders: usize,
    pub failed_orders: usize,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replays every snapshot file in `dir` into a fresh catalog.
    ///
    /// ## Replay Rules
    /// - Authors, books and customers are inserted as stored, bypassing
    ///   validation (legacy zero-stock books still load)
    /// - An order is kept only if its customer and every item's book still
    ///   exist; its snapshots, id and timestamp are kept verbatim
    /// - Rejected orders are written to `failed_orders.json`
    ///
    /// ## Errors
    /// Any unreadable or unparsable snapshot aborts the load. Starting with
    /// partial state would let memory and disk silently diverge.
    pub fn load_from(dir: &JsonDirectory) -> StoreResult<(Catalog, LoadSummary)> {
        let catalog = Catalog::new();
        let mut summary = LoadSummary::default();

        let authors: Vec<Author> = dir.read_or_init(AUTHORS_FILE)?;
        let books: Vec<Book> = dir.read_or_init(BOOKS_FILE)?;
        let customers: Vec<Customer> = dir.read_or_init(CUSTOMERS_FILE)?;
        let orders: Vec<Order> = dir.read_or_init(ORDERS_FILE)?;

        for author in authors {
            catalog.authors.insert_direct(author);
            summary.authors += 1;
        }

        for book in books {
            catalog.books.insert_direct(book);
            summary.books += 1;
        }

        for customer in customers {
            catalog.customers.insert_direct(customer);
            summary.customers += 1;
        }

        let mut failed = Vec::new();
        for order in orders {
            if !catalog.customers.contains(order.customer.id) {
                warn!(
                    order_id = order.id,
                    customer_id = order.customer.id,
                    "Skipping order: customer not found"
                );
                failed.push(order);
                continue;
            }

            if let Some(item) = order
                .items
                .iter()
                .find(|item| !catalog.books.contains(item.book.id))
            {
                warn!(
                    order_id = order.id,
                    book_id = item.book.id,
                    "Skipping order: book not found"
                );
                failed.push(order);
                continue;
            }

            catalog.orders.insert_direct(order);
            summary.orders += 1;
        }

        if !failed.is_empty() {
            summary.failed_orders = failed.len();
            dir.save_failed_orders(&failed)?;
        }

        info!(
            authors = summary.authors,
            books = summary.books,
            customers = summary.customers,
            orders = summary.orders,
            failed_orders = summary.failed_orders,
            "Catalog loaded"
        );

        Ok((catalog, summary))
    }
}
