//! # Sales Report Generator
//!
//! Aggregates the orders of a time window into a [`SalesReport`].
//!
//! ## Scan
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Report Generation                                    │
//! │                                                                         │
//! │  orders.created_between(start, end)      [start, end)                  │
//! │       │                                                                 │
//! │       ▼  for each order          ◄── cancel check                       │
//! │  revenue += total_price, orders += 1                                   │
//! │       │                                                                 │
//! │       ▼  for each item           ◄── cancel check                       │
//! │  books.get(item.book.id)  (CURRENT record, not the order snapshot)     │
//! │       ├── missing  → skip (revenue above still counts)                 │
//! │       └── found    → sold[book] += quantity                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  rank by price × sold, descending; keep top N                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  save: load list ─► append ─► cancel check ─► store list               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use folio_core::validation::validate_range;
use folio_core::{
    Book, BookSales, EntityId, Money, Order, SalesReport, REPORT_WINDOW_HOURS, TOP_SELLERS_LIMIT,
};
use folio_store::{BookStore, Catalog, OrderStore, ReportArchive};

use super::cancel::CancelSignal;
use crate::error::{ServiceError, ServiceResult};

/// Filter for stored reports, by calendar day (UTC).
///
/// Both ends are inclusive: `end_date` covers that whole day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SalesReportQuery {
    fn matches(&self, timestamp: &DateTime<Utc>) -> bool {
        let after_start = self
            .start_date
            .map_or(true, |day| *timestamp >= day.and_time(NaiveTime::MIN).and_utc());
        let before_end = self.end_date.map_or(true, |day| match day.succ_opt() {
            Some(next) => *timestamp < next.and_time(NaiveTime::MIN).and_utc(),
            None => true,
        });
        after_start && before_end
    }
}

/// Computes and archives sales reports.
pub struct SalesReportGenerator {
    orders: OrderStore,
    books: BookStore,
    archive: Arc<dyn ReportArchive>,
    window: Duration,
    top_sellers: usize,
}

impl std::fmt::Debug for SalesReportGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesReportGenerator")
            .field("window", &self.window)
            .field("top_sellers", &self.top_sellers)
            .finish_non_exhaustive()
    }
}

impl SalesReportGenerator {
    pub fn new(catalog: &Catalog, archive: Arc<dyn ReportArchive>) -> Self {
        SalesReportGenerator {
            orders: catalog.orders.clone(),
            books: catalog.books.clone(),
            archive,
            window: Duration::hours(REPORT_WINDOW_HOURS),
            top_sellers: TOP_SELLERS_LIMIT,
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_top_sellers(mut self, top_sellers: usize) -> Self {
        self.top_sellers = top_sellers;
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Generates the report for `[end - window, end)` and archives it.
    ///
    /// A window with no orders still produces and archives an empty report.
    pub fn run<S>(&self, end: DateTime<Utc>, cancel: &S) -> ServiceResult<SalesReport>
    where
        S: CancelSignal + ?Sized,
    {
        let report = self.generate_sales_report(end - self.window, end, cancel)?;
        self.save_sales_report(&report, cancel)?;

        info!(
            timestamp = %report.timestamp,
            orders = report.total_orders,
            revenue = %report.total_revenue,
            top_sellers = report.top_selling_books.len(),
            "Sales report generated"
        );
        Ok(report)
    }

    /// Aggregates the orders created in `[start, end)`. Nothing is persisted.
    ///
    /// ## Errors
    /// - `Canceled` as soon as the signal fires between two steps
    /// - `Validation` if `start > end`
    pub fn generate_sales_report<S>(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cancel: &S,
    ) -> ServiceResult<SalesReport>
    where
        S: CancelSignal + ?Sized,
    {
        validate_range("report window", Some(&start), Some(&end))?;

        let mut orders = self.orders.created_between(start, end);
        orders.sort_by_key(|order| (order.created_at, order.id));
        debug!(%start, %end, orders = orders.len(), "Scanning report window");

        let mut total_revenue = Money::zero();
        let mut total_orders = 0u64;
        let mut sold: HashMap<EntityId, (Book, i64)> = HashMap::new();

        for order in &orders {
            check(cancel)?;
            total_revenue += order.total_price;
            total_orders += 1;
            self.tally_items(order, &mut sold, cancel)?;
        }

        let mut top_selling_books: Vec<BookSales> = sold
            .into_values()
            .map(|(book, quantity_sold)| BookSales {
                book,
                quantity_sold,
            })
            .collect();
        top_selling_books.sort_by(|a, b| {
            b.revenue()
                .cmp(&a.revenue())
                .then_with(|| a.book.id.cmp(&b.book.id))
        });
        top_selling_books.truncate(self.top_sellers);

        Ok(SalesReport {
            timestamp: end,
            total_revenue,
            total_orders,
            top_selling_books,
        })
    }

    fn tally_items<S>(
        &self,
        order: &Order,
        sold: &mut HashMap<EntityId, (Book, i64)>,
        cancel: &S,
    ) -> ServiceResult<()>
    where
        S: CancelSignal + ?Sized,
    {
        for item in &order.items {
            check(cancel)?;
            if let Some((_, quantity)) = sold.get_mut(&item.book.id) {
                *quantity += item.quantity;
                continue;
            }
            match self.books.get(item.book.id) {
                Ok(book) => {
                    sold.insert(book.id, (book, item.quantity));
                }
                Err(_) => debug!(
                    order_id = order.id,
                    book_id = item.book.id,
                    "Book no longer exists, skipping for top sellers"
                ),
            }
        }
        Ok(())
    }

    /// Appends `report` to the archive.
    ///
    /// The signal is checked after loading and right before the write, so a
    /// cancelled run never touches the archive.
    pub fn save_sales_report<S>(&self, report: &SalesReport, cancel: &S) -> ServiceResult<()>
    where
        S: CancelSignal + ?Sized,
    {
        let mut reports = self.archive.load_reports()?;
        reports.push(report.clone());
        check(cancel)?;
        self.archive.store_reports(&reports)?;
        debug!(count = reports.len(), "Sales report archived");
        Ok(())
    }

    /// Archived reports whose timestamp falls within the query's days.
    pub fn list_sales_reports(&self, query: &SalesReportQuery) -> ServiceResult<Vec<SalesReport>> {
        validate_range("date", query.start_date.as_ref(), query.end_date.as_ref())?;
        Ok(self
            .archive
            .load_reports()?
            .into_iter()
            .filter(|report| query.matches(&report.timestamp))
            .collect())
    }
}

fn check<S: CancelSignal + ?Sized>(cancel: &S) -> ServiceResult<()> {
    if cancel.is_canceled() {
        info!("Sales report generation canceled");
        return Err(ServiceError::Canceled);
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::cancel::NeverCancel;
    use chrono::TimeZone;
    use folio_core::{Address, Author, Customer, OrderItem};
    use folio_store::MemoryArchive;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fires after `n` checks have passed.
    struct CancelAfter {
        remaining: AtomicUsize,
    }

    impl CancelAfter {
        fn new(n: usize) -> Self {
            CancelAfter {
                remaining: AtomicUsize::new(n),
            }
        }
    }

    impl CancelSignal for CancelAfter {
        fn is_canceled(&self) -> bool {
            self.remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_err()
        }
    }

    fn end() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn book(id: EntityId, price: i64) -> Book {
        Book {
            id,
            title: format!("Book {id}"),
            author: Author::default(),
            genres: vec![],
            published_at: DateTime::<Utc>::default(),
            price: Money::from_cents(price),
            stock: 10,
        }
    }

    fn customer() -> Customer {
        Customer {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            address: Address::default(),
            created_at: DateTime::<Utc>::default(),
        }
    }

    fn place(catalog: &Catalog, hours_before_end: i64, items: &[(EntityId, i64)]) -> Order {
        let items = items
            .iter()
            .map(|&(id, quantity)| OrderItem {
                book: catalog.books.get(id).unwrap(),
                quantity,
            })
            .collect();
        let mut order = Order::new(customer(), items);
        order.created_at = end() - Duration::hours(hours_before_end);
        catalog.orders.insert_direct(order)
    }

    fn setup(books: &[(EntityId, i64)]) -> (Catalog, Arc<MemoryArchive>, SalesReportGenerator) {
        let catalog = Catalog::new();
        for &(id, price) in books {
            catalog.books.insert_direct(book(id, price));
        }
        let archive = Arc::new(MemoryArchive::new());
        let generator = SalesReportGenerator::new(&catalog, archive.clone());
        (catalog, archive, generator)
    }

    #[test]
    fn test_report_sums_orders_in_window_only() {
        let (catalog, archive, generator) = setup(&[(1, 1000), (2, 250)]);
        let first = place(&catalog, 1, &[(1, 2)]);
        let second = place(&catalog, 23, &[(2, 4), (1, 1)]);
        place(&catalog, 25, &[(1, 5)]);
        place(&catalog, 0, &[(1, 5)]); // at `end`, excluded

        let report = generator.run(end(), &NeverCancel).unwrap();

        assert_eq!(report.total_orders, 2);
        assert_eq!(report.total_revenue, first.total_price + second.total_price);
        assert_eq!(report.timestamp, end());
        assert_eq!(report.top_selling_books.len(), 2);
        assert_eq!(report.top_selling_books[0].book.id, 1);
        assert_eq!(report.top_selling_books[0].quantity_sold, 3);
        assert_eq!(report.top_selling_books[1].revenue().cents(), 1000);
        assert_eq!(archive.reports(), vec![report]);
    }

    #[test]
    fn test_top_sellers_use_current_price_and_cap() {
        let books: Vec<_> = (1..=7).map(|id| (id, id as i64 * 100)).collect();
        let (catalog, _, generator) = setup(&books);
        let lines: Vec<_> = (1..=7).map(|id| (id, 1)).collect();
        place(&catalog, 2, &lines);

        // Price change after the sale moves book 1 to the top.
        let mut repriced = catalog.books.get(1).unwrap();
        repriced.price = Money::from_cents(10_000);
        catalog.books.update(1, repriced).unwrap();

        let report = generator.run(end(), &NeverCancel).unwrap();
        let ranked: Vec<_> = report.top_selling_books.iter().map(|s| s.book.id).collect();
        assert_eq!(ranked, vec![1, 7, 6, 5, 4]);
        assert!(report
            .top_selling_books
            .windows(2)
            .all(|w| w[0].revenue() >= w[1].revenue()));
    }

    #[test]
    fn test_deleted_book_counts_revenue_but_not_top_sellers() {
        let (catalog, _, generator) = setup(&[(1, 1000), (2, 500)]);
        let order = place(&catalog, 3, &[(1, 1), (2, 1)]);
        catalog.books.delete(2).unwrap();

        let report = generator.run(end(), &NeverCancel).unwrap();
        assert_eq!(report.total_revenue, order.total_price);
        assert_eq!(report.top_selling_books.len(), 1);
    }

    #[test]
    fn test_empty_window_still_archived() {
        let (_, archive, generator) = setup(&[]);
        let report = generator.run(end(), &NeverCancel).unwrap();
        assert_eq!(report, SalesReport::empty(end()));
        assert_eq!(archive.write_count(), 1);
    }

    #[test]
    fn test_cancel_mid_scan_persists_nothing() {
        let (catalog, archive, generator) = setup(&[(1, 1000)]);
        for hours in 1..=4 {
            place(&catalog, hours, &[(1, 1), (1, 1)]);
        }

        // Order, item, item, order, item... the fifth check fires.
        let err = generator.run(end(), &CancelAfter::new(4)).unwrap_err();
        assert!(err.is_canceled());
        assert_eq!(archive.write_count(), 0);
    }

    #[test]
    fn test_cancel_before_write_persists_nothing() {
        let (catalog, archive, generator) = setup(&[(1, 1000)]);
        place(&catalog, 1, &[(1, 1)]);

        // Two scan checks pass; the save check fires.
        let err = generator.run(end(), &CancelAfter::new(2)).unwrap_err();
        assert!(err.is_canceled());
        assert!(archive.reports().is_empty());
    }

    #[test]
    fn test_reports_accumulate_without_dedup() {
        let (_, archive, generator) = setup(&[]);
        generator.run(end(), &NeverCancel).unwrap();
        generator.run(end(), &NeverCancel).unwrap();
        assert_eq!(archive.reports().len(), 2);
    }

    #[test]
    fn test_custom_range_and_inverted_range() {
        let (catalog, archive, generator) = setup(&[(1, 1000)]);
        place(&catalog, 30, &[(1, 1)]);

        let report = generator
            .generate_sales_report(end() - Duration::hours(48), end(), &NeverCancel)
            .unwrap();
        assert_eq!(report.total_orders, 1);
        assert_eq!(archive.write_count(), 0);

        let err = generator
            .generate_sales_report(end(), end() - Duration::hours(1), &NeverCancel)
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[test]
    fn test_list_reports_by_day() {
        let (_, _, generator) = setup(&[]);
        for day in [8, 9, 10] {
            let at = Utc.with_ymd_and_hms(2024, 3, day, 23, 59, 59).unwrap();
            generator.run(at, &NeverCancel).unwrap();
        }

        let query = SalesReportQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 9),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 9),
        };
        let found = generator.list_sales_reports(&query).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].timestamp.date_naive(), query.start_date.unwrap());

        assert_eq!(
            generator
                .list_sales_reports(&SalesReportQuery::default())
                .unwrap()
                .len(),
            3
        );

        let inverted = SalesReportQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 10),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 9),
        };
        assert!(generator.list_sales_reports(&inverted).is_err());
    }
}
