//! Book rules: author discovery on write, conflict guard on delete.

use tracing::{debug, info};

use folio_core::search::BookCriteria;
use folio_core::validation::validate_book;
use folio_core::{Author, Book, EntityId};
use folio_store::StoreError;

use super::Backoffice;
use crate::error::ServiceResult;

impl Backoffice {
    /// Adds a book to the catalog.
    ///
    /// The embedded author is linked to a stored author with the same
    /// first name, last name and bio, or created if there is none.
    ///
    /// ## Errors
    /// - `Validation` when stock is below 1 or the price is negative
    pub fn create_book(&self, mut book: Book) -> ServiceResult<Book> {
        validate_book(&book)?;

        let _guard = self.lock_inventory();
        book.author = self.link_author(book.author)?;
        let book = self.catalog.books.create(book)?;

        info!(book_id = book.id, title = %book.title, stock = book.stock, "Book created");
        self.persist_books()?;
        Ok(book)
    }

    /// Replaces a book's fields, stock included.
    pub fn update_book(&self, id: EntityId, mut book: Book) -> ServiceResult<Book> {
        validate_book(&book)?;

        let _guard = self.lock_inventory();
        if !self.catalog.books.contains(id) {
            return Err(StoreError::not_found("Book", id).into());
        }
        book.author = self.link_author(book.author)?;
        let book = self.catalog.books.update(id, book)?;

        info!(book_id = id, stock = book.stock, "Book updated");
        self.persist_books()?;
        Ok(book)
    }

    /// Deletes a book that no order references.
    ///
    /// ## Errors
    /// - `NotFound` if the book does not exist
    /// - `Conflict` if any order item still points at it
    pub fn delete_book(&self, id: EntityId) -> ServiceResult<Book> {
        let _guard = self.lock_inventory();
        if !self.catalog.books.contains(id) {
            return Err(StoreError::not_found("Book", id).into());
        }
        if self.catalog.orders.references_book(id) {
            return Err(StoreError::conflict("Book", id, "book is referenced by orders").into());
        }

        let book = self.catalog.books.delete(id)?;
        info!(book_id = id, "Book deleted");
        self.persist_books()?;
        Ok(book)
    }

    pub fn get_book(&self, id: EntityId) -> ServiceResult<Book> {
        Ok(self.catalog.books.get(id)?)
    }

    pub fn list_books(&self) -> Vec<Book> {
        self.catalog.books.get_all()
    }

    pub fn search_books(&self, criteria: &BookCriteria) -> ServiceResult<Vec<Book>> {
        Ok(self.catalog.books.search(criteria)?)
    }

    // Caller holds the inventory lock.
    fn link_author(&self, author: Author) -> ServiceResult<Author> {
        if let Some(existing) = self.catalog.authors.find_by_identity(&author) {
            debug!(author_id = existing.id, "Linked book to existing author");
            return Ok(existing);
        }

        let created = self.catalog.authors.create(author)?;
        info!(author_id = created.id, name = %created.full_name(), "Author created for book");
        self.persist_authors()?;
        Ok(created)
    }
}
