//! Author rules. Deleting an author sweeps up their unsold books.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use folio_core::search::AuthorCriteria;
use folio_core::validation::ValidationResult;
use folio_core::{Author, EntityId, ValidationError};

use super::Backoffice;
use crate::error::ServiceResult;

/// Result of deleting an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRemoval {
    pub author: Author,
    /// Books deleted along with the author.
    pub removed_books: Vec<EntityId>,
    /// Books left in place because orders reference them.
    pub kept_books: Vec<EntityId>,
}

fn validate_author(author: &Author) -> ValidationResult<()> {
    if author.first_name.trim().is_empty() && author.last_name.trim().is_empty() {
        return Err(ValidationError::required("name"));
    }
    Ok(())
}

impl Backoffice {
    pub fn create_author(&self, author: Author) -> ServiceResult<Author> {
        validate_author(&author)?;

        let _guard = self.lock_inventory();
        let author = self.catalog.authors.create(author)?;
        info!(author_id = author.id, name = %author.full_name(), "Author created");
        self.persist_authors()?;
        Ok(author)
    }

    /// Replaces an author record.
    ///
    /// Books keep the author copy they were written with.
    pub fn update_author(&self, id: EntityId, author: Author) -> ServiceResult<Author> {
        validate_author(&author)?;

        let _guard = self.lock_inventory();
        let author = self.catalog.authors.update(id, author)?;
        info!(author_id = id, "Author updated");
        self.persist_authors()?;
        Ok(author)
    }

    /// Deletes an author, then every book of theirs that no order references.
    ///
    /// The author delete always goes through once the author exists; the
    /// book sweep is best effort.
    pub fn delete_author(&self, id: EntityId) -> ServiceResult<AuthorRemoval> {
        let _guard = self.lock_inventory();
        let author = self.catalog.authors.delete(id)?;
        self.persist_authors()?;

        let mut removed_books = Vec::new();
        let mut kept_books = Vec::new();
        for book in self.catalog.books.by_author(id) {
            if self.catalog.orders.references_book(book.id) {
                kept_books.push(book.id);
                continue;
            }
            match self.catalog.books.delete(book.id) {
                Ok(_) => removed_books.push(book.id),
                Err(e) => warn!(book_id = book.id, error = %e, "Failed to delete author's book"),
            }
        }
        removed_books.sort_unstable();
        kept_books.sort_unstable();

        info!(
            author_id = id,
            removed = removed_books.len(),
            kept = kept_books.len(),
            "Author deleted"
        );

        if !removed_books.is_empty() {
            self.persist_books()?;
        }

        Ok(AuthorRemoval {
            author,
            removed_books,
            kept_books,
        })
    }

    pub fn get_author(&self, id: EntityId) -> ServiceResult<Author> {
        Ok(self.catalog.authors.get(id)?)
    }

    pub fn list_authors(&self) -> Vec<Author> {
        self.catalog.authors.get_all()
    }

    pub fn search_authors(&self, criteria: &AuthorCriteria) -> ServiceResult<Vec<Author>> {
        Ok(self.catalog.authors.search(criteria)?)
    }
}
