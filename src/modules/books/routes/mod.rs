//! HTTP handlers for the books collection.
//!
//! Each handler re-reads the whole collection, works on it in memory and,
//! for mutations, writes the whole collection back.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};

use bookshelf_http::{AppError, Envelope};

use super::models::{Book, BookPayload, BookSummary, ValidationError};
use super::store::BookStore;
use crate::utils;

pub type SharedStore = Arc<dyn BookStore>;

/// The write operation a validation failure is reported against
#[derive(Debug, Clone, Copy)]
enum Action {
    Create,
    Update,
}

impl Action {
    fn rejection(self, error: ValidationError) -> AppError {
        let prefix = match self {
            Action::Create => "Gagal menambahkan buku",
            Action::Update => "Gagal memperbarui buku",
        };
        AppError::bad_request(format!("{}. {}", prefix, error))
    }
}

/// Book routes with the store applied as state
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/books", post(add_book).get(list_books))
        .route(
            "/books/{book_id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(store)
}

fn to_data<T: Serialize>(key: &str, value: &T) -> anyhow::Result<Value> {
    let value = serde_json::to_value(value).with_context(|| format!("failed to encode {}", key))?;
    let mut data = serde_json::Map::new();
    data.insert(key.to_string(), value);
    Ok(Value::Object(data))
}

async fn load(store: &SharedStore) -> anyhow::Result<Vec<Book>> {
    store
        .read_all()
        .await
        .with_context(|| "failed to read book collection")
}

async fn save(store: &SharedStore, books: &[Book]) -> anyhow::Result<()> {
    store
        .write_all(books)
        .await
        .with_context(|| "failed to write book collection")
}

/// `POST /books`
async fn add_book(
    State(store): State<SharedStore>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<(StatusCode, Envelope), AppError> {
    let Json(payload) = payload?;
    let draft = payload
        .validate()
        .map_err(|e| Action::Create.rejection(e))?;

    let book = Book::new(utils::generate_id(), draft, utils::now_iso8601()?);
    let book_id = book.id.clone();

    let mut books = load(&store).await?;
    books.push(book);
    save(&store, &books).await?;

    tracing::info!(book_id = %book_id, count = books.len(), "book added");

    Ok((
        StatusCode::CREATED,
        Envelope::success()
            .with_message("Buku berhasil ditambahkan")
            .with_data(json!({ "bookId": book_id })),
    ))
}

/// `GET /books`
async fn list_books(State(store): State<SharedStore>) -> Result<Envelope, AppError> {
    let books: Vec<BookSummary> = load(&store)
        .await?
        .iter()
        .map(Book::to_summary)
        .collect();

    Ok(Envelope::success().with_data(to_data("books", &books)?))
}

/// `GET /books/{book_id}`
async fn get_book(
    State(store): State<SharedStore>,
    Path(book_id): Path<String>,
) -> Result<Envelope, AppError> {
    let books = load(&store).await?;
    let book = books
        .iter()
        .find(|b| b.id == book_id)
        .ok_or_else(|| AppError::not_found("Buku tidak ditemukan"))?;

    Ok(Envelope::success().with_data(to_data("book", book)?))
}

/// `PUT /books/{book_id}`
async fn update_book(
    State(store): State<SharedStore>,
    Path(book_id): Path<String>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Envelope, AppError> {
    let Json(payload) = payload?;
    let draft = payload
        .validate()
        .map_err(|e| Action::Update.rejection(e))?;

    let mut books = load(&store).await?;
    let book = books
        .iter_mut()
        .find(|b| b.id == book_id)
        .ok_or_else(|| AppError::not_found("Gagal memperbarui buku. Id tidak ditemukan"))?;

    book.apply(draft, utils::now_iso8601()?);
    save(&store, &books).await?;

    tracing::info!(book_id = %book_id, "book updated");

    Ok(Envelope::success().with_message("Buku berhasil diperbarui"))
}

/// `DELETE /books/{book_id}`
async fn delete_book(
    State(store): State<SharedStore>,
    Path(book_id): Path<String>,
) -> Result<Envelope, AppError> {
    let mut books = load(&store).await?;
    let index = books
        .iter()
        .position(|b| b.id == book_id)
        .ok_or_else(|| AppError::not_found("Buku gagal dihapus. Id tidak ditemukan"))?;

    books.remove(index);
    save(&store, &books).await?;

    tracing::info!(book_id = %book_id, count = books.len(), "book deleted");

    Ok(Envelope::success().with_message("Buku berhasil dihapus"))
}
