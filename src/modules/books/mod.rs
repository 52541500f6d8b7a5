pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

use store::BookStore;

/// Book collection backed by a [`BookStore`]
pub struct BooksModule {
    store: Arc<dyn BookStore>,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        // Refuse to start on a backing file we could never serve.
        let books = self
            .store
            .read_all()
            .await
            .with_context(|| "book collection is unreadable")?;

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            path = %ctx.settings.storage.books_path.display(),
            count = books.len(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(Arc::clone(&self.store))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let envelope = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": {"$ref": "#/components/schemas/Envelope"}
                    }
                }
            })
        };
        let book_id_param = json!({
            "name": "bookId",
            "in": "path",
            "required": true,
            "schema": {"type": "string"}
        });
        let payload_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": {"$ref": "#/components/schemas/BookPayload"}
                }
            }
        });

        Some(json!({
            "paths": {
                "/books": {
                    "post": {
                        "summary": "Add a book",
                        "tags": ["Books"],
                        "requestBody": payload_body,
                        "responses": {
                            "201": envelope("Book added; data.bookId holds the new id"),
                            "400": envelope("Missing name or readPage greater than pageCount")
                        }
                    },
                    "get": {
                        "summary": "List books as id, name and publisher",
                        "tags": ["Books"],
                        "responses": {
                            "200": envelope("data.books holds the projected records")
                        }
                    }
                },
                "/books/{bookId}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": [book_id_param],
                        "responses": {
                            "200": envelope("data.book holds the full record"),
                            "404": envelope("Unknown id")
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "parameters": [book_id_param],
                        "requestBody": payload_body,
                        "responses": {
                            "200": envelope("Book updated"),
                            "400": envelope("Missing name or readPage greater than pageCount"),
                            "404": envelope("Unknown id")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [book_id_param],
                        "responses": {
                            "200": envelope("Book deleted"),
                            "404": envelope("Unknown id")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "string", "description": "16-character random identifier"},
                            "name": {"type": "string"},
                            "year": {"type": "number"},
                            "author": {"type": "string"},
                            "summary": {"type": "string"},
                            "publisher": {"type": "string"},
                            "pageCount": {"type": "number"},
                            "readPage": {"type": "number"},
                            "finished": {"type": "boolean", "description": "pageCount equals readPage"},
                            "reading": {"type": "boolean"},
                            "insertedAt": {"type": "string", "format": "date-time"},
                            "updatedAt": {"type": "string", "format": "date-time"}
                        },
                        "required": ["id", "name", "finished", "insertedAt", "updatedAt"]
                    },
                    "BookPayload": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string"},
                            "year": {"type": "number"},
                            "author": {"type": "string"},
                            "summary": {"type": "string"},
                            "publisher": {"type": "string"},
                            "pageCount": {"type": "number"},
                            "readPage": {"type": "number", "description": "must not exceed pageCount"},
                            "reading": {"type": "boolean"}
                        },
                        "required": ["name"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module over the given store
pub fn create_module(store: Arc<dyn BookStore>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}
