//! # Repository Module
//!
//! Database repository implementations for the till.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Till command                                                          │
//! │       │                                                                 │
//! │       │  db.workbooks().save(&workbook)                                │
//! │       ▼                                                                 │
//! │  WorkbookRepository                                                    │
//! │  ├── load(&self)                                                       │
//! │  ├── load_with_schema(&self)                                           │
//! │  └── save(&self, workbook)                                             │
//! │       │                                                                 │
//! │       │  SQL (one transaction per save)                                │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`WorkbookRepository`](workbook::WorkbookRepository) - Whole-document load and save

pub mod workbook;
