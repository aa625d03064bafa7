//! # State Module
//!
//! The till owns every piece of mutable state the register has.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                          Till                                   │   │
//! │  │                                                                 │   │
//! │  │  inner: Mutex<TillInner>   ◄── one lock for the whole store     │   │
//! │  │    ├── shift: ShiftState   ◄── authoritative shift state         │   │
//! │  │    └── last_archive        ◄── id of the most recent close       │   │
//! │  │                                                                 │   │
//! │  │  db: Database              ◄── workbook load / save             │   │
//! │  │  archives: Arc<dyn ArchiveStore>                                │   │
//! │  │  policy: DeletionPolicy    ◄── injected from configuration      │   │
//! │  │  location, clock                                                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  Every command holds the lock for its full load → mutate → save        │
//! │  cycle, so sessions sharing one till are serialized.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod till;

pub use till::{Clock, ClosedShift, Till};
