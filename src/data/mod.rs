//! Data layer: core types, loading, inspection, cleaning, filtering, export.
//!
//! Architecture:
//! ```text
//!  .csv / .xlsx / .json bytes
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse bytes → Table
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐      ┌──────────┐
//!   │  schema   │ ◄── │ missing   │  optional: drop incomplete rows → new Table
//!   └──────────┘      └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  selections → FilterSpecs → FilteredView
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export   │  Table → CSV bytes
//!   └──────────┘
//! ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod missing;
pub mod model;
pub mod schema;
