//! nodefit-session — live recomputation for interactive use.
//!
//! Holds the most recent input snapshot and the most recent report,
//! applies user edits, and recomputes from scratch once edits settle.
//!
//! # Architecture
//!
//! ```text
//! stdin reader ──mpsc──▶ Debouncer (trailing edge, 120ms)
//!                              │ batch of InputChange
//!                              ▼
//!                           Session
//!                              ├── RawInputs snapshot
//!                              └── Report (params, distribution, summary, sweep)
//! ```

pub mod debounce;
pub mod input;
pub mod session;

pub use debounce::Debouncer;
pub use input::{FlagField, InputChange, InputError, NumericField};
pub use session::{Report, Session};
