//! Output generation: JSON drafts, standalone HTML pages, and session logs.
//!
//! # Submodules
//!
//! - [`json`]: publish-ready JSON draft records with the embedded QA verdict
//! - [`html`]: standalone HTML article pages
//! - [`logs`]: per-article session logs covering each pipeline phase
//!
//! # Output Structure
//!
//! ```text
//! drafts_dir/
//! ├── apple-ships-new-phones__20250506_203000.json
//! └── apple-ships-new-phones.html
//! published_dir/
//! └── apple-ships-new-phones__20250506_210000_published.json
//! logs_dir/
//! └── apple-ships-new-phones.log
//! ```

pub mod html;
pub mod json;
pub mod logs;
