// Blog domain services: comment moderation, post publishing and tag suggestions.
//
// **Architecture Overview:**
// - `core/` = Business logic (storage-agnostic)
// - `infra/` = Implementations of core traits (SQLite, notifications)
// - `config` = Environment-driven settings for the binary
//
// The web layer (routing, templates, sessions) lives elsewhere and only talks
// to the services exposed here.

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
pub mod core;
#[path = "infra/infra_layer.rs"]
pub mod infra;

pub mod config;
