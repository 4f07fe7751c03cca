//! Configuration loading and validation.
//!
//! [`Settings`] is the serialisable half of the configuration: everything
//! that can live in a file or an environment variable. Layers are applied in
//! order, each overriding the previous one field by field:
//!
//! 1. compiled defaults ([`Settings::default`]),
//! 2. an optional file (TOML, YAML or JSON, chosen by extension),
//! 3. `MAGPIE_`-prefixed environment variables (`MAGPIE_FOLDER=assets`).
//!
//! Function-valued options (the cache predicate and key derivation) cannot
//! be expressed here; `magpie-cache` builds its runtime options on top of
//! these settings.

pub mod error;
mod load;
mod settings;

pub use crate::load::{ENV_PREFIX, default_path, figment, load};
pub use crate::settings::{KeyAlgorithm, Settings};
