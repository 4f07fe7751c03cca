//! Build-pipeline side of magpie.
//!
//! A [`Site`] holds the pages of one build. Processors registered with
//! [`Site::process`] run over the pages matching their extensions, in
//! registration order, before the pages are written to the output backend.
//! [`Localizer`] is the processor that downloads remote assets and points
//! the pages at the local copies.
//!
//! ```no_run
//! use std::sync::Arc;
//! use magpie_config::Settings;
//! use magpie_site::{Localizer, Site};
//! use magpie_storage::backend::LocalBackend;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = LocalBackend::new("source", "/srv/www/_site")?;
//! let output = Arc::new(LocalBackend::new("public", "/srv/www/public")?);
//!
//! let mut site = Site::new(output.clone());
//! site.load(&source).await?;
//! Localizer::from_settings(&Settings::default(), output)?.register(&mut site);
//! site.build().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
mod localize;
mod page;
mod site;

pub use crate::localize::Localizer;
pub use crate::page::Page;
pub use crate::site::{Processor, Site};
