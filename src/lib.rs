//! Brim - Template Engine
//!
//! Templates mix raw text with expressions and blocks:
//!
//! ```html
//! (* extends "base" *)
//!
//! (* block title *)(( page.title ))(* end *)
//!
//! (* block content *)
//!     (* for item in items *)
//!         <li>(( loop.index )): (( item | upper ))</li>
//!     (* end *)
//! (* end *)
//! ```
//!
//! Templates are loaded by name from a directory through an [`Engine`], which
//! compiles each file once and recompiles it when it changes on disk.
//!
//! ```
//! use brim::{Config, Engine, Store};
//!
//! let directory = tempfile::tempdir().unwrap();
//! std::fs::write(directory.path().join("base.html"), "<title>(* block title *)(* end *)</title>").unwrap();
//! std::fs::write(
//!     directory.path().join("page.html"),
//!     "(* extends \"base\" *)(* block title *)(( title ))(* end *)",
//! )
//! .unwrap();
//!
//! let engine = Engine::new(Config::new(directory.path()).with_suffix("html"));
//! let result = engine.render("page", &Store::new().with_must("title", "Tom & Jerry"));
//!
//! assert_eq!(result.unwrap(), "<title>Tom &amp; Jerry</title>");
//! ```
mod compile;
mod config;
mod engine;
mod load;
mod log;
mod pipe;
mod region;
mod render;
mod store;

pub mod function;

pub use compile::{compile, Builder, Marker, Parameter, Template};
pub use config::Config;
pub use engine::Engine;
pub use function::Function;
pub use log::{Error, ErrorKind};
pub use region::{Position, Region};
pub use render::render;
pub use store::Store;
