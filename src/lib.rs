//! Scrape a wallpaper gallery page and reveal the images as they arrive.
//!
//! The pipeline runs in stages: lenient HTML parsing into an owned element
//! tree ([`dom`]), structural extraction of wallpaper links with URL
//! resolution ([`extract`]), concurrent per-URL fetch and decode on isolated
//! workers ([`assets`]), an observable result collection ([`gallery`]), and a
//! staggered fade/slide reveal driven by collection mutations ([`reveal`]).
//! [`viewer::Viewer`] coordinates a full fetch cycle behind a ready flag.

pub mod assets;
pub mod client;
pub mod config;
pub mod dom;
pub mod error;
pub mod extract;
pub mod gallery;
pub mod reveal;
pub mod viewer;
