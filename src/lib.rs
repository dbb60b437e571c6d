//! Admin client for a blog CMS.
//!
//! The [`category`] module turns the server's flat category list into a
//! forest. Around it sit the REST client ([`api`]), the per-session category
//! cache ([`session`]), article composition ([`compose`]) and media library
//! helpers ([`media`]).

pub mod api;
pub mod category;
pub mod compose;
pub mod config;
pub mod media;
pub mod session;
pub mod util;
