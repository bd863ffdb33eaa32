//! HTTP Handlers

pub mod auth;
pub mod chapter;
pub mod list;
pub mod novel;
pub mod ping;
pub mod user;

pub use auth::*;
pub use chapter::*;
pub use list::*;
pub use novel::*;
pub use ping::*;
pub use user::*;
