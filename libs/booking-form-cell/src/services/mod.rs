pub(crate) mod binder;
pub mod directory;
pub mod form;

pub use directory::*;
pub use form::*;
