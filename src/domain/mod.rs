pub mod content;
pub mod principal;

pub use content::{ContentKind, ContentRef, KindSpec, Statistic};
pub use principal::{AuthPrincipal, Role};
