//! Administrative code table and name-based code resolution.

mod resolver;
mod table;

pub use resolver::CodeResolver;
pub use table::{CodeEntry, CodeTable};
