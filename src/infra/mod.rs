pub mod fallback;
pub mod import;
pub mod memory;
pub mod sqlite;
