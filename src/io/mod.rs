// Batch files in and out of the form, and receipts on disk.

pub mod export;
pub mod import;

pub use export::*;
pub use import::*;
