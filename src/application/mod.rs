// Application layer - the form controller and the receipt request it sends.

pub mod error;
pub mod receipt;
pub mod service;

pub use error::*;
pub use receipt::*;
pub use service::*;
