pub mod application;
pub mod cli;
pub mod domain;
pub mod io;
pub mod logging;
pub mod transport;

pub use domain::*;
pub use transport::PdfClient;
