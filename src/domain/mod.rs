mod header;
mod ledger;
mod mask;
mod money;
mod row;

pub use header::*;
pub use ledger::*;
pub use mask::*;
pub use money::*;
pub use row::*;
