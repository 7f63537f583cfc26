mod rpc;
pub use rpc::*;

mod transaction;
pub use transaction::*;
