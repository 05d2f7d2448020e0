pub mod apply;
pub mod init;
pub mod tree;

pub use apply::{apply, ApplyArgs};
pub use init::{init, InitArgs};
pub use tree::{tree, TreeArgs};
