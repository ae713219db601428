mod session;

pub use session::{FileOp, FileSession};
