pub mod file;
pub mod folder;
pub mod privacy;
pub mod storage;
pub mod user;

pub use file::*;
pub use folder::*;
pub use privacy::*;
pub use storage::*;
pub use user::*;
