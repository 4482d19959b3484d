pub mod auth;
pub mod files;
pub mod folders;
pub mod privacy;
pub mod quota;

pub use auth::*;
pub use files::*;
pub use folders::*;
pub use privacy::*;
pub use quota::*;
