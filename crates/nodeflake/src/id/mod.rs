mod decode;
mod layout;
mod user_id;

pub use decode::*;
pub use user_id::*;
