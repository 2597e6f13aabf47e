mod identity;
mod probe;
mod resolver;

pub use identity::*;
pub use probe::*;
pub use resolver::*;
