pub mod enums;
pub mod metric;
pub mod document;
pub mod session;
pub mod plan;

pub use enums::*;
pub use metric::*;
pub use document::*;
pub use session::*;
pub use plan::*;
