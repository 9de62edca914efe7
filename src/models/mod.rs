pub mod features;
pub mod recommendation;
pub mod request;
pub mod vegetation;
pub mod weather;

pub use features::*;
pub use recommendation::*;
pub use request::*;
pub use vegetation::*;
pub use weather::*;
