pub mod disposition_service;
pub mod draw_service;
pub mod offering_service;
pub mod player_service;
pub mod pool_service;

pub use disposition_service::*;
pub use draw_service::*;
pub use offering_service::*;
pub use player_service::*;
pub use pool_service::*;
