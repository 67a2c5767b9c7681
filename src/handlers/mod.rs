pub mod admin;
pub mod disposition;
pub mod draw;
pub mod offering;
pub mod player;

pub use admin::admin_config;
pub use disposition::disposition_config;
pub use draw::draw_config;
pub use offering::offering_config;
pub use player::player_config;
