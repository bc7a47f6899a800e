pub mod events;
pub mod gameplay;
pub mod judgment;
pub mod lane;
pub mod note;
pub mod spawner;
pub mod store;
