pub mod items;
pub mod stores;
pub mod tags;
pub mod users;
