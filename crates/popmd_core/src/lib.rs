pub mod backup;
pub mod category;
pub mod codec;
pub mod coords;
pub mod core_api;
pub mod editor;
pub mod facing;
pub mod layout;
pub mod loader;
pub mod quota;
pub mod randomize;
pub mod record_codec;
pub mod records;
pub mod region;
pub mod saver;
pub mod settings;
pub mod store;
pub mod sword;
pub mod table;
pub mod tile;
