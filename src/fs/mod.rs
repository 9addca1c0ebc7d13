pub mod entry;
pub mod listing;
