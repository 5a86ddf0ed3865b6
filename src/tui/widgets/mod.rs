pub mod help;
pub mod info;
pub mod lyrics;
pub mod modals;
pub mod root;
