pub mod collection;
pub mod rand;
pub mod record;
pub mod settings;
pub mod source;
