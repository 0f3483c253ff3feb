pub mod compositor;
pub mod lm;
pub mod phonetic;
pub mod settings;
pub mod symbols;
pub mod user_override;
