pub mod script;
pub mod words;

pub use script::is_target_script_value;
pub use words::count_value_words;
