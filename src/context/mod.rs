pub mod language;

pub use language::{format_template, get_dictionary, get_dictionary_for, Dictionary, Locale, TextDirection};
