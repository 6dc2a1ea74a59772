/**
 * Template Parser Module
 *
 * Page-fragment scanner and fragment types
 */
pub mod fragments;
pub mod page_parser;

pub use fragments::*;
pub use page_parser::{parse_page, PageParser};
