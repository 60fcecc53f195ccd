pub mod batch;
pub mod converter;
pub mod cursor_io;
pub mod cursor_types;
pub mod rescale;
pub mod size_selection;
pub mod wincur;

#[cfg(test)]
pub(crate) mod fixtures;
