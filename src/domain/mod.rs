pub mod entities;
pub mod view;
