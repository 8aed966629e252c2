pub mod check;
pub mod list;
pub mod matrix;
pub mod run;
pub mod show;
