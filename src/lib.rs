#![forbid(unsafe_code)]

pub mod cli;
pub mod convert;
pub mod descriptor;
pub mod emoji;
pub mod formats;
pub mod logging;
pub mod pages;
pub mod sort;
pub mod walk;
