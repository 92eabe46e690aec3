#![allow(clippy::too_many_arguments)]
#![allow(clippy::large_enum_variant)]

pub mod config;
pub mod data;
pub mod game;
pub mod protocol;
