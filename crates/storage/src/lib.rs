#![forbid(unsafe_code)]

pub mod remote;
pub mod repository;
pub mod seed;
pub mod sqlite;
