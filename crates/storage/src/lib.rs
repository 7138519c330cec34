pub mod keyed;
pub mod remote;
pub mod repository;
pub mod sqlite;
