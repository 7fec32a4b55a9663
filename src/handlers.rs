pub mod admin;
pub mod auth;
pub mod customers;
pub mod materials;
pub mod projects;
pub mod reports;
pub mod subscription;
pub mod tasks;
pub mod team;
