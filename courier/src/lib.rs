pub mod controller;
pub mod providers;
