//! Headless core of the academic records admin panel: typed records and
//! REST client, GPA aggregation, and the view models of the login, student
//! roster and result roster screens.

pub mod api;
pub mod config;
pub mod gpa;
pub mod view;
