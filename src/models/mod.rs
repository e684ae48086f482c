pub mod participant;
pub mod profile;
pub mod question;
pub mod quiz;
pub mod quiz_attempt;
pub mod session_event;
