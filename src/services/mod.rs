pub mod attempt_service;
pub mod countdown;
pub mod participant_service;
pub mod quiz_service;
pub mod quiz_session;
pub mod session_service;
