pub mod participant_dto;
pub mod quiz_dto;
pub mod session_dto;
