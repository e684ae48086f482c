use rand::{distributions::Alphanumeric, thread_rng, Rng};

pub const SESSION_TOKEN_LENGTH: usize = 32;

pub fn generate_token(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

pub fn generate_session_token() -> String {
    generate_token(SESSION_TOKEN_LENGTH)
}
