mod config;
mod portal;

pub use self::config::{ClientConfig, ClientState, DEFAULT_API_URL, normalize_api_url};
pub use self::portal::{
    About, AnswerSubmission, ConfiguredAnswer, PageResult, QuestionId, SecretQuestion,
};
