pub mod relay;
pub mod user;

pub use relay::{
    AnswerResponse, ChunkSize, TranscribeRequest, TranscribeResponse, UploadImageRequest,
};
pub use user::AuthUser;
