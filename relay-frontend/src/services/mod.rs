pub mod inference_client;
pub mod metrics;
pub mod relay;

pub use inference_client::InferenceClient;
pub use metrics::{get_metrics, record_upstream};
pub use relay::RelayService;
