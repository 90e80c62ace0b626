use candle_core::Device;
#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::info;
use tracing::{debug, warn};

use super::error::EmbeddingError;

/// Picks the compute device for the sentence encoder.
///
/// GPU backends are tried in feature order (Metal, then CUDA). Any failure falls
/// back to the CPU.
pub fn select_device() -> Result<Device, EmbeddingError> {
    #[allow(unused_mut)]
    let mut skipped: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Sentence encoder using Metal");
                return Ok(device);
            }
            Err(e) => skipped.push(format!("metal: {e}")),
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("Sentence encoder using CUDA");
                return Ok(device);
            }
            Err(e) => skipped.push(format!("cuda: {e}")),
        }
    }

    if skipped.is_empty() {
        debug!("No GPU backend compiled, using CPU");
    } else {
        warn!(reasons = %skipped.join("; "), "GPU unavailable, using CPU");
    }

    Ok(Device::Cpu)
}
