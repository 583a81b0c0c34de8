use std::any::Any;
use std::panic;

use tracing::{info, warn};

use crate::{Device, ProbeError};

/// Answers "how many accelerators can this process use?".
pub trait AcceleratorProbe {
    fn accelerator_count(&self) -> Result<usize, ProbeError>;
}

/// Queries the installed accelerator driver.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProbe;

impl AcceleratorProbe for SystemProbe {
    fn accelerator_count(&self) -> Result<usize, ProbeError> {
        #[cfg(feature = "cuda")]
        {
            // cudarc panics rather than erroring when libcuda cannot be loaded.
            guarded(|| {
                let count = cudarc::driver::CudaContext::device_count()
                    .map_err(|e| ProbeError::Driver(e.to_string()))?;
                Ok(usize::try_from(count).unwrap_or(0))
            })
        }
        #[cfg(not(feature = "cuda"))]
        {
            Err(ProbeError::Unsupported(
                "kernelcheck-core was built without the `cuda` feature",
            ))
        }
    }
}

/// Runs a driver query, turning a panic inside it into `ProbeError::Driver`.
#[cfg_attr(not(feature = "cuda"), allow(dead_code))]
pub(crate) fn guarded<F>(query: F) -> Result<usize, ProbeError>
where
    F: FnOnce() -> Result<usize, ProbeError> + panic::UnwindSafe,
{
    panic::catch_unwind(query)
        .unwrap_or_else(|payload| Err(ProbeError::Driver(panic_message(&*payload))))
}

#[cfg_attr(not(feature = "cuda"), allow(dead_code))]
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "driver query panicked".to_string()
    }
}

/// Probe with a fixed answer.
#[derive(Clone, Debug)]
pub struct StaticProbe(pub Result<usize, ProbeError>);

impl StaticProbe {
    pub fn count(n: usize) -> Self {
        Self(Ok(n))
    }

    pub fn failing(err: ProbeError) -> Self {
        Self(Err(err))
    }
}

impl AcceleratorProbe for StaticProbe {
    fn accelerator_count(&self) -> Result<usize, ProbeError> {
        self.0.clone()
    }
}

/// First accelerator if the probe reports any.
pub fn probe_accelerator(probe: &dyn AcceleratorProbe) -> Result<Device, ProbeError> {
    match probe.accelerator_count()? {
        0 => Err(ProbeError::NoAccelerator),
        _ => Ok(Device::Accelerator { device_id: 0 }),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceSelection {
    pub device: Device,
    /// Set when the probe failed and the CPU was chosen in its place.
    pub fallback_reason: Option<ProbeError>,
}

impl DeviceSelection {
    pub fn fell_back(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Accelerator when one is available, the CPU otherwise. Never fails.
pub fn select_device(probe: &dyn AcceleratorProbe) -> DeviceSelection {
    match probe_accelerator(probe) {
        Ok(device) => {
            info!(%device, "accelerator selected");
            DeviceSelection {
                device,
                fallback_reason: None,
            }
        }
        Err(ProbeError::NoAccelerator) => {
            info!("no accelerator present, using cpu");
            DeviceSelection {
                device: Device::Cpu,
                fallback_reason: None,
            }
        }
        Err(err) => {
            warn!(error = %err, "accelerator probe failed, falling back to cpu");
            DeviceSelection {
                device: Device::Cpu,
                fallback_reason: Some(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panicking_driver_query_becomes_driver_error() {
        let result = guarded(|| panic!("Unable to dynamically load the \"cuda\" shared library"));
        assert_eq!(
            result,
            Err(ProbeError::Driver(
                "Unable to dynamically load the \"cuda\" shared library".to_string()
            ))
        );
    }

    #[test]
    fn formatted_panic_message_is_kept() {
        let code = 100;
        let result = guarded(move || panic!("cuInit failed with {code}"));
        assert_eq!(result, Err(ProbeError::Driver("cuInit failed with 100".to_string())));
    }

    #[test]
    fn non_panicking_query_passes_through() {
        assert_eq!(guarded(|| Ok(3)), Ok(3));
        assert_eq!(
            guarded(|| Err(ProbeError::NoAccelerator)),
            Err(ProbeError::NoAccelerator)
        );
    }

    struct PanickingProbe;

    impl AcceleratorProbe for PanickingProbe {
        fn accelerator_count(&self) -> Result<usize, ProbeError> {
            guarded(|| panic!("driver exploded"))
        }
    }

    #[test]
    fn select_device_survives_a_panicking_driver() {
        let selection = select_device(&PanickingProbe);
        assert_eq!(selection.device, Device::Cpu);
        assert!(selection.fell_back());
    }
}
