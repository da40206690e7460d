//! NVIDIA GPU temperatures via NVML
//!
//! nvml-wrapper loads `libnvidia-ml.so` at runtime; the sensor itself only
//! sees the [`GpuThermal`] trait.

use crate::domain::TemperatureAggregate;
use crate::drivers::sensor::SensorBase;
use crate::drivers::traits::SensorDriver;
use crate::error::DriverError;

use nvml_wrapper::enum_wrappers::device::TemperatureSensor;
use nvml_wrapper::Nvml;

/// Temperature source of one GPU
pub trait GpuThermal: Send {
    /// Core temperature in degrees Celsius
    fn temperature(&self) -> Result<u32, DriverError>;
}

/// GPU addressed by PCI bus id through NVML
pub struct NvmlGpu {
    nvml: Option<Nvml>,
    bus_id: String,
}

impl NvmlGpu {
    /// Initialize NVML and open the GPU at `bus_id` (e.g. `0000:01:00.0`)
    pub fn open(bus_id: &str) -> Result<Self, DriverError> {
        let nvml = Nvml::init().map_err(|e| {
            DriverError::System(format!("Failed to initialize NVML driver: {}", e))
        })?;

        let name = nvml
            .device_by_pci_bus_id(bus_id)
            .and_then(|device| device.name())
            .map_err(|e| {
                DriverError::System(format!("Failed to open PCI device {}: {}", bus_id, e))
            })?;
        log::debug!("Initialized NVML sensor on {} at PCI {}.", name, bus_id);

        Ok(Self {
            nvml: Some(nvml),
            bus_id: bus_id.to_string(),
        })
    }
}

impl GpuThermal for NvmlGpu {
    fn temperature(&self) -> Result<u32, DriverError> {
        let nvml = self
            .nvml
            .as_ref()
            .ok_or_else(|| DriverError::System("NVML has been shut down".to_string()))?;

        nvml.device_by_pci_bus_id(self.bus_id.as_str())
            .and_then(|device| device.temperature(TemperatureSensor::Gpu))
            .map_err(|e| {
                DriverError::System(format!(
                    "Failed to read temperature from GPU {}: {}",
                    self.bus_id, e
                ))
            })
    }
}

impl Drop for NvmlGpu {
    fn drop(&mut self) {
        if let Some(nvml) = self.nvml.take() {
            if let Err(e) = nvml.shutdown() {
                log::error!("Failed to shutdown NVML driver: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for NvmlGpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NvmlGpu")
            .field("bus_id", &self.bus_id)
            .finish_non_exhaustive()
    }
}

/// GPU temperature sensor
#[derive(Debug)]
pub struct GpuSensor<G: GpuThermal = NvmlGpu> {
    base: SensorBase,
    gpu: G,
}

impl GpuSensor<NvmlGpu> {
    /// Open the GPU at PCI `bus_id`
    pub fn open(bus_id: &str) -> Result<Self, DriverError> {
        Ok(Self::with_gpu(bus_id, NvmlGpu::open(bus_id)?))
    }
}

impl<G: GpuThermal> GpuSensor<G> {
    /// Create a sensor over an already opened GPU
    pub fn with_gpu(bus_id: &str, gpu: G) -> Self {
        let mut base = SensorBase::new(bus_id);
        base.set_num_temps(1);
        Self { base, gpu }
    }
}

impl<G: GpuThermal> SensorDriver for GpuSensor<G> {
    fn base(&self) -> &SensorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SensorBase {
        &mut self.base
    }

    fn read_temps(&self, temps: &mut TemperatureAggregate) -> Result<(), DriverError> {
        let celsius = self.gpu.temperature()?;
        let celsius = i32::try_from(celsius).map_err(|_| {
            DriverError::System(format!(
                "GPU {} reported an invalid temperature: {}",
                self.base.path().display(),
                celsius
            ))
        })?;
        temps.push(self.base.corrected(0, celsius));
        Ok(())
    }
}
