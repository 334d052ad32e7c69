//! Device selection and the GPU session.
//!
//! A session is the single device/queue pair used for the lifetime of a
//! renderer. It is created explicitly, handed by reference to every GPU
//! component, and shut down explicitly.

use crate::error::PipelineError;
use fractalview_core::Precision;

/// Backends probed in order. Each one plays the role of a compute platform:
/// the first that exposes a GPU adapter wins.
pub const BACKEND_ORDER: [wgpu::Backends; 4] = [
    wgpu::Backends::VULKAN,
    wgpu::Backends::METAL,
    wgpu::Backends::DX12,
    wgpu::Backends::GL,
];

/// Texel format shared by the compute kernel (storage) and the presenter (sampled).
pub const SURFACE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// What the selected device can do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// The device can write a texture from compute and sample it when rendering,
    /// and can present to the caller's surface if one was given.
    pub supports_interop: bool,
    /// `SHADER_F64` is available.
    pub supports_double: bool,
}

impl DeviceCapabilities {
    pub fn new(supports_interop: bool, features: wgpu::Features) -> Self {
        Self {
            supports_interop,
            supports_double: features.contains(wgpu::Features::SHADER_F64),
        }
    }

    pub fn from_adapter(adapter: &wgpu::Adapter, surface: Option<&wgpu::Surface<'_>>) -> Self {
        let format = adapter.get_texture_format_features(SURFACE_FORMAT);
        let shares_texture = format
            .allowed_usages
            .contains(wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING);
        let presents = surface.map_or(true, |s| adapter.is_surface_supported(s));

        Self::new(shares_texture && presents, adapter.features())
    }

    pub fn precision(&self) -> Precision {
        Precision::from_double_support(self.supports_double)
    }

    /// Features to request when opening the device.
    pub fn required_features(&self) -> wgpu::Features {
        if self.supports_double {
            wgpu::Features::SHADER_F64
        } else {
            wgpu::Features::empty()
        }
    }
}

fn is_gpu(device_type: wgpu::DeviceType) -> bool {
    matches!(
        device_type,
        wgpu::DeviceType::DiscreteGpu | wgpu::DeviceType::IntegratedGpu
    )
}

/// First GPU of the first platform that has one.
fn first_gpu<T>(platforms: impl IntoIterator<Item = Vec<(T, wgpu::DeviceType)>>) -> Option<T> {
    platforms.into_iter().find_map(|devices| {
        devices
            .into_iter()
            .find(|(_, device_type)| is_gpu(*device_type))
            .map(|(device, _)| device)
    })
}

/// Enumerate adapters backend by backend and pick the first GPU.
///
/// Software rasterizers and CPU adapters are never selected.
pub fn select_device(
    instance: &wgpu::Instance,
    backends: wgpu::Backends,
) -> Result<wgpu::Adapter, PipelineError> {
    let platforms = BACKEND_ORDER
        .into_iter()
        .filter(|backend| backends.contains(*backend))
        .map(|backend| {
            instance
                .enumerate_adapters(backend)
                .into_iter()
                .map(|adapter| {
                    let device_type = adapter.get_info().device_type;
                    (adapter, device_type)
                })
                .collect::<Vec<_>>()
        });

    first_gpu(platforms).ok_or(PipelineError::NoDevice)
}

/// Options for opening a session.
#[derive(Clone, Copy)]
pub struct SessionOptions<'a> {
    pub backends: wgpu::Backends,
    /// Presentation surface the rendered texture will be drawn to, if any.
    pub compatible_surface: Option<&'a wgpu::Surface<'a>>,
    pub label: &'a str,
}

impl Default for SessionOptions<'_> {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            compatible_surface: None,
            label: "fractalview",
        }
    }
}

/// Result of a session initialization attempt.
pub enum SessionAvailability {
    Available(GpuSession),
    Unavailable(String),
}

/// The device and its single in-order queue.
pub struct GpuSession {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    adapter_info: wgpu::AdapterInfo,
    capabilities: DeviceCapabilities,
    _adapter: wgpu::Adapter,
}

impl GpuSession {
    /// Select a device and open a session on it.
    pub fn new(options: &SessionOptions<'_>) -> Result<Self, PipelineError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: options.backends,
            ..Default::default()
        });
        let adapter = select_device(&instance, options.backends)?;
        Self::from_adapter(adapter, options)
    }

    /// Attempt to open a session with default options. Returns Unavailable on
    /// any failure.
    pub fn try_init() -> SessionAvailability {
        match Self::new(&SessionOptions::default()) {
            Ok(session) => SessionAvailability::Available(session),
            Err(e) => {
                log::warn!("GPU initialization failed: {e}");
                SessionAvailability::Unavailable(e.to_string())
            }
        }
    }

    /// Open a session on an already selected adapter.
    pub fn from_adapter(
        adapter: wgpu::Adapter,
        options: &SessionOptions<'_>,
    ) -> Result<Self, PipelineError> {
        let adapter_info = adapter.get_info();
        let capabilities = DeviceCapabilities::from_adapter(&adapter, options.compatible_surface);

        if !capabilities.supports_interop {
            return Err(PipelineError::ContextCreation(format!(
                "{} cannot share a {SURFACE_FORMAT:?} texture between compute and rendering",
                adapter_info.name
            )));
        }

        log::info!(
            "GPU adapter: {} ({:?}, {:?}), {} precision",
            adapter_info.name,
            adapter_info.backend,
            adapter_info.device_type,
            capabilities.precision()
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some(options.label),
                required_features: capabilities.required_features(),
                required_limits: adapter.limits(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        device.on_uncaptured_error(Box::new(|e| log::error!("Uncaptured GPU error: {e}")));

        Ok(Self {
            device,
            queue,
            adapter_info,
            capabilities,
            _adapter: adapter,
        })
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    pub fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    pub fn precision(&self) -> Precision {
        self.capabilities.precision()
    }

    /// Block until every submitted command has finished.
    pub fn wait_idle(&self) {
        self.device.poll(wgpu::Maintain::Wait);
    }

    /// Run `f` inside validation and out-of-memory error scopes.
    ///
    /// Returns the first error raised by the device while `f` ran.
    pub(crate) fn capture_errors<T>(
        &self,
        f: impl FnOnce(&wgpu::Device) -> T,
    ) -> (T, Option<wgpu::Error>) {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let value = f(&self.device);

        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());
        (value, validation.or(out_of_memory))
    }

    /// Drain the queue and release the device.
    pub fn shutdown(self) {
        self.wait_idle();
        log::info!("GPU session on {} shut down", self.adapter_info.name);
    }
}
