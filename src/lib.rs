#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod export;
pub mod geom;
pub mod parse;
pub mod pipeline;

use pipeline::{ReliefOptions, ReliefSummary};
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(all(feature = "debug_logs", target_arch = "wasm32"))]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(all(feature = "debug_logs", target_arch = "wasm32")))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

/// Install a `tracing-subscriber` registry that prints the crate's `log`
/// records to stderr.
///
/// `RUST_LOG` takes precedence over `default_directive` (e.g. `"debug"`).
/// Fails if a global subscriber is already installed.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_native_logger(
    default_directive: &str,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("could not start rayon thread pool: {err}")))
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Convert a GeoJSON contour collection into binary STL bytes.
///
/// `options` is a plain object with the fields of [`ReliefOptions`];
/// `undefined` or `null` selects the defaults.
#[wasm_bindgen]
pub fn contours_to_stl(geojson: &str, options: JsValue) -> Result<Vec<u8>, JsValue> {
    let options = options_from_js(options)?;
    let relief = pipeline::contours_to_relief(geojson, &options).map_err(to_js_error)?;
    debug_log!("relief mesh: {}", relief.diagnostics.summary());
    export::stl::binary_stl_bytes(&relief.mesh, "contour-relief").map_err(to_js_error)
}

/// Grid size, elevation range and mesh counts for a contour collection.
#[wasm_bindgen]
pub fn relief_summary(geojson: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let options = options_from_js(options)?;
    let relief = pipeline::contours_to_relief(geojson, &options).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&ReliefSummary::from(&relief))
        .map_err(|err| JsError::new(&err.to_string()).into())
}

fn options_from_js(value: JsValue) -> Result<ReliefOptions, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(ReliefOptions::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| JsError::new(&err.to_string()).into())
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsError::new(&err.to_string()).into()
}
