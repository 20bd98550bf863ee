use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Parascreen";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ollama endpoint used when PARASCREEN_OLLAMA_URL is not set.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Advisory model tag used when PARASCREEN_ADVISORY_MODEL is not set.
pub const DEFAULT_ADVISORY_MODEL: &str = "gemma3:4b";
/// Seconds before an advisory request is abandoned.
pub const DEFAULT_ADVISORY_TIMEOUT_SECS: u64 = 120;

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "parascreen=info"
}

/// Get the application data directory
/// ~/Parascreen/ on all platforms (user-visible), PARASCREEN_DATA_DIR overrides
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PARASCREEN_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Parascreen")
}

/// Get the uploads directory (persisted slide images)
pub fn uploads_dir() -> PathBuf {
    app_data_dir().join("uploads")
}

/// Get the reports directory (exported PDFs)
pub fn reports_dir() -> PathBuf {
    app_data_dir().join("reports")
}

/// Get the models directory (for the ONNX classifier)
pub fn models_dir() -> PathBuf {
    app_data_dir().join("models")
}

/// Default location of the patient record store
pub fn database_path() -> PathBuf {
    app_data_dir().join("parascreen.db")
}

/// Settings the screening workflow needs at construction time. Read once at
/// process start; the workflow never re-reads the environment afterwards.
#[derive(Debug, Clone)]
pub struct ScreeningConfig {
    pub ollama_base_url: String,
    pub advisory_model: String,
    pub advisory_timeout_secs: u64,
    pub classifier_model_path: PathBuf,
    pub uploads_dir: PathBuf,
    pub reports_dir: PathBuf,
}

impl ScreeningConfig {
    pub fn from_env() -> Self {
        Self {
            ollama_base_url: std::env::var("PARASCREEN_OLLAMA_URL")
                .unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string()),
            advisory_model: std::env::var("PARASCREEN_ADVISORY_MODEL")
                .unwrap_or_else(|_| DEFAULT_ADVISORY_MODEL.to_string()),
            advisory_timeout_secs: DEFAULT_ADVISORY_TIMEOUT_SECS,
            classifier_model_path: std::env::var("PARASCREEN_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| models_dir().join("malaria_cnn.onnx")),
            uploads_dir: uploads_dir(),
            reports_dir: reports_dir(),
        }
    }
}
