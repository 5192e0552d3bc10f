pub struct Env {
    pub ip: String,
    pub port: u16,
    pub workers: usize,
    pub upload_dir: String,
    pub output_dir: String,
    pub allowed_origins: Vec<String>,
    pub converter_path: Option<String>,
    pub policy: String,
    pub allowed_extensions: Vec<String>,
    pub target_format: String,
    pub max_files: usize,
    pub max_file_size: usize,
    pub conversion_timeout: u64,
    pub max_parallel_conversions: usize,
}

fn list(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

impl Env {
    fn new() -> Self {
        let ip = std::env::var("IP").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        let workers = std::env::var("WORKERS")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<usize>()
            .expect("WORKERS must be a valid usize integer");

        let upload_dir = std::env::var("UPLOAD_FOLDER").unwrap_or_else(|_| "temp".to_string());
        let output_dir =
            std::env::var("CONVERTED_FOLDER").unwrap_or_else(|_| "converted".to_string());

        let allowed_origins =
            list(&std::env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()));
        let converter_path = std::env::var("CONVERTER_PATH").ok().filter(|p| !p.trim().is_empty());

        let policy = std::env::var("CONVERT_POLICY").unwrap_or_else(|_| "strict".to_string());
        let allowed_extensions =
            list(&std::env::var("ALLOWED_EXTENSIONS").unwrap_or_else(|_| "pdf,docx".to_string()));
        let target_format = std::env::var("TARGET_FORMAT").unwrap_or_else(|_| "auto".to_string());

        let max_files = std::env::var("MAX_FILES")
            .unwrap_or_else(|_| "15".to_string())
            .parse::<usize>()
            .expect("MAX_FILES must be a valid usize integer");
        let max_file_size = std::env::var("MAX_FILE_SIZE")
            .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
            .parse::<usize>()
            .expect("MAX_FILE_SIZE must be a valid usize integer");
        let conversion_timeout = std::env::var("CONVERSION_TIMEOUT")
            .unwrap_or_else(|_| "120".to_string())
            .parse::<u64>()
            .expect("CONVERSION_TIMEOUT must be a valid u64 integer");
        let max_parallel_conversions = std::env::var("MAX_PARALLEL_CONVERSIONS")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<usize>()
            .expect("MAX_PARALLEL_CONVERSIONS must be a valid usize integer");

        Env {
            ip,
            port,
            workers,
            upload_dir,
            output_dir,
            allowed_origins,
            converter_path,
            policy,
            allowed_extensions,
            target_format,
            max_files,
            max_file_size,
            conversion_timeout,
            max_parallel_conversions,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
