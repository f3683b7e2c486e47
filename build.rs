use std::env;
use std::fs;
use std::path::Path;

/// Variables que `src/config.rs` lee con `option_env!`
const FORWARDED_KEYS: &[&str] = &[
    "IMS_ENVIRONMENT",
    "IMS_BACKEND_URL_DEVELOPMENT",
    "IMS_BACKEND_URL_PRODUCTION",
    "IMS_ENABLE_LOGGING",
    "IMS_REQUEST_TIMEOUT_SECONDS",
    "IMS_CACHE_TTL_SECONDS",
    "IMS_DEFAULT_LOCALE",
];

fn main() {
    let env_file = Path::new(".env");

    if let Ok(contents) = fs::read_to_string(env_file) {
        println!("cargo:rerun-if-changed=.env");

        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                println!("cargo:warning=Línea de .env mal formada, se ignora: {}", line);
                continue;
            };
            let key = key.trim().trim_start_matches("export ").trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');

            if !FORWARDED_KEYS.contains(&key) {
                continue;
            }

            // El entorno real tiene prioridad sobre .env
            if env::var(key).is_err() {
                println!("cargo:rustc-env={}={}", key, value);
            }
        }
    }

    for key in FORWARDED_KEYS {
        println!("cargo:rerun-if-env-changed={}", key);
    }
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=dictionaries/en.json");
    println!("cargo:rerun-if-changed=dictionaries/ar.json");
}
