use std::path::PathBuf;

pub fn default_base() -> String {
    "/".to_string()
}

pub fn default_out_dir() -> PathBuf {
    PathBuf::from("build/")
}

pub fn default_content_dir() -> PathBuf {
    PathBuf::from("_site/")
}

pub fn default_port() -> u16 {
    4507
}

pub fn default_debounce_ms() -> u64 {
    6
}

pub fn default_toolchain() -> Vec<String> {
    vec!["archipel-toolchain".to_string()]
}

pub fn default_toolchain_timeout_ms() -> u64 {
    30_000
}

pub fn default_render_concurrency() -> usize {
    8
}

pub fn default_format_html() -> bool {
    true
}
