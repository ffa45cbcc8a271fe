use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const RLE_EXT: &str = ".rle";
pub const FREQ_EXT: &str = ".freq";
pub const CODES_EXT: &str = ".cod";
pub const SHAFA_EXT: &str = ".sf";

/// Append a suffix to the whole file name, so `a.txt` + `.rle` gives `a.txt.rle`.
pub fn add_ext(path: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(ext);
    PathBuf::from(name)
}

/// Drop the last suffix, so `a.txt.rle` gives `a.txt`. A name without one is left alone.
pub fn rm_ext(path: &Path) -> PathBuf {
    match path.extension() {
        Some(_) => path.with_extension(""),
        None => path.to_path_buf(),
    }
}

/// True if the file name ends with `ext` (given with its leading dot).
pub fn has_ext(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| Some(e.to_string_lossy().as_ref()) == ext.strip_prefix('.'))
        .unwrap_or(false)
}
