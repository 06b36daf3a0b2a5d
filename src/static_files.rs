use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::context::Context;

/// Serves files out of a base directory, with path traversal prevented by
/// rejecting any path component that is not a plain name.
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
        }
    }

    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    fn content_type(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "html" => "text/html",
            "css" => "text/css",
            "js" => "application/javascript",
            "json" => "application/json",
            "txt" => "text/plain",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "ico" => "image/x-icon",
            "wasm" => "application/wasm",
            _ => "application/octet-stream",
        }
    }

    /// Resolve `url_path` inside the base directory and read it. Directories
    /// are reported as not found since listing is not supported.
    pub fn load(&self, url_path: &str) -> io::Result<(Vec<u8>, &'static str)> {
        let path = self
            .map_path(url_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        let bytes = fs::read(&path)?;
        Ok((bytes, Self::content_type(&path)))
    }
}

/// Respond with the contents of a single file, or fall through to the
/// no-route handler when it cannot be read.
pub fn serve_path(ctx: &mut Context, file: &Path) {
    if !file.is_file() {
        ctx.not_found();
        return;
    }
    match fs::read(file) {
        Ok(bytes) => {
            ctx.set_header("Content-Type", StaticFiles::content_type(file));
            ctx.bytes(200, bytes);
        }
        Err(_) => ctx.not_found(),
    }
}
