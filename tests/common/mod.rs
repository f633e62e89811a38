#![allow(dead_code)]

pub use bootwatch_test_utils::builders::{ConfigFileBuilder, launch_settings};
pub use bootwatch_test_utils::{DEFAULT_MARKER, init_tracing, with_timeout};

use std::path::{Path, PathBuf};

use bootwatch::resolve::ResolvedExecutable;

/// A target whose paths are never touched (fake backends ignore them).
pub fn fake_target() -> ResolvedExecutable {
    ResolvedExecutable {
        path: PathBuf::from("/opt/app/backend/deepread_ai_server"),
        working_dir: PathBuf::from("/opt/app/backend"),
        frontend_index: PathBuf::from("/opt/app/frontend/index.html"),
    }
}

/// Write an executable shell script named `backend` into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, body: &str) -> ResolvedExecutable {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("backend");
    {
        let mut file = std::fs::File::create(&path).expect("create script");
        writeln!(file, "#!/bin/sh").expect("write script");
        file.write_all(body.as_bytes()).expect("write script");
        file.sync_all().expect("sync script");
    }
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod script");

    ResolvedExecutable {
        path,
        working_dir: dir.to_path_buf(),
        frontend_index: dir.join("index.html"),
    }
}
