#![allow(dead_code)]

use std::sync::{Mutex, MutexGuard};

// Serialises script creation and every process spawn in one test binary, so
// no test forks while another still holds a freshly written script open.
static ENGINE_LOCK: Mutex<()> = Mutex::new(());

pub fn lock_engines() -> MutexGuard<'static, ()> {
    ENGINE_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// Copies stdin into the file named after `-o`, like `dot -Tfmt -o file`.
pub const COPYING_ENGINE: &str = r#"out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; shift; fi
  shift
done
cat > "$out""#;

#[cfg(unix)]
pub fn install(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-dot");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
