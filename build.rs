use std::env;
use std::path::{Path, PathBuf};

const WATCHED_VARIABLES: [&str; 5] = [
    "FFMPEG_DIR",
    "PKG_CONFIG_PATH",
    "VCPKG_ROOT",
    "VCPKGRS_DYNAMIC",
    "VCPKGRS_TRIPLET",
];

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    // ffmpeg-sys-next does the actual discovery; this only explains failures
    // before they surface as linker errors.
    if let Some(dir) = env::var_os("FFMPEG_DIR") {
        let dir = PathBuf::from(dir);
        if !dir.join("include").join("libavcodec").exists() {
            warn(&format!(
                "FFMPEG_DIR={} has no include/libavcodec; FFmpeg headers will not be found",
                dir.display()
            ));
        }
        return;
    }

    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("windows") {
        hint_vcpkg();
    }
}

fn hint_vcpkg() {
    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        warn("FFMPEG_DIR is not set. On Windows, install FFmpeg via vcpkg and set VCPKG_ROOT or FFMPEG_DIR.");
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let installed = Path::new(&vcpkg_root).join("installed").join(&triplet);

    if !installed.exists() {
        warn(&format!(
            "VCPKG_ROOT is set but no {triplet} FFmpeg install exists at {}",
            installed.display()
        ));
        return;
    }

    warn(&format!(
        "Using vcpkg FFmpeg at {0}; set FFMPEG_DIR={0} to make discovery explicit",
        installed.display()
    ));
    if env::var_os("VCPKGRS_DYNAMIC").is_none() {
        warn("Set VCPKGRS_DYNAMIC=1 when linking against a dynamic vcpkg FFmpeg build.");
    }
}

fn warn(message: &str) {
    println!("cargo:warning={message}");
}
