//! Entry point for Hotspot3D: logging + CLI flags, then the editor loop.

use std::path::PathBuf;

use anyhow::Result;

use platform::RunOptions;

fn parse_backend_arg(args: &[String]) -> wgpu::Backends {
    // Accept: --gpu-backend=auto|vulkan|dx12|metal|gl
    let mut backends = wgpu::Backends::all(); // default = auto
    for arg in args {
        if let Some(val) = arg.strip_prefix("--gpu-backend=") {
            backends = match val.to_ascii_lowercase().as_str() {
                "auto" => wgpu::Backends::all(),
                "vulkan" | "vk" => wgpu::Backends::VULKAN,
                "dx12" | "d3d12" => wgpu::Backends::DX12,
                "metal" | "mtl" => wgpu::Backends::METAL,
                "gl" | "opengl" | "gles" => wgpu::Backends::GL,
                other => {
                    eprintln!("[warn] Unknown backend '{}', falling back to auto.", other);
                    wgpu::Backends::all()
                }
            };
        }
    }
    backends
}

fn parse_size_args(args: &[String]) -> (u32, u32) {
    let mut w: Option<u32> = None;
    let mut h: Option<u32> = None;

    for arg in args {
        if let Some(v) = arg.strip_prefix("--size=") {
            if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                    w = Some(pw);
                    h = Some(ph);
                }
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            if let Ok(pw) = v.parse::<u32>() {
                w = Some(pw);
            }
        } else if let Some(v) = arg.strip_prefix("--height=") {
            if let Ok(ph) = v.parse::<u32>() {
                h = Some(ph);
            }
        }
    }

    let ww = w.unwrap_or(1280).max(1);
    let hh = h.unwrap_or(720).max(1);
    (ww, hh)
}

/// First non-flag argument = model to open at startup.
fn parse_model_arg(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .find(|arg| !arg.starts_with("--"))
        .map(PathBuf::from)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let backends = parse_backend_arg(&args);
    let (width, height) = parse_size_args(&args);
    let initial_model = parse_model_arg(&args);
    log::info!(
        "Starting Hotspot3D. Backend: {:?}, window_size={}x{}, model={:?}",
        backends,
        width,
        height,
        initial_model
    );

    platform::run(RunOptions {
        backends,
        width,
        height,
        initial_model,
    })?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn backend_flag_selects_backend() {
        assert_eq!(
            parse_backend_arg(&args(&["--gpu-backend=vulkan"])),
            wgpu::Backends::VULKAN
        );
        assert_eq!(parse_backend_arg(&args(&[])), wgpu::Backends::all());
        assert_eq!(
            parse_backend_arg(&args(&["--gpu-backend=bogus"])),
            wgpu::Backends::all()
        );
    }

    #[test]
    fn size_flags_parse_and_default() {
        assert_eq!(parse_size_args(&args(&["--size=800x600"])), (800, 600));
        assert_eq!(
            parse_size_args(&args(&["--width=1024", "--height=768"])),
            (1024, 768)
        );
        assert_eq!(parse_size_args(&args(&[])), (1280, 720));
        assert_eq!(parse_size_args(&args(&["--size=bogus"])), (1280, 720));
    }

    #[test]
    fn model_path_is_first_non_flag_argument() {
        assert_eq!(
            parse_model_arg(&args(&["--size=800x600", "scene.obj"])),
            Some(PathBuf::from("scene.obj"))
        );
        assert_eq!(parse_model_arg(&args(&["--size=800x600"])), None);
    }
}
