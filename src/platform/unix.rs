use crate::platform::HostProbe;
use std::process::Command;

pub static UNIX_HOST: Unix = Unix;

pub struct Unix;

// musl builds report a plain machine string; tag it so the musl rule fires
#[cfg(target_env = "musl")]
const MACHINE_SUFFIX: &str = "-musl";
#[cfg(not(target_env = "musl"))]
const MACHINE_SUFFIX: &str = "";

fn uname(flag: &str) -> Option<String> {
    let output = Command::new("uname").arg(flag).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let s = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!s.is_empty()).then_some(s)
}

impl HostProbe for Unix {
    fn machine(&self) -> String {
        let raw = uname("-m").unwrap_or_else(|| std::env::consts::ARCH.to_string());
        format!("{raw}{MACHINE_SUFFIX}")
    }
    fn processor(&self) -> String {
        // Apple silicon reports "arm" here even under Rosetta
        if cfg!(target_os = "macos") {
            uname("-p").unwrap_or_default()
        } else {
            String::new()
        }
    }
}
