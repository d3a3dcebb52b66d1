pub fn host() -> &'static dyn HostProbe {
    &ConcreteHost
}

use crate::error::UpdateError;
use std::fmt;

/// Raw strings the host reports about itself. Detection only ever looks at
/// these, so tests can feed arbitrary values.
pub trait HostProbe: Sync + Send {
    fn system(&self) -> String {
        std::env::consts::OS.to_string()
    }
    fn machine(&self) -> String;
    fn processor(&self) -> String;
}

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::UNIX_HOST as ConcreteHost;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WINDOWS_HOST as ConcreteHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Win,
    Mac,
    Linux,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arch {
    X64,
    X86,
    Arm64,
    Arm,
    Musl,
    /// No rule matched; the lowercased machine string is used as-is.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Os::Win => "win",
            Os::Mac => "mac",
            Os::Linux => "linux",
        })
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::X64 => f.write_str("x64"),
            Arch::X86 => f.write_str("x86"),
            Arch::Arm64 => f.write_str("arm64"),
            Arch::Arm => f.write_str("arm"),
            Arch::Musl => f.write_str("musl"),
            Arch::Other(raw) => f.write_str(raw),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

const OS_RULES: &[(&str, Os)] = &[("win", Os::Win), ("mac", Os::Mac), ("linux", Os::Linux)];

struct ArchRule {
    oses: &'static [Os],
    needle: &'static str,
    check_processor: bool,
    result: Arch,
}

const ALL_OSES: &[Os] = &[Os::Win, Os::Mac, Os::Linux];

// Every rule is evaluated and the last match wins, so "x86_64" ends up x86.
// Release asset names depend on this exact ordering.
#[rustfmt::skip]
static ARCH_RULES: [ArchRule; 5] = [
    ArchRule { oses: ALL_OSES, needle: "64", check_processor: false, result: Arch::X64 },
    ArchRule { oses: ALL_OSES, needle: "86", check_processor: false, result: Arch::X86 },
    ArchRule { oses: &[Os::Mac], needle: "arm", check_processor: true, result: Arch::Arm64 },
    ArchRule { oses: &[Os::Linux], needle: "arm", check_processor: false, result: Arch::Arm },
    ArchRule { oses: &[Os::Linux], needle: "musl", check_processor: false, result: Arch::Musl },
];

impl ArchRule {
    fn matches(&self, os: Os, machine: &str, processor: &str) -> bool {
        self.oses.contains(&os)
            && (machine.contains(self.needle)
                || (self.check_processor && processor.contains(self.needle)))
    }
}

pub fn detect(system: &str, machine: &str, processor: &str) -> Result<Platform, UpdateError> {
    let system_lc = system.to_lowercase();
    let machine_lc = machine.to_lowercase();
    let processor_lc = processor.to_lowercase();

    let os = OS_RULES
        .iter()
        .find(|(needle, _)| system_lc.contains(needle))
        .map(|(_, os)| *os)
        .ok_or_else(|| UpdateError::UnsupportedPlatform {
            system: system.to_string(),
            machine: machine.to_string(),
        })?;

    let arch = ARCH_RULES
        .iter()
        .rev()
        .find(|r| r.matches(os, &machine_lc, &processor_lc))
        .map(|r| r.result.clone())
        .unwrap_or(Arch::Other(machine_lc));

    Ok(Platform { os, arch })
}

pub fn detect_host(probe: &dyn HostProbe) -> Result<Platform, UpdateError> {
    let (system, machine, processor) = (probe.system(), probe.machine(), probe.processor());
    tracing::debug!(%system, %machine, %processor, "probed host");
    detect(&system, &machine, &processor)
}
