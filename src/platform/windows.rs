use crate::platform::HostProbe;

pub static WINDOWS_HOST: Windows = Windows;

pub struct Windows;

impl HostProbe for Windows {
    fn machine(&self) -> String { std::env::var("PROCESSOR_ARCHITECTURE").unwrap_or_else(|_| std::env::consts::ARCH.to_string()) }
    fn processor(&self) -> String { std::env::var("PROCESSOR_IDENTIFIER").unwrap_or_else(|_| std::env::consts::ARCH.to_string()) }
}
