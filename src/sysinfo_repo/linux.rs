// Linux-specific helpers: /proc, /etc/os-release, machine id.

/// Read first "model name" from /proc/cpuinfo (Linux). Prefer over sysinfo when it returns "cpu0" etc.
pub(super) fn read_cpu_model_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        for line in content.lines() {
            if line.starts_with("model name") {
                let name = line
                    .find(": ")
                    .map(|i| line[i + 2..].trim())
                    .filter(|s| !s.is_empty() && *s != "cpu0")?;
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Distro id from /etc/os-release (`ID=`), e.g. "debian". Used as host platform.
pub(super) fn read_platform_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/etc/os-release").ok()?;
        parse_os_release_field(&content, "ID")
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Stable host id from /etc/machine-id (systemd) or the dbus fallback.
pub(super) fn read_machine_id_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        for path in ["/etc/machine-id", "/var/lib/dbus/machine-id"] {
            if let Ok(v) = std::fs::read_to_string(path) {
                let v = v.trim();
                if !v.is_empty() {
                    return Some(v.to_string());
                }
            }
        }
    }
    None
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_os_release_field(content: &str, key: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let v = line.strip_prefix(key)?.strip_prefix('=')?.trim_matches('"');
        if v.is_empty() { None } else { Some(v.to_string()) }
    })
}
