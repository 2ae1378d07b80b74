//! PowerShell-backed Hyper-V driver.
//!
//! Each query runs one short script through `powershell -Command` in a child
//! process. Arguments are passed as single-quoted literals to a script block
//! with a `param()` header, so VM names never get interpolated into code.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use hvbuild_shared::errors::{HvbuildError, HvbuildResult};
use sysinfo::System;
use tokio::process::Command;

use super::{Driver, HostProbe};

const MAC_SCRIPT: &str = r#"
param([string]$vmName)
$adapter = Get-VMNetworkAdapter -VMName $vmName | Select-Object -First 1
if ($adapter -eq $null) { throw "VM '$vmName' has no network adapter" }
$adapter.MacAddress
"#;

const IP_ADDRESS_SCRIPT: &str = r#"
param([string]$mac)
$ip = ''
$vm = Get-VM | Where-Object { $_.NetworkAdapters.MacAddress -eq $mac }
if ($vm -ne $null) {
    $ip = $vm.NetworkAdapters |
        Where-Object { $_.MacAddress -eq $mac } |
        ForEach-Object { $_.IPAddresses } |
        Where-Object { $_ -match '^\d{1,3}(\.\d{1,3}){3}$' } |
        Select-Object -First 1
}
$ip
"#;

const VM_ID_SCRIPT: &str = r#"
param([string]$vmName)
(Get-VM -Name $vmName).Id.Guid
"#;

const VM_EXISTS_SCRIPT: &str = r#"
param([string]$vmName)
$vm = Get-VM -Name $vmName -ErrorAction SilentlyContinue
[bool]($vm -ne $null)
"#;

const VM_GENERATION_SCRIPT: &str = r#"
param([string]$vmName)
(Get-VM -Name $vmName).Generation
"#;

const SNAPSHOT_EXISTS_SCRIPT: &str = r#"
param([string]$vmName, [string]$snapshotName)
$snapshot = Get-VMSnapshot -VMName $vmName -Name $snapshotName -ErrorAction SilentlyContinue
[bool]($snapshot -ne $null)
"#;

const VM_RUNNING_SCRIPT: &str = r#"
param([string]$vmName)
(Get-VM -Name $vmName).State -eq [Microsoft.HyperV.PowerShell.VMState]::Running
"#;

const VERSION_SCRIPT: &str = "$PSVersionTable.PSVersion.Major";

const VIRTUALIZATION_EXTENSIONS_SCRIPT: &str =
    "(Get-Command Set-VMProcessor).Parameters.ContainsKey('ExposeVirtualizationExtensions')";

const EXTERNAL_ONLINE_SWITCH_SCRIPT: &str = r#"
$adapters = Get-NetAdapter -Physical -ErrorAction SilentlyContinue |
    Where-Object { $_.Status -eq 'Up' } |
    Sort-Object -Descending -Property Speed
foreach ($adapter in $adapters) {
    $switch = Get-VMSwitch -SwitchType External |
        Where-Object { $_.NetAdapterInterfaceDescription -eq $adapter.InterfaceDescription }
    if ($switch -ne $null) {
        $switch.Name
        break
    }
}
"#;

/// Hyper-V driver that shells out to PowerShell.
#[derive(Debug, Clone)]
pub struct PowerShellDriver {
    binary: PathBuf,
}

impl Default for PowerShellDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerShellDriver {
    pub fn new() -> Self {
        Self::with_binary("powershell")
    }

    /// Use a specific PowerShell executable (e.g. `pwsh`).
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run a script and return its trimmed stdout.
    async fn output(&self, script: &str, args: &[&str]) -> HvbuildResult<String> {
        let command = invocation(script, args);

        let mut cmd = Command::new(&self.binary);
        cmd.arg("-NoProfile")
            .arg("-NonInteractive")
            .arg("-ExecutionPolicy")
            .arg("Bypass")
            .arg("-Command")
            .arg(&command);

        // A cancelled step drops this future; the child must not outlive it.
        cmd.stdin(Stdio::null()).kill_on_drop(true);

        let output = cmd.output().await.map_err(|e| {
            let err_msg = format!("Failed to run {}: {}", self.binary.display(), e);
            tracing::error!("{}", err_msg);
            HvbuildError::Driver(err_msg)
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HvbuildError::Driver(format!(
                "PowerShell exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn non_empty_output(
        &self,
        script: &str,
        args: &[&str],
        what: &str,
    ) -> HvbuildResult<String> {
        let out = self.output(script, args).await?;
        if out.is_empty() {
            return Err(HvbuildError::Driver(format!("no {} reported", what)));
        }
        Ok(out)
    }
}

#[async_trait]
impl Driver for PowerShellDriver {
    async fn mac(&self, vm_name: &str) -> HvbuildResult<String> {
        self.non_empty_output(MAC_SCRIPT, &[vm_name], "MAC address")
            .await
    }

    async fn ip_address(&self, mac: &str) -> HvbuildResult<String> {
        let what = format!("IP address for MAC {}", mac);
        self.non_empty_output(IP_ADDRESS_SCRIPT, &[mac], &what).await
    }

    async fn vm_id(&self, vm_name: &str) -> HvbuildResult<String> {
        self.non_empty_output(VM_ID_SCRIPT, &[vm_name], "VM ID").await
    }

    async fn vm_exists(&self, vm_name: &str) -> HvbuildResult<bool> {
        parse_bool(&self.output(VM_EXISTS_SCRIPT, &[vm_name]).await?)
    }

    async fn vm_generation(&self, vm_name: &str) -> HvbuildResult<u32> {
        parse_u32(&self.output(VM_GENERATION_SCRIPT, &[vm_name]).await?)
    }

    async fn snapshot_exists(&self, vm_name: &str, snapshot_name: &str) -> HvbuildResult<bool> {
        parse_bool(
            &self
                .output(SNAPSHOT_EXISTS_SCRIPT, &[vm_name, snapshot_name])
                .await?,
        )
    }

    async fn is_vm_on(&self, vm_name: &str) -> HvbuildResult<bool> {
        parse_bool(&self.output(VM_RUNNING_SCRIPT, &[vm_name]).await?)
    }
}

#[async_trait]
impl HostProbe for PowerShellDriver {
    async fn is_available(&self) -> bool {
        match self.output(VERSION_SCRIPT, &[]).await {
            Ok(version) => {
                tracing::debug!(version = %version, "PowerShell available");
                true
            }
            Err(e) => {
                tracing::debug!("PowerShell not available: {}", e);
                false
            }
        }
    }

    async fn has_virtualization_extensions(&self) -> HvbuildResult<bool> {
        parse_bool(&self.output(VIRTUALIZATION_EXTENSIONS_SCRIPT, &[]).await?)
    }

    async fn available_memory_mb(&self) -> HvbuildResult<f64> {
        let mut sys = System::new();
        sys.refresh_memory();
        Ok(sys.available_memory() as f64 / (1024.0 * 1024.0))
    }

    async fn external_online_switch(&self) -> HvbuildResult<Option<String>> {
        let name = self.output(EXTERNAL_ONLINE_SWITCH_SCRIPT, &[]).await?;
        Ok(first_line(&name).map(str::to_string))
    }
}

/// Build `& { <script> } 'arg'...` with `$ErrorActionPreference` set so any
/// cmdlet error turns into a non-zero exit code.
fn invocation(script: &str, args: &[&str]) -> String {
    let mut command = format!("$ErrorActionPreference = 'Stop'; & {{{}}}", script);
    for arg in args {
        command.push(' ');
        command.push_str(&quote(arg));
    }
    command
}

/// Single-quoted PowerShell literal. Only `'` needs escaping (by doubling).
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn first_line(output: &str) -> Option<&str> {
    output.lines().map(str::trim).find(|line| !line.is_empty())
}

fn parse_bool(output: &str) -> HvbuildResult<bool> {
    match first_line(output) {
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(HvbuildError::Driver(format!(
            "expected True or False from PowerShell, got {:?}",
            output
        ))),
    }
}

fn parse_u32(output: &str) -> HvbuildResult<u32> {
    first_line(output)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| {
            HvbuildError::Driver(format!(
                "expected an integer from PowerShell, got {:?}",
                output
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes_single_quotes() {
        assert_eq!(quote("base01"), "'base01'");
        assert_eq!(quote("it's"), "'it''s'");
    }

    #[test]
    fn test_invocation_passes_args_in_order() {
        let cmd = invocation("param($a, $b) $a", &["vm", "snap 1"]);
        assert!(cmd.starts_with("$ErrorActionPreference = 'Stop'; & {param($a, $b) $a}"));
        assert!(cmd.ends_with(" 'vm' 'snap 1'"));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("True\r\n").unwrap());
        assert!(!parse_bool("\nFalse").unwrap());
        assert!(parse_bool("").is_err());
        assert!(parse_bool("yes").is_err());
    }

    #[test]
    fn test_parse_u32() {
        assert_eq!(parse_u32("2\r\n").unwrap(), 2);
        assert!(parse_u32("two").is_err());
        assert!(parse_u32("").is_err());
    }

    #[test]
    fn test_first_line_skips_blank_lines() {
        assert_eq!(first_line("\r\n  \nExternal Switch\nOther"), Some("External Switch"));
        assert_eq!(first_line("  \n"), None);
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let driver = PowerShellDriver::with_binary("/nonexistent/hvbuild-powershell");
        assert!(!driver.is_available().await);

        let err = driver.vm_id("base01").await.unwrap_err();
        assert!(matches!(err, HvbuildError::Driver(_)));
    }
}
