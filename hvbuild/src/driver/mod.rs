//! Hypervisor and host capability interfaces.
//!
//! ## Architecture
//!
//! - **Driver**: queries against VMs (addresses, identity, clone source state)
//! - **HostProbe**: queries against the host itself (tooling, nesting support,
//!   free memory, virtual switches)
//!
//! Both are consumed by steps and address resolvers. Every call may fail when
//! the VM or host is not in a queryable state; callers surface those failures
//! unless a check is documented as advisory.

pub mod powershell;

use async_trait::async_trait;
use hvbuild_shared::HvbuildResult;

pub use powershell::PowerShellDriver;

/// VM queries issued during a build.
#[async_trait]
pub trait Driver: Send + Sync {
    /// MAC address of the VM's first network adapter.
    async fn mac(&self, vm_name: &str) -> HvbuildResult<String>;

    /// IPv4 address currently bound to `mac`.
    async fn ip_address(&self, mac: &str) -> HvbuildResult<String>;

    /// Hyper-V GUID of the VM.
    async fn vm_id(&self, vm_name: &str) -> HvbuildResult<String>;

    async fn vm_exists(&self, vm_name: &str) -> HvbuildResult<bool>;

    async fn vm_generation(&self, vm_name: &str) -> HvbuildResult<u32>;

    async fn snapshot_exists(&self, vm_name: &str, snapshot_name: &str) -> HvbuildResult<bool>;

    /// Whether the VM is currently running.
    async fn is_vm_on(&self, vm_name: &str) -> HvbuildResult<bool>;
}

/// Host environment queries.
///
/// When the underlying tool is unavailable, dependent checks degrade to their
/// fallbacks instead of failing.
#[async_trait]
pub trait HostProbe: Send + Sync {
    /// Whether the capability-query tool can be run at all.
    async fn is_available(&self) -> bool;

    async fn has_virtualization_extensions(&self) -> HvbuildResult<bool>;

    /// Free physical memory in MB.
    async fn available_memory_mb(&self) -> HvbuildResult<f64>;

    /// Name of an external virtual switch bound to an online adapter, if any.
    async fn external_online_switch(&self) -> HvbuildResult<Option<String>>;
}
